//! Recognition of physical-condition phrases ("25 °C", "2h", "800 rpm",
//! "N2", "overnight") and normalization of their quantities.

use std::sync::OnceLock;

use regex::Regex;

const TIME_UNITS: [&str; 6] = ["h", "hr", "hrs", "hour", "hours", "min"];
const STIR_SPEED_UNITS: [&str; 2] = ["rpm", "RPM"];
const TEMPERATURE_UNITS: [&str; 4] = ["C", "°", "°C", "℃"];
const PRESSURE_UNITS: [&str; 5] = ["bar", "psi", "Mpa", "MPa", "atm"];
const GASES: [&str; 5] = ["N2", "H2", "O2", "He", "CO2"];

fn digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d").unwrap())
}

fn leading_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+").unwrap())
}

fn have_number(text: &str) -> bool {
    digit_re().is_match(text)
}

pub fn is_temperature_text(text: &str) -> bool {
    if text.contains("rt") || text.contains("RT") {
        return true;
    }
    have_number(text) && TEMPERATURE_UNITS.iter().any(|u| text.ends_with(u))
}

pub fn is_time_text(text: &str) -> bool {
    if text.contains("overnight") {
        return true;
    }
    have_number(text) && TIME_UNITS.iter().any(|u| text.ends_with(u))
}

pub fn is_stir_speed_text(text: &str) -> bool {
    have_number(text) && STIR_SPEED_UNITS.iter().any(|u| text.ends_with(u))
}

pub fn is_pressure_text(text: &str) -> bool {
    have_number(text) && PRESSURE_UNITS.iter().any(|u| text.ends_with(u))
}

pub fn is_gas_text(text: &str) -> bool {
    GASES.iter().any(|g| text.contains(g))
}

/// Whether any condition predicate recognizes the text.
pub fn is_condition_text(text: &str) -> bool {
    is_temperature_text(text)
        || is_time_text(text)
        || is_stir_speed_text(text)
        || is_pressure_text(text)
        || is_gas_text(text)
}

/// Canonical unit plus the factor converting a quantity into it.
fn uniform_unit(unit: &str) -> (&str, f64) {
    if TIME_UNITS.contains(&unit) {
        let factor = if unit == "min" { 1.0 / 60.0 } else { 1.0 };
        return ("hr", factor);
    }
    if STIR_SPEED_UNITS.contains(&unit) {
        return ("RPM", 1.0);
    }
    if TEMPERATURE_UNITS.contains(&unit) {
        return ("C", 1.0);
    }
    (unit, 1.0)
}

/// Rewrite `"<int> <unit>"` into the canonical unit ("30min" becomes
/// "0.5 hr"). Texts that do not match the shape pass through unchanged.
pub fn uniform_amount(text: &str) -> String {
    let Some(m) = leading_int_re().find(text) else {
        return text.to_string();
    };
    let suffix = text[m.end()..].trim();
    if have_number(suffix) {
        return text.to_string();
    }
    let (unit, factor) = uniform_unit(suffix);
    let Ok(value) = m.as_str().parse::<f64>() else {
        return text.to_string();
    };
    format!("{} {}", format_quantity(value * factor), unit)
}

fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("25 °C", true)]
    #[case("25°C", true)]
    #[case("-78 C", true)]
    #[case("rt", true)]
    #[case("RT, 3d", true)]
    #[case("overnight", false)]
    #[case("DMF", false)]
    fn temperature_predicate(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_temperature_text(text), expected);
    }

    #[rstest]
    #[case("2h", true)]
    #[case("12 hr", true)]
    #[case("30min", true)]
    #[case("overnight", true)]
    #[case("25 °C", false)]
    fn time_predicate(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_time_text(text), expected);
    }

    #[rstest]
    #[case("800 rpm", true)]
    #[case("1200RPM", true)]
    #[case("rpm", false)]
    fn stir_predicate(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_stir_speed_text(text), expected);
    }

    #[rstest]
    #[case("5 bar", true)]
    #[case("1 atm", true)]
    #[case("14 psi", true)]
    #[case("2 MPa", true)]
    #[case("bar", false)]
    fn pressure_predicate(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_pressure_text(text), expected);
    }

    #[rstest]
    #[case("N2", true)]
    #[case("under CO2", true)]
    #[case("He atmosphere", true)]
    #[case("DMF", false)]
    fn gas_predicate(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_gas_text(text), expected);
    }

    #[rstest]
    #[case("2h", "2 hr")]
    #[case("12 hrs", "12 hr")]
    #[case("30min", "0.5 hr")]
    #[case("25 °C", "25 C")]
    #[case("800 rpm", "800 RPM")]
    #[case("5 bar", "5 bar")]
    #[case("overnight", "overnight")]
    #[case("1,2-dichloroethane", "1,2-dichloroethane")]
    fn normalization(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(uniform_amount(text), expected);
    }

    #[rstest]
    #[case("2 hr")]
    #[case("0.5 hr")]
    #[case("25 C")]
    #[case("800 RPM")]
    fn normalization_is_idempotent(#[case] text: &str) {
        let once = uniform_amount(text);
        assert_eq!(uniform_amount(&once), once);
    }
}
