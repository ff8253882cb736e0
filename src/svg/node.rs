//! Affine transform handling for SVG nodes.

use crate::error::CdxmlError;

/// A `transform="matrix(a b c d e f)"` attribute.
///
/// The inverse is the historical piecewise formula: the general branch
/// assumes every entry is non-zero, and a pure-scale fallback handles the
/// axis-aligned case. Matrices outside both branches are rejected.
#[derive(Debug, Clone, Copy)]
pub struct SvgTransformer {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl SvgTransformer {
    pub fn parse(raw: &str) -> Result<Self, CdxmlError> {
        let trimmed = raw.trim().trim_end_matches(')');
        let (method, args) = trimmed
            .split_once('(')
            .ok_or_else(|| CdxmlError::malformed("transform", raw))?;
        if method.trim() != "matrix" {
            return Err(CdxmlError::malformed("transform", raw));
        }
        let values: Vec<f64> = args
            .split_whitespace()
            .map(|v| v.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| CdxmlError::malformed("transform", raw))?;
        if values.len() != 6 {
            return Err(CdxmlError::malformed("transform", raw));
        }
        Ok(SvgTransformer {
            a: values[0],
            b: values[1],
            c: values[2],
            d: values[3],
            e: values[4],
            f: values[5],
        })
    }

    /// Map local coordinates to canvas coordinates.
    pub fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Map canvas coordinates back to local coordinates.
    pub fn reverse_transform(&self, x: f64, y: f64) -> Result<(f64, f64), CdxmlError> {
        let SvgTransformer { a, b, c, d, e, f } = *self;
        if [a, b, c, d, e, f].iter().all(|v| *v != 0.0) {
            let x1 = (y - f - d / c * (x - e)) / (b - (d * a) / c);
            let y1 = (x - e - a * x1) / c;
            Ok((x1, y1))
        } else if b == 0.0 && c == 0.0 {
            Ok(((x - e) / a, (y - f) / d))
        } else {
            Err(CdxmlError::malformed(
                "transform",
                &format!("matrix({} {} {} {} {} {})", a, b, c, d, e, f),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_matrix_arguments() {
        let t = SvgTransformer::parse("matrix(1 0 0 -1 10 200)").unwrap();
        assert_eq!((t.a, t.d, t.e, t.f), (1.0, -1.0, 10.0, 200.0));
    }

    #[test]
    fn rejects_non_matrix_transforms() {
        assert!(SvgTransformer::parse("translate(3 4)").is_err());
        assert!(SvgTransformer::parse("matrix(1 0 0 1)").is_err());
    }

    #[rstest]
    #[case(2.0, 0.0, 0.0, 3.0, 5.0, 7.0, 4.0, 9.0)]
    #[case(1.5, 0.0, 0.0, -1.5, 12.0, 400.0, -3.0, 8.5)]
    fn scale_matrices_round_trip(
        #[case] a: f64,
        #[case] b: f64,
        #[case] c: f64,
        #[case] d: f64,
        #[case] e: f64,
        #[case] f: f64,
        #[case] x: f64,
        #[case] y: f64,
    ) {
        let t = SvgTransformer { a, b, c, d, e, f };
        let (tx, ty) = t.transform(x, y);
        let (bx, by) = t.reverse_transform(tx, ty).unwrap();
        assert!((bx - x).abs() < 1e-9);
        assert!((by - y).abs() < 1e-9);
    }

    #[test]
    fn dense_matrices_round_trip_through_the_general_branch() {
        let t = SvgTransformer {
            a: 1.0,
            b: 2.0,
            c: 3.0,
            d: 4.0,
            e: 5.0,
            f: 6.0,
        };
        let (tx, ty) = t.transform(2.5, -1.0);
        let (bx, by) = t.reverse_transform(tx, ty).unwrap();
        assert!((bx - 2.5).abs() < 1e-9);
        assert!((by + 1.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_with_zero_scale_entries_is_rejected() {
        let t = SvgTransformer {
            a: 0.0,
            b: 1.0,
            c: -1.0,
            d: 0.0,
            e: 0.0,
            f: 0.0,
        };
        assert!(t.reverse_transform(1.0, 1.0).is_err());
    }
}
