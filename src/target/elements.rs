//! Kind-specific payloads of target nodes, and the reaction record that
//! groups them into roles.

use crate::target::condition;
use crate::target::node::{Semantics, TargetId};

/// What a target node is, beyond its tag/box/semantics.
#[derive(Debug, Clone)]
pub enum TargetKind {
    Compound(CompoundData),
    Text(TextData),
    Plus,
    Arrow(ArrowData),
    Condition(ConditionData),
}

impl TargetKind {
    pub fn as_compound(&self) -> Option<&CompoundData> {
        match self {
            TargetKind::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextData> {
        match self {
            TargetKind::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// A molecule — drawn (embedded cdxml) or textual (a collection label).
#[derive(Debug, Clone, Default)]
pub struct CompoundData {
    pub is_collection: bool,
    /// Literal label for text-only sources.
    pub text: Option<String>,
    /// Serialized fragment subtree; empty for textual compounds.
    pub cdxml: String,
    /// Base64 PNG crop supplied by the raster collaborator.
    pub img: Option<String>,
    /// Standalone SVG crop of the drawn region.
    pub svg: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TextData {
    pub text: String,
    pub is_collection: bool,
}

#[derive(Debug, Clone)]
pub struct ArrowData {
    pub head: (f64, f64),
    pub tail: (f64, f64),
}

/// Parsed physical conditions of one text group under an arrow.
#[derive(Debug, Clone, Default)]
pub struct ConditionData {
    pub text_list: Vec<String>,
    pub is_collection: bool,
    pub temperature: Option<String>,
    pub reaction_time: Option<String>,
    pub stir_speed: Option<String>,
    pub pressure: Option<String>,
    pub gas: Option<String>,
}

impl ConditionData {
    /// Classify every member text; quantitative kinds are normalized, the
    /// gas phrase is kept verbatim. Later members overwrite earlier ones
    /// for the same kind.
    pub fn from_texts(texts: Vec<String>) -> Self {
        let mut data = ConditionData {
            text_list: texts,
            ..ConditionData::default()
        };
        for i in 0..data.text_list.len() {
            let text = data.text_list[i].clone();
            data.classify(&text);
        }
        data
    }

    fn classify(&mut self, text: &str) {
        if condition::is_temperature_text(text) {
            self.temperature = Some(condition::uniform_amount(text));
        }
        if condition::is_time_text(text) {
            self.reaction_time = Some(condition::uniform_amount(text));
        }
        if condition::is_stir_speed_text(text) {
            self.stir_speed = Some(condition::uniform_amount(text));
        }
        if condition::is_pressure_text(text) {
            self.pressure = Some(condition::uniform_amount(text));
        }
        if condition::is_gas_text(text) {
            self.gas = Some(text.to_string());
        }
    }
}

/// One reaction, keyed by the arrow it was derived from. The lists hold
/// arena indices; tags are resolved at dump time.
#[derive(Debug, Clone)]
pub struct Reaction {
    pub tag: String,
    pub reactant: Vec<TargetId>,
    pub reagent: Vec<TargetId>,
    pub product: Vec<TargetId>,
    pub catalyst: Vec<TargetId>,
    pub solvent: Vec<TargetId>,
    pub condition: Vec<TargetId>,
}

/// The role lists an arrow assigns directly, in processing order.
pub const REACTION_ROLES: [Semantics; 5] = [
    Semantics::Reactant,
    Semantics::Reagent,
    Semantics::Product,
    Semantics::Catalyst,
    Semantics::Solvent,
];

impl Reaction {
    pub fn new(tag: String) -> Self {
        Reaction {
            tag,
            reactant: Vec::new(),
            reagent: Vec::new(),
            product: Vec::new(),
            catalyst: Vec::new(),
            solvent: Vec::new(),
            condition: Vec::new(),
        }
    }

    pub fn role_list(&self, role: Semantics) -> &Vec<TargetId> {
        match role {
            Semantics::Reactant => &self.reactant,
            Semantics::Reagent => &self.reagent,
            Semantics::Product => &self.product,
            Semantics::Catalyst => &self.catalyst,
            Semantics::Solvent => &self.solvent,
            _ => &self.condition,
        }
    }

    pub fn role_list_mut(&mut self, role: Semantics) -> &mut Vec<TargetId> {
        match role {
            Semantics::Reactant => &mut self.reactant,
            Semantics::Reagent => &mut self.reagent,
            Semantics::Product => &mut self.product,
            Semantics::Catalyst => &mut self.catalyst,
            Semantics::Solvent => &mut self.solvent,
            _ => &mut self.condition,
        }
    }
}
