//! The stable serialized shape of a parsed scheme.
//!
//! The same structs feed both directions: the parser dumps into them, the
//! builder reads them back. Optional keys are omitted entirely rather than
//! serialized as null, and all positions are `{l,t,w,h}` rounded to two
//! decimals.

use serde::{Deserialize, Serialize};

use crate::geometry::{round2, BoundingBox};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeData {
    pub graphic: GraphicParams,
    pub label: Vec<LabelEntry>,
    pub compound: Vec<CompoundEntry>,
    pub reaction: Vec<ReactionEntry>,
    pub condition: Vec<ConditionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicParams {
    pub size: CanvasSize,
    /// Document-wide scale applied on rebuild.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<CanvasScale>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasSize {
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasScale {
    pub h: f64,
    pub v: f64,
}

/// `{l,t,w,h}` of a box, rounded to two decimals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub l: f64,
    pub t: f64,
    pub w: f64,
    pub h: f64,
}

impl Position {
    pub fn from_box(bounds: &BoundingBox) -> Self {
        let (l, t, w, h) = bounds.ltwh();
        Position { l, t, w, h }
    }

    pub fn to_box(self) -> BoundingBox {
        BoundingBox::from_ltwh(self.l, self.t, self.w, self.h)
    }
}

/// An arrow endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointPosition {
    pub l: f64,
    pub t: f64,
}

/// An arrow or a text block, distinguished by `semantics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEntry {
    pub tag: String,
    pub semantics: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_collection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_position: Option<PointPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_position: Option<PointPosition>,
}

/// Child tags of a compound grouped by side, omitting empty sides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChildMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundEntry {
    pub tag: String,
    pub semantics: String,
    pub is_collection: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub cdxml: String,
    #[serde(default)]
    pub child: ChildMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEntry {
    pub tag: String,
    pub semantics: String,
    pub reactant: Vec<String>,
    pub reagent: Vec<String>,
    pub product: Vec<String>,
    pub catalyst: Vec<String>,
    pub solvent: Vec<String>,
    pub condition: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub tag: String,
    pub semantics: String,
    pub text_list: Vec<String>,
    pub is_collection: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stir_speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
}

pub(crate) fn point_position(point: (f64, f64)) -> PointPosition {
    PointPosition {
        l: round2(point.0),
        t: round2(point.1),
    }
}
