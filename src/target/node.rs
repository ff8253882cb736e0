//! The normalized output entities and the arena that owns them.
//!
//! Source XML elements are referred to by their tree id, which doubles as
//! the identity key for condition grouping and diffusion visited-sets.

use std::collections::HashMap;

use ego_tree::NodeId;

use crate::geometry::{BoundingBox, Direction};
use crate::target::elements::TargetKind;

/// Role of an entity in the reaction scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantics {
    Compound,
    Reactant,
    Product,
    Reagent,
    Catalyst,
    Solvent,
    Plus,
    Arrow,
    Text,
    Condition,
}

impl Semantics {
    pub fn as_str(self) -> &'static str {
        match self {
            Semantics::Compound => "compound",
            Semantics::Reactant => "reactant",
            Semantics::Product => "product",
            Semantics::Reagent => "reagent",
            Semantics::Catalyst => "catalyst",
            Semantics::Solvent => "solvent",
            Semantics::Plus => "plus",
            Semantics::Arrow => "arrow",
            Semantics::Text => "text",
            Semantics::Condition => "condition",
        }
    }

    /// The short tag prefix of roles with canonical numbering; other
    /// semantics use `<name>_<n>` tags.
    pub fn role_id(self) -> Option<&'static str> {
        match self {
            Semantics::Reactant => Some("R"),
            Semantics::Reagent => Some("r"),
            Semantics::Product => Some("P"),
            Semantics::Catalyst => Some("ca"),
            Semantics::Solvent => Some("S"),
            Semantics::Condition => Some("C"),
            _ => None,
        }
    }
}

/// Child tags of a node grouped by the side they sit on, each side kept
/// sorted by distance to the parent.
#[derive(Debug, Clone, Default)]
pub struct ChildLinks {
    pub l: Vec<String>,
    pub t: Vec<String>,
    pub r: Vec<String>,
    pub b: Vec<String>,
    pub distances: HashMap<String, f64>,
}

impl ChildLinks {
    pub fn side_mut(&mut self, direction: Direction) -> &mut Vec<String> {
        match direction {
            Direction::L => &mut self.l,
            Direction::T => &mut self.t,
            Direction::R => &mut self.r,
            Direction::B => &mut self.b,
        }
    }

    pub fn side(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::L => &self.l,
            Direction::T => &self.t,
            Direction::R => &self.r,
            Direction::B => &self.b,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.l.is_empty() && self.t.is_empty() && self.r.is_empty() && self.b.is_empty()
    }
}

/// One role-tagged output entity.
#[derive(Debug, Clone)]
pub struct TargetNode {
    pub tag: String,
    pub semantics: Semantics,
    /// Geometry of this entity; comma-split texts narrow it to their slice.
    pub bounds: Option<BoundingBox>,
    /// Geometry of the source element, untouched by splitting.
    pub source_bounds: Option<BoundingBox>,
    /// Identity of the source element in the document tree.
    pub source: Option<NodeId>,
    pub father: Option<String>,
    pub children: ChildLinks,
    pub kind: TargetKind,
}

impl TargetNode {
    pub fn new(tag: String, semantics: Semantics, kind: TargetKind) -> Self {
        TargetNode {
            tag,
            semantics,
            bounds: None,
            source_bounds: None,
            source: None,
            father: None,
            children: ChildLinks::default(),
            kind,
        }
    }

    pub fn with_source(mut self, source: NodeId, bounds: Option<BoundingBox>) -> Self {
        self.source = Some(source);
        self.source_bounds = bounds;
        self.bounds = bounds;
        self
    }
}

/// Index of a node in the arena. Tag maps hold these; renames only touch
/// the maps and the node's own tag field.
pub type TargetId = usize;

/// Owner of every target node produced by one parse.
#[derive(Debug, Default)]
pub struct TargetArena {
    nodes: Vec<TargetNode>,
}

impl TargetArena {
    pub fn new() -> Self {
        TargetArena::default()
    }

    pub fn push(&mut self, node: TargetNode) -> TargetId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, id: TargetId) -> &TargetNode {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: TargetId) -> &mut TargetNode {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
