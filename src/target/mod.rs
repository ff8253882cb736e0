//! The normalized, role-tagged target model the parser produces.

pub mod condition;
pub mod elements;
pub mod node;

pub use elements::{
    ArrowData, CompoundData, ConditionData, Reaction, TargetKind, TextData, REACTION_ROLES,
};
pub use node::{ChildLinks, Semantics, TargetArena, TargetId, TargetNode};
