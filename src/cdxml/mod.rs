//! The CDXML document model: a typed, structurally checked view over the
//! raw XML tree of a chemical drawing.

pub mod elements;
pub(crate) mod node;

pub use elements::{
    apply_offset_scale, arrow_extents, Arrow, ArrowExtents, BracketedGroup, CdxmlDocument,
    Fragment, Graphic, Page, SubNode, TextElement,
};
