//! The SVG document model used for vector fallbacks of drawn compounds.

pub mod elements;
pub mod node;

pub use elements::{PathStep, SvgDocument, SvgPath, SvgText};
pub use node::SvgTransformer;
