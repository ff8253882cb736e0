//! CDXML reaction-scheme semantics.
//!
//! This crate reads a chemical drawing in CDXML, infers the reaction
//! structure the drawing depicts — which molecules are reactants, products,
//! reagents or solvents, which texts describe physical conditions, how
//! labels attach to structures — and serializes it as a normalized,
//! role-tagged data model. The inverse direction rebuilds a CDXML document
//! from that model.
//!
//! ## Architecture
//!
//! - [`geometry`] — bounding boxes and the spatial predicates everything
//!   else is built on
//! - [`xml`] — the owning XML tree behind both document models
//! - [`cdxml`] / [`svg`] — typed, structurally checked document views
//! - [`target`] — the normalized output entities and the condition text
//!   classifier
//! - [`parser`] — the inference pipeline (extraction, role assignment,
//!   plus diffusion, spatial renumbering, label linking)
//! - [`builder`] — the rebuild path
//! - [`render`] — the collaborator seam for raster crops and debug
//!   overlays
//!
//! ## Usage
//!
//! ```rust
//! use cdxml::{parse, ParseRequest};
//!
//! let doc = r#"<CDXML BoundingBox="0 0 540 720"><page/></CDXML>"#;
//! let mut request = ParseRequest::new(doc);
//! request.with_position = true;
//! let output = parse(request).unwrap();
//! assert!(output.data.compound.is_empty());
//! ```

pub mod api;
pub mod builder;
pub mod cdxml;
pub mod error;
pub mod geometry;
pub mod output;
pub mod parser;
pub mod render;
pub mod svg;
pub mod target;
pub mod xml;

pub use api::{build, parse, ParseOutput, ParseRequest};
pub use error::CdxmlError;
pub use geometry::{BoundingBox, Direction, DistanceMode};
pub use output::SchemeData;
pub use parser::{DumpOptions, SchemeParser};
pub use render::{Guideline, PageRaster, Region};
