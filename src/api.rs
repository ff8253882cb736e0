//! Library entry points.
//!
//! Pure functions over structured input: no I/O, no process handling. The
//! optional raster collaborator is the only side-channel, and it is handed
//! in by the caller.

use crate::builder;
use crate::error::CdxmlError;
use crate::output::SchemeData;
use crate::parser::{DumpOptions, SchemeParser};
use crate::render::PageRaster;

/// One parse request.
#[derive(Default)]
pub struct ParseRequest<'a> {
    /// The CDXML document.
    pub cdxml: &'a str,
    /// Optional vector rendering of the same page; enables per-compound
    /// SVG crops.
    pub svg: Option<&'a str>,
    /// Optional pre-rendered page raster; enables per-compound image crops
    /// and the debug overlay.
    pub raster: Option<&'a dyn PageRaster>,
    /// Include `{l,t,w,h}` positions in the output.
    pub with_position: bool,
    /// Include embedded fragment cdxml strings.
    pub with_cdxml: bool,
    /// Include base64 raster crops.
    pub with_img: bool,
}

impl<'a> ParseRequest<'a> {
    pub fn new(cdxml: &'a str) -> Self {
        ParseRequest {
            cdxml,
            ..ParseRequest::default()
        }
    }
}

/// A parse result: the normalized scheme plus, when a raster collaborator
/// was supplied and cooperated, the debug overlay PNG.
pub struct ParseOutput {
    pub data: SchemeData,
    pub debug_image: Option<Vec<u8>>,
}

/// Parse a CDXML reaction scheme into the normalized data model.
pub fn parse(request: ParseRequest<'_>) -> Result<ParseOutput, CdxmlError> {
    let mut parser = SchemeParser::new(request.cdxml, request.svg)?;
    parser.parse(request.raster)?;
    let data = parser.dump(&DumpOptions {
        with_position: request.with_position,
        with_cdxml: request.with_cdxml,
        with_img: request.with_img,
    });
    let debug_image = request.raster.and_then(|r| parser.debug_image(r));
    Ok(ParseOutput { data, debug_image })
}

/// Rebuild a CDXML document from a scheme data model.
pub fn build(data: &SchemeData) -> Result<String, CdxmlError> {
    builder::build(data)
}
