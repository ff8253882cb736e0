//! The raster collaborator seam.
//!
//! The core never rasterizes anything itself. When a pre-rendered page
//! raster is available, the caller hands it in behind [`PageRaster`]; the
//! core computes pixel regions and guideline overlays, the collaborator
//! crops and draws. A collaborator returning `None` degrades the parse to
//! "no image" with a warning, never an error.

use crate::geometry::BoundingBox;

/// A pixel-space rectangle on the page raster, clamped to the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// One debug-overlay rectangle with its annotation.
#[derive(Debug, Clone)]
pub struct Guideline {
    pub region: Region,
    pub color: &'static str,
    pub label: String,
}

/// A page raster rendered by an external collaborator.
pub trait PageRaster {
    /// Pixel size of the raster.
    fn size(&self) -> (f64, f64);
    /// Crop a region and return it as base64-encoded PNG.
    fn crop_base64(&self, region: Region) -> Option<String>;
    /// Draw guidelines over a copy of the raster and return PNG bytes.
    fn overlay(&self, guides: &[Guideline]) -> Option<Vec<u8>>;
}

/// Map a document-space box into a clamped pixel region of the raster.
pub(crate) fn raster_region(
    offset: (f64, f64),
    scale: (f64, f64),
    bounds: &BoundingBox,
    img_size: (f64, f64),
    ext: f64,
) -> Region {
    let scaled = bounds.offset_then_scale(offset, scale);
    Region {
        left: (scaled.left - ext).max(1.0),
        top: (scaled.top - ext).max(1.0),
        right: (scaled.right + ext).min(img_size.0 - 1.0),
        bottom: (scaled.bottom + ext).min(img_size.1 - 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_scale_and_clamp() {
        // document box 0..100 in both axes, raster 200x200
        let offset = (0.0, 0.0);
        let scale = (2.0, 2.0);
        let b = BoundingBox::new(10.0, 10.0, 40.0, 40.0);
        let r = raster_region(offset, scale, &b, (200.0, 200.0), 5.0);
        assert_eq!(r, Region { left: 15.0, top: 15.0, right: 85.0, bottom: 85.0 });

        let edge = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let r = raster_region(offset, scale, &edge, (200.0, 200.0), 5.0);
        assert_eq!(r, Region { left: 1.0, top: 1.0, right: 199.0, bottom: 199.0 });
    }
}
