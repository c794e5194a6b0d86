//! Raster contour extraction: Sobel edge detection over one element's
//! bounding region, boundary-pixel scan, and Douglas-Peucker
//! simplification down to a normalized outline.

pub mod extraction;
pub mod preprocessing;
pub mod simplification;

pub use extraction::NeighborScanBoundary;
pub use preprocessing::{grayscale_from_rgba, SobelEdgeDetector};
pub use simplification::DouglasPeuckerSimplifier;

use sketch_kit_common::{BoundingBox, CanvasSize, Point};

use crate::{
    config::ContourConfig,
    error::{FusionError, Result},
    traits::{BoundaryExtractor, ContourSimplifier, RasterPreprocessor},
};

/// A full-canvas RGBA pixel buffer handed over by the drawing surface
#[derive(Debug, Clone)]
pub struct CanvasRaster {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl CanvasRaster {
    /// Wrap an RGBA buffer; the length must be `width * height * 4`
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(FusionError::RasterSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Copy out the RGBA bytes of a sub-rectangle. Indexing stays in
    /// `usize` so large rasters cannot overflow the row offset.
    fn crop(&self, x0: u32, y0: u32, w: u32, h: u32) -> Vec<u8> {
        let stride = self.width as usize * 4;
        let mut out = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for y in y0 as usize..(y0 + h) as usize {
            let start = y * stride + (x0 as usize) * 4;
            let end = start + (w as usize) * 4;
            out.extend_from_slice(&self.pixels[start..end]);
        }
        out
    }
}

/// Run the contour stages over one element's pixel-space bounding region.
///
/// Returns `Ok(None)` when the region is degenerate, smaller than the
/// configured minimum, or produces fewer than 2 boundary points; a bad
/// region never aborts the caller's analysis.
pub fn extract_region_contour(
    preprocessor: &dyn RasterPreprocessor,
    boundary: &dyn BoundaryExtractor,
    simplifier: &dyn ContourSimplifier,
    config: &ContourConfig,
    raster: &CanvasRaster,
    region_px: &BoundingBox,
    canvas: CanvasSize,
) -> Result<Option<Vec<Point>>> {
    // Clamp the region to the raster bounds
    let x0 = region_px.min_x.max(0.0).floor() as u32;
    let y0 = region_px.min_y.max(0.0).floor() as u32;
    let x1 = (region_px.max_x.ceil() as u32).min(raster.width);
    let y1 = (region_px.max_y.ceil() as u32).min(raster.height);
    if x0 >= x1 || y0 >= y1 {
        return Ok(None);
    }
    let (w, h) = (x1 - x0, y1 - y0);
    if w < config.min_region_px || h < config.min_region_px {
        return Ok(None);
    }

    let cropped = raster.crop(x0, y0, w, h);
    let gray = grayscale_from_rgba(&cropped, w, h)?;
    let edges = preprocessor.preprocess(&gray)?;
    let pixel_points = boundary.extract_boundary(&edges)?;
    if pixel_points.len() < 2 {
        return Ok(None);
    }

    // Shift back into canvas pixel space, then normalize exactly once
    let normalized: Vec<Point> = pixel_points
        .iter()
        .map(|p| {
            Point::new(
                (p.x + x0 as f64) / canvas.width,
                (p.y + y0 as f64) / canvas.height,
            )
        })
        .collect();

    let simplified = simplifier.simplify(&normalized, config.rdp_epsilon);
    if simplified.len() < 2 {
        return Ok(None);
    }
    Ok(Some(simplified))
}

/// Standard contour extractor over pluggable stage implementations
#[derive(Debug)]
pub struct RegionContourExtractor<P, B, S>
where
    P: RasterPreprocessor,
    B: BoundaryExtractor,
    S: ContourSimplifier,
{
    pub preprocessor: P,
    pub boundary: B,
    pub simplifier: S,
    pub config: ContourConfig,
}

impl<P, B, S> RegionContourExtractor<P, B, S>
where
    P: RasterPreprocessor,
    B: BoundaryExtractor,
    S: ContourSimplifier,
{
    pub fn new(preprocessor: P, boundary: B, simplifier: S, config: ContourConfig) -> Self {
        Self {
            preprocessor,
            boundary,
            simplifier,
            config,
        }
    }

    /// Extract a simplified, normalized contour for one region
    pub fn extract(
        &self,
        raster: &CanvasRaster,
        region_px: &BoundingBox,
        canvas: CanvasSize,
    ) -> Result<Option<Vec<Point>>> {
        extract_region_contour(
            &self.preprocessor,
            &self.boundary,
            &self.simplifier,
            &self.config,
            raster,
            region_px,
            canvas,
        )
    }
}

/// Default stage stack: Sobel edges, neighbor-scan boundary, RDP
pub type SobelContourExtractor =
    RegionContourExtractor<SobelEdgeDetector, NeighborScanBoundary, DouglasPeuckerSimplifier>;

impl Default for SobelContourExtractor {
    fn default() -> Self {
        Self::new(
            SobelEdgeDetector::default(),
            NeighborScanBoundary,
            DouglasPeuckerSimplifier,
            ContourConfig::default(),
        )
    }
}
