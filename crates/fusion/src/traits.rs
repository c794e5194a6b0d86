use image::GrayImage;
use sketch_kit_common::{Point, Stroke};
use crate::{error::Result, types::ShapeScore};

/// Trait for raster preprocessing algorithms (edge detection,
/// binarization). Input is a grayscale region, output a binary edge mask
/// with 255 for edge pixels and 0 for background.
pub trait RasterPreprocessor: Send + Sync {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for boundary-point extraction from a binary edge mask.
/// Output points are in the region's pixel space.
pub trait BoundaryExtractor: Send + Sync {
    fn extract_boundary(&self, mask: &GrayImage) -> Result<Vec<Point>>;
}

/// Trait for polyline simplification algorithms
pub trait ContourSimplifier: Send + Sync {
    /// Simplify a polyline; never returns more points than the input
    fn simplify(&self, points: &[Point], epsilon: f64) -> Vec<Point>;
}

/// Trait for single-stroke shape classification
pub trait StrokeClassifier: Send + Sync {
    /// Score one stroke against the shape vocabulary and return the best
    /// classification
    fn classify(&self, stroke: &Stroke) -> ShapeScore;
}
