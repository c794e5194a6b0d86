//! # Sketch Kit Common - Shared Types and Utilities
//!
//! A foundational library providing the shared data structures for the
//! Sketch Kit ecosystem: ink strokes, canvas dimensions, and the canonical
//! bounding-box representation used by every downstream stage.
//!
//! ## Example
//!
//! ```rust
//! use sketch_kit_common::{BoundingBox, CanvasSize, Point};
//!
//! let bbox = BoundingBox::from_corners(10.0, 20.0, 110.0, 70.0).unwrap();
//! assert_eq!(bbox.width, 100.0);
//! assert_eq!(bbox.center_y, 45.0);
//!
//! // Pixel-space boxes are normalized exactly once before leaving a module
//! let canvas = CanvasSize::new(800.0, 600.0).unwrap();
//! let unit = bbox.normalize(canvas);
//! assert!(unit.max_x <= 1.0);
//! ```

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use thiserror::Error;

/// Floating tolerance for bounding-box invariants and round-trips
pub const COORD_EPSILON: f64 = 1e-6;

/// Result type for sketch kit operations
pub type Result<T> = std::result::Result<T, SketchKitError>;

/// Standard error type for sketch kit operations
#[derive(Error, Debug)]
pub enum SketchKitError {
    #[error("Invalid bounding box: min ({min_x}, {min_y}) exceeds max ({max_x}, {max_y})")]
    InvalidBoundingBox {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    #[error("Invalid canvas size: {width}x{height}")]
    InvalidCanvasSize { width: f64, height: f64 },

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 2D point with floating-point coordinates.
///
/// Whether the coordinates are pixels or normalized `[0, 1]` units depends
/// on the pipeline stage; the two are never mixed within one structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One continuous freehand ink path as an ordered point sequence.
///
/// Strokes are created and owned by the external drawing surface and are
/// never mutated by this library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Stroke {
    pub id: String,
    pub points: Vec<Point>,
    /// Capture time in milliseconds, if the drawing surface recorded one
    pub timestamp: Option<u64>,
    /// Brush size in pixels, if the drawing surface recorded one
    pub size: Option<f64>,
}

impl Stroke {
    /// Create a stroke from an id and point sequence
    pub fn new(id: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            points,
            timestamp: None,
            size: None,
        }
    }

    /// Axis-aligned bounding box over the stroke's points, if any
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// Total polyline length (sum of consecutive segment lengths)
    pub fn path_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(w[1]))
            .sum()
    }
}

/// Canvas dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    /// Create a canvas size; both dimensions must be positive
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
            return Err(SketchKitError::InvalidCanvasSize { width, height });
        }
        Ok(Self { width, height })
    }
}

/// Axis-aligned rectangle with derived center and dimensions.
///
/// Invariants: `min_x <= max_x`, `min_y <= max_y`,
/// `width = max_x - min_x`, `height = max_y - min_y`,
/// `center_* = min_* + dimension_* / 2`, all within [`COORD_EPSILON`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl BoundingBox {
    /// Create a bounding box from its four corners, deriving the rest
    pub fn from_corners(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        if min_x > max_x || min_y > max_y {
            return Err(SketchKitError::InvalidBoundingBox {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        let width = max_x - min_x;
        let height = max_y - min_y;
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
            width,
            height,
            center_x: min_x + width / 2.0,
            center_y: min_y + height / 2.0,
        })
    }

    /// Create a bounding box from its center and dimensions
    pub fn from_center(center_x: f64, center_y: f64, width: f64, height: f64) -> Result<Self> {
        if width < 0.0 || height < 0.0 {
            return Err(SketchKitError::InvalidValue {
                message: format!("Negative dimensions: {width}x{height}"),
            });
        }
        Self::from_corners(
            center_x - width / 2.0,
            center_y - height / 2.0,
            center_x + width / 2.0,
            center_y + height / 2.0,
        )
    }

    /// Componentwise min/max over a point sequence; `None` when empty
    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        // min <= max holds by construction over a nonempty sequence
        Self::from_corners(min_x, min_y, max_x, max_y).ok()
    }

    /// Center as a point
    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// Area of the box
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check whether a point lies within the box bounds (inclusive)
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Smallest box covering both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        // Corners of two valid boxes always form a valid box
        Self::from_corners(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
        .unwrap_or(*self)
    }

    /// Overlapping area with another box; 0 when disjoint
    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let w = (self.max_x.min(other.max_x) - self.min_x.max(other.min_x)).max(0.0);
        let h = (self.max_y.min(other.max_y) - self.min_y.max(other.min_y)).max(0.0);
        w * h
    }

    /// Intersection-over-union with another box; 0 when either is degenerate
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }

    /// Convert a pixel-space box to normalized `[0, 1]` canvas units
    pub fn normalize(&self, canvas: CanvasSize) -> BoundingBox {
        Self::from_corners(
            self.min_x / canvas.width,
            self.min_y / canvas.height,
            self.max_x / canvas.width,
            self.max_y / canvas.height,
        )
        .unwrap_or(*self)
    }

    /// Convert a normalized box back to pixel space
    pub fn denormalize(&self, canvas: CanvasSize) -> BoundingBox {
        Self::from_corners(
            self.min_x * canvas.width,
            self.min_y * canvas.height,
            self.max_x * canvas.width,
            self.max_y * canvas.height,
        )
        .unwrap_or(*self)
    }

    /// Clamp a normalized box to the unit square, re-deriving dimensions
    pub fn clip_unit(&self) -> BoundingBox {
        let min_x = self.min_x.clamp(0.0, 1.0);
        let min_y = self.min_y.clamp(0.0, 1.0);
        let max_x = self.max_x.clamp(min_x, 1.0);
        let max_y = self.max_y.clamp(min_y, 1.0);
        Self::from_corners(min_x, min_y, max_x, max_y).unwrap_or(*self)
    }

    /// Check equality with another box within [`COORD_EPSILON`]
    pub fn approx_eq(&self, other: &BoundingBox) -> bool {
        (self.min_x - other.min_x).abs() < COORD_EPSILON
            && (self.min_y - other.min_y).abs() < COORD_EPSILON
            && (self.max_x - other.max_x).abs() < COORD_EPSILON
            && (self.max_y - other.max_y).abs() < COORD_EPSILON
            && (self.width - other.width).abs() < COORD_EPSILON
            && (self.height - other.height).abs() < COORD_EPSILON
            && (self.center_x - other.center_x).abs() < COORD_EPSILON
            && (self.center_y - other.center_y).abs() < COORD_EPSILON
    }
}
