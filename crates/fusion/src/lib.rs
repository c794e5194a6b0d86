//! # Sketch Fusion Library
//!
//! Combines freehand ink strokes with external detection results (cloud
//! vision APIs, on-device ML, sketch classifiers) into one deduplicated,
//! hierarchical description of a drawing.
//!
//! ## Core Features
//!
//! - **Stroke Classification**: Circle, rectangle, triangle, line, arrow
//!   and star recognition from raw point sequences
//! - **Trait-based Contour Pipeline**: Sobel edge detection, boundary
//!   scanning and Douglas-Peucker simplification behind swappable traits
//! - **Detection Fusion**: Cross-source dedup with geometry recovery for
//!   boxless detections and a fixed source-priority order
//! - **Containment Hierarchy**: Parent/child links from box containment
//! - **GeoJSON Support**: Export scenes to standard GeoJSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fusion::pipeline::{Pipeline, SceneInput};
//! use sketch_kit_common::CanvasSize;
//!
//! let pipeline = Pipeline::builder().build();
//!
//! let input = SceneInput {
//!     canvas: Some(CanvasSize::new(1000.0, 1000.0)?),
//!     ..Default::default()
//! };
//! let scene = pipeline.process(&input)?;
//!
//! scene.save_geojson("scene.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod associate;
pub mod classify;
pub mod config;
pub mod contour;
pub mod error;
pub mod fuse;
pub mod hierarchy;
pub mod io;
pub mod normalize;
pub mod pipeline;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use associate::StrokeAssociator;
pub use classify::GeometricShapeClassifier;
pub use config::{ClassifierConfig, ContourConfig, FusionConfig};
pub use contour::{
    CanvasRaster, DouglasPeuckerSimplifier, NeighborScanBoundary, RegionContourExtractor,
    SobelContourExtractor, SobelEdgeDetector,
};
pub use error::{FusionError, Result};
pub use fuse::FusionEngine;
pub use hierarchy::HierarchyBuilder;
pub use normalize::{DetectionCandidate, DetectionNormalizer, RawDetections};
pub use pipeline::{builder::PipelineBuilder, Pipeline, SceneInput};
pub use traits::*;
pub use types::{
    AnalyzedScene, DetectedElement, DetectionSource, GeometricFeatures, ShapeKind, ShapeScore,
};
