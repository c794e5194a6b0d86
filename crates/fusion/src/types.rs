use std::fmt;

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use sketch_kit_common::{BoundingBox, CanvasSize, Point};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Which detector (or fusion of detectors) produced an element's final
/// geometry.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DetectionSource {
    /// Cloud vision API label/object/face detection
    VisionApi,
    /// In-browser ML object detector
    MlObject,
    /// In-browser ML face detector
    MlFace,
    /// CNN sketch classifier
    SketchCnn,
    /// Geometry recovered from the user's ink strokes
    StrokeGeometry,
    /// Synthesized keyword-sized box (no geometry available anywhere)
    Fallback,
    /// Merged from two or more sources
    Hybrid,
}

impl DetectionSource {
    /// Geometry priority used when merging duplicate detections.
    /// Higher wins: ink-derived boxes are the most trustworthy, fallback
    /// boxes the least. `Hybrid` never appears among merge candidates;
    /// its rank only matters when callers compare already-fused elements.
    pub fn priority(&self) -> u8 {
        match self {
            Self::StrokeGeometry => 4,
            Self::MlObject | Self::MlFace | Self::Hybrid => 3,
            Self::SketchCnn => 2,
            Self::VisionApi => 1,
            Self::Fallback => 0,
        }
    }
}

/// Shape vocabulary for single-stroke classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Triangle,
    Line,
    Arrow,
    Star,
    /// Closed stroke with a known corner count but no better match
    Polygon { corners: usize },
    /// Cluster of nearby strokes reported without sub-classification
    MultiStrokeShape,
    Freeform,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle => write!(f, "circle"),
            Self::Rectangle => write!(f, "rectangle"),
            Self::Triangle => write!(f, "triangle"),
            Self::Line => write!(f, "line"),
            Self::Arrow => write!(f, "arrow"),
            Self::Star => write!(f, "star"),
            Self::Polygon { corners } => write!(f, "polygon-{corners}"),
            Self::MultiStrokeShape => write!(f, "multi-stroke-shape"),
            Self::Freeform => write!(f, "freeform"),
        }
    }
}

/// A shape classification with its confidence in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShapeScore {
    pub kind: ShapeKind,
    pub confidence: f64,
}

/// Derived, read-only geometric descriptors for one stroke (or stroke
/// group). Recomputed per request, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeometricFeatures {
    pub centroid: Point,
    pub area: f64,
    pub perimeter: f64,
    pub circularity: f64,
    pub rectangularity: f64,
    pub triangularity: f64,
    pub corner_count: usize,
    pub aspect_ratio: f64,
}

/// One annotated scene element: the unit of output for an analysis
/// request.
///
/// Bounding boxes are normalized to `[0, 1]` relative to the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectedElement {
    pub id: String,
    pub name: String,
    /// Detector confidence in `[0, 1]`
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    pub source: DetectionSource,
    /// Ids of the ink strokes backing this element, if any
    pub stroke_ids: Vec<String>,
    /// Simplified outline in normalized canvas units (at least 2 points)
    pub contour: Option<Vec<Point>>,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub is_container: bool,
    pub is_child: bool,
}

impl DetectedElement {
    /// Create an element with no hierarchy links yet
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        confidence: f64,
        bounding_box: BoundingBox,
        source: DetectionSource,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            confidence: confidence.clamp(0.0, 1.0),
            bounding_box,
            source,
            stroke_ids: Vec::new(),
            contour: None,
            parent_id: None,
            children: Vec::new(),
            is_container: false,
            is_child: false,
        }
    }
}

/// The final output of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzedScene {
    pub elements: Vec<DetectedElement>,
    /// Canvas the normalized coordinates are relative to
    pub canvas: CanvasSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serialization_is_kebab_case() {
        let json = serde_json::to_string(&DetectionSource::StrokeGeometry).unwrap();
        assert_eq!(json, "\"stroke-geometry\"");
        assert_eq!(DetectionSource::SketchCnn.to_string(), "sketch-cnn");
    }

    #[test]
    fn test_source_priority_ordering() {
        assert!(DetectionSource::StrokeGeometry.priority() > DetectionSource::MlObject.priority());
        assert!(DetectionSource::MlObject.priority() > DetectionSource::SketchCnn.priority());
        assert!(DetectionSource::SketchCnn.priority() > DetectionSource::VisionApi.priority());
        assert!(DetectionSource::VisionApi.priority() > DetectionSource::Fallback.priority());
        assert_eq!(
            DetectionSource::MlObject.priority(),
            DetectionSource::MlFace.priority()
        );
    }

    #[test]
    fn test_shape_kind_labels() {
        assert_eq!(ShapeKind::Polygon { corners: 5 }.to_string(), "polygon-5");
        assert_eq!(ShapeKind::MultiStrokeShape.to_string(), "multi-stroke-shape");
        assert_eq!(ShapeKind::Circle.to_string(), "circle");
    }

    #[test]
    fn test_element_confidence_clamped() {
        let bbox = BoundingBox::from_corners(0.0, 0.0, 1.0, 1.0).unwrap();
        let element =
            DetectedElement::new("e1", "dog", 1.7, bbox, DetectionSource::VisionApi);
        assert_eq!(element.confidence, 1.0);
    }
}
