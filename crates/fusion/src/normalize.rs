//! Canonicalizes heterogeneous external detection payloads into one
//! normalized candidate shape before fusion.
//!
//! External detectors are collaborators that already ran; this module
//! only reshapes their already-resolved results. Pixel coordinates are
//! divided by the canvas dimensions exactly once, here.

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use sketch_kit_common::{BoundingBox, CanvasSize, Point};

use crate::types::DetectionSource;

/// Four-corner pixel rectangle with label and score (vision object
/// detectors, ML object detectors, CNN sketch classifiers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawBoxDetection {
    pub label: String,
    pub score: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Two-corner pixel face box with probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawFaceDetection {
    pub probability: f64,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Vision-API label with no geometry beyond an approximate position
/// (already normalized to `[0, 1]` by the reporting service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawLabelDetection {
    pub label: String,
    pub score: f64,
    pub position: Option<Point>,
}

/// Everything the external collaborators produced for one analysis
/// request. Empty lists are the norm, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawDetections {
    #[serde(default)]
    pub vision_objects: Vec<RawBoxDetection>,
    #[serde(default)]
    pub vision_labels: Vec<RawLabelDetection>,
    #[serde(default)]
    pub ml_objects: Vec<RawBoxDetection>,
    #[serde(default)]
    pub ml_faces: Vec<RawFaceDetection>,
    #[serde(default)]
    pub sketch_shapes: Vec<RawBoxDetection>,
}

impl RawDetections {
    pub fn is_empty(&self) -> bool {
        self.vision_objects.is_empty()
            && self.vision_labels.is_empty()
            && self.ml_objects.is_empty()
            && self.ml_faces.is_empty()
            && self.sketch_shapes.is_empty()
    }
}

/// A normalized detection on its way into the fusion engine. Unlike the
/// final element, a candidate may still lack geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCandidate {
    pub id: String,
    pub name: String,
    pub confidence: f64,
    /// Normalized box, when the detector provided usable geometry
    pub bounding_box: Option<BoundingBox>,
    /// Normalized approximate position for geometry-less detections
    pub position: Option<Point>,
    pub source: DetectionSource,
    pub stroke_ids: Vec<String>,
}

impl DetectionCandidate {
    /// Best available center: the box center, else the reported position
    pub fn center(&self) -> Option<Point> {
        self.bounding_box.map(|b| b.center()).or(self.position)
    }
}

/// Converts every external detector's box representation into the
/// canonical normalized [`BoundingBox`]
#[derive(Debug, Clone, Default)]
pub struct DetectionNormalizer;

impl DetectionNormalizer {
    /// Normalize a four-corner pixel rectangle. Width/height/center are
    /// derived from the same four normalized corners, so the box
    /// invariants hold by construction.
    pub fn normalize_rect(
        &self,
        raw: &RawBoxDetection,
        source: DetectionSource,
        canvas: CanvasSize,
        index: usize,
    ) -> DetectionCandidate {
        let min_x = raw.x / canvas.width;
        let min_y = raw.y / canvas.height;
        let max_x = (raw.x + raw.width) / canvas.width;
        let max_y = (raw.y + raw.height) / canvas.height;
        // Detectors occasionally emit flipped or zero-size rects; sorting
        // the corners keeps the candidate usable
        let bounding_box =
            BoundingBox::from_corners(min_x.min(max_x), min_y.min(max_y), min_x.max(max_x), min_y.max(max_y))
                .ok();
        DetectionCandidate {
            id: format!("{source}-{index}"),
            name: raw.label.clone(),
            confidence: raw.score.clamp(0.0, 1.0),
            bounding_box,
            position: None,
            source,
            stroke_ids: Vec::new(),
        }
    }

    /// Normalize a two-corner pixel face box
    pub fn normalize_face(
        &self,
        raw: &RawFaceDetection,
        canvas: CanvasSize,
        index: usize,
    ) -> DetectionCandidate {
        let min_x = raw.min_x.min(raw.max_x) / canvas.width;
        let min_y = raw.min_y.min(raw.max_y) / canvas.height;
        let max_x = raw.min_x.max(raw.max_x) / canvas.width;
        let max_y = raw.min_y.max(raw.max_y) / canvas.height;
        DetectionCandidate {
            id: format!("{}-{index}", DetectionSource::MlFace),
            name: "face".to_string(),
            confidence: raw.probability.clamp(0.0, 1.0),
            bounding_box: BoundingBox::from_corners(min_x, min_y, max_x, max_y).ok(),
            position: None,
            source: DetectionSource::MlFace,
            stroke_ids: Vec::new(),
        }
    }

    /// Wrap a geometry-less vision label; fusion will recover or
    /// synthesize its box later
    pub fn normalize_label(
        &self,
        raw: &RawLabelDetection,
        canvas: CanvasSize,
        index: usize,
    ) -> DetectionCandidate {
        let _ = canvas;
        DetectionCandidate {
            id: format!("{}-{index}", DetectionSource::VisionApi),
            name: raw.label.clone(),
            confidence: raw.score.clamp(0.0, 1.0),
            bounding_box: None,
            position: raw.position,
            source: DetectionSource::VisionApi,
            stroke_ids: Vec::new(),
        }
    }

    /// Normalize every raw detection, preserving per-source input order
    pub fn normalize_all(
        &self,
        raw: &RawDetections,
        canvas: CanvasSize,
    ) -> Vec<DetectionCandidate> {
        let mut candidates = Vec::new();
        for (i, d) in raw.vision_objects.iter().enumerate() {
            candidates.push(self.normalize_rect(d, DetectionSource::VisionApi, canvas, i));
        }
        for (i, d) in raw.ml_objects.iter().enumerate() {
            candidates.push(self.normalize_rect(d, DetectionSource::MlObject, canvas, i));
        }
        for (i, d) in raw.ml_faces.iter().enumerate() {
            candidates.push(self.normalize_face(d, canvas, i));
        }
        for (i, d) in raw.sketch_shapes.iter().enumerate() {
            candidates.push(self.normalize_rect(d, DetectionSource::SketchCnn, canvas, i));
        }
        let offset = raw.vision_objects.len();
        for (i, d) in raw.vision_labels.iter().enumerate() {
            candidates.push(self.normalize_label(d, canvas, offset + i));
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_kit_common::COORD_EPSILON;

    fn canvas() -> CanvasSize {
        CanvasSize::new(800.0, 600.0).unwrap()
    }

    #[test]
    fn test_rect_normalization() {
        let raw = RawBoxDetection {
            label: "dog".to_string(),
            score: 0.9,
            x: 80.0,
            y: 60.0,
            width: 160.0,
            height: 120.0,
        };
        let candidate =
            DetectionNormalizer.normalize_rect(&raw, DetectionSource::MlObject, canvas(), 0);
        let bbox = candidate.bounding_box.unwrap();
        assert!((bbox.min_x - 0.1).abs() < COORD_EPSILON);
        assert!((bbox.min_y - 0.1).abs() < COORD_EPSILON);
        assert!((bbox.max_x - 0.3).abs() < COORD_EPSILON);
        assert!((bbox.max_y - 0.3).abs() < COORD_EPSILON);
        assert!((bbox.center_x - 0.2).abs() < COORD_EPSILON);
        assert!((bbox.width - 0.2).abs() < COORD_EPSILON);
        assert_eq!(candidate.id, "ml-object-0");
    }

    #[test]
    fn test_flipped_rect_is_repaired() {
        let raw = RawBoxDetection {
            label: "blob".to_string(),
            score: 0.5,
            x: 400.0,
            y: 300.0,
            width: -200.0,
            height: -150.0,
        };
        let candidate =
            DetectionNormalizer.normalize_rect(&raw, DetectionSource::SketchCnn, canvas(), 3);
        let bbox = candidate.bounding_box.unwrap();
        assert!(bbox.min_x <= bbox.max_x);
        assert!(bbox.min_y <= bbox.max_y);
        assert_eq!(candidate.id, "sketch-cnn-3");
    }

    #[test]
    fn test_face_normalization() {
        let raw = RawFaceDetection {
            probability: 0.8,
            min_x: 200.0,
            min_y: 150.0,
            max_x: 400.0,
            max_y: 450.0,
        };
        let candidate = DetectionNormalizer.normalize_face(&raw, canvas(), 0);
        let bbox = candidate.bounding_box.unwrap();
        assert!((bbox.min_x - 0.25).abs() < COORD_EPSILON);
        assert!((bbox.max_y - 0.75).abs() < COORD_EPSILON);
        assert_eq!(candidate.name, "face");
        assert_eq!(candidate.source, DetectionSource::MlFace);
    }

    #[test]
    fn test_label_keeps_position_without_geometry() {
        let raw = RawLabelDetection {
            label: "sun".to_string(),
            score: 0.7,
            position: Some(Point::new(0.5, 0.25)),
        };
        let candidate = DetectionNormalizer.normalize_label(&raw, canvas(), 0);
        assert!(candidate.bounding_box.is_none());
        assert_eq!(candidate.center(), Some(Point::new(0.5, 0.25)));
    }

    #[test]
    fn test_normalized_candidates_never_carry_the_hybrid_tag() {
        // Hybrid marks fused output; every candidate entering fusion
        // keeps its concrete detector source
        let raw = RawDetections {
            vision_objects: vec![RawBoxDetection {
                label: "dog".into(),
                score: 0.9,
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 100.0,
            }],
            vision_labels: vec![RawLabelDetection {
                label: "sun".into(),
                score: 0.7,
                position: None,
            }],
            ml_objects: vec![RawBoxDetection {
                label: "cat".into(),
                score: 0.8,
                x: 50.0,
                y: 50.0,
                width: 100.0,
                height: 100.0,
            }],
            ml_faces: vec![RawFaceDetection {
                probability: 0.6,
                min_x: 10.0,
                min_y: 10.0,
                max_x: 40.0,
                max_y: 40.0,
            }],
            sketch_shapes: vec![RawBoxDetection {
                label: "circle".into(),
                score: 0.5,
                x: 300.0,
                y: 300.0,
                width: 50.0,
                height: 50.0,
            }],
        };
        let candidates = DetectionNormalizer.normalize_all(&raw, canvas());
        assert_eq!(candidates.len(), 5);
        for candidate in &candidates {
            assert_ne!(candidate.source, DetectionSource::Hybrid);
        }
    }

    #[test]
    fn test_normalize_all_keeps_input_order() {
        let raw = RawDetections {
            ml_objects: vec![
                RawBoxDetection {
                    label: "cat".into(),
                    score: 0.9,
                    x: 0.0,
                    y: 0.0,
                    width: 100.0,
                    height: 100.0,
                },
                RawBoxDetection {
                    label: "dog".into(),
                    score: 0.8,
                    x: 200.0,
                    y: 200.0,
                    width: 100.0,
                    height: 100.0,
                },
            ],
            ..Default::default()
        };
        let candidates = DetectionNormalizer.normalize_all(&raw, canvas());
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "cat");
        assert_eq!(candidates[1].name, "dog");
    }
}
