//! Merges and deduplicates detections across sources using name
//! similarity plus spatial overlap, with a source-priority tie-break for
//! geometry. Elements that arrive with no usable geometry are recovered
//! from nearby ink strokes, or given a semantic fallback box as a last
//! resort.

use tracing::debug;

use sketch_kit_common::{BoundingBox, CanvasSize, Point, Stroke};

use crate::{
    associate::StrokeAssociator,
    config::FusionConfig,
    normalize::DetectionCandidate,
    types::{DetectedElement, DetectionSource},
};

/// Fallback box dimensions (normalized) keyed on name keywords
const FALLBACK_SIZES: &[(&str, f64, f64)] = &[
    ("face", 0.15, 0.15),
    ("head", 0.15, 0.15),
    ("body", 0.2, 0.4),
    ("person", 0.2, 0.4),
    ("eye", 0.05, 0.03),
    ("nose", 0.05, 0.08),
    ("mouth", 0.08, 0.04),
    ("hair", 0.2, 0.1),
];
const FALLBACK_DEFAULT: (f64, f64) = (0.1, 0.1);

#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    pub config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Name similarity ladder: exact case-insensitive match, substring
    /// in either direction, shared word longer than 3 characters, else 0
    pub fn name_similarity(a: &str, b: &str) -> f64 {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }
        if a.contains(&b) || b.contains(&a) {
            return 0.7;
        }
        let shares_word = a
            .split_whitespace()
            .any(|word| word.len() > 3 && b.split_whitespace().any(|other| other == word));
        if shares_word {
            0.5
        } else {
            0.0
        }
    }

    /// Two candidates describe the same object iff their names match and
    /// they overlap or sit close together, or they overlap strongly
    /// regardless of names. Geometry-less candidates never match; they go
    /// through geometry recovery first.
    pub fn is_same_object(&self, a: &DetectionCandidate, b: &DetectionCandidate) -> bool {
        let (Some(box_a), Some(box_b)) = (a.bounding_box, b.bounding_box) else {
            return false;
        };
        let iou = box_a.iou(&box_b);
        if iou > self.config.iou_strong_overlap {
            return true;
        }
        let name_match =
            Self::name_similarity(&a.name, &b.name) >= self.config.name_match_floor;
        if !name_match {
            return false;
        }
        let center_distance = box_a.center().distance_to(box_b.center());
        iou > self.config.iou_same_object
            || center_distance < self.config.center_dist_same_object
    }

    /// Give a geometry-less candidate the best box available: the union
    /// of nearby ink strokes, else a keyword-sized fallback box at its
    /// reported position
    pub fn recover_geometry(
        &self,
        candidate: &mut DetectionCandidate,
        strokes: &[Stroke],
        canvas: CanvasSize,
    ) {
        if candidate.bounding_box.is_some() {
            return;
        }
        let target = candidate.position.unwrap_or(Point::new(0.5, 0.5));

        let associator = StrokeAssociator::new(self.config.stroke_search_radius);
        let nearby = associator.find_near(strokes, target, canvas);
        if let Some(union) = StrokeAssociator::normalized_union(&nearby, canvas) {
            debug!(
                id = %candidate.id,
                strokes = nearby.len(),
                "recovered geometry from ink strokes"
            );
            candidate.bounding_box = Some(union);
            candidate.source = DetectionSource::StrokeGeometry;
            candidate.stroke_ids = nearby.iter().map(|s| s.id.clone()).collect();
            return;
        }

        let (w, h) = Self::fallback_size(&candidate.name);
        let fallback = BoundingBox::from_center(target.x, target.y, w, h)
            .map(|b| b.clip_unit())
            .unwrap_or_else(|_| {
                BoundingBox::from_corners(0.45, 0.45, 0.55, 0.55)
                    .expect("static corners are valid")
            });
        debug!(id = %candidate.id, "synthesized fallback box");
        candidate.bounding_box = Some(fallback);
        candidate.source = DetectionSource::Fallback;
    }

    /// Keyword-matched normalized fallback dimensions
    pub fn fallback_size(name: &str) -> (f64, f64) {
        let name = name.to_lowercase();
        for (keyword, w, h) in FALLBACK_SIZES {
            if name.contains(keyword) {
                return (*w, *h);
            }
        }
        FALLBACK_DEFAULT
    }

    /// Run geometry recovery, then single-link pairwise merging, and
    /// build the final elements. Output order follows the first member of
    /// each merged cluster.
    pub fn fuse(
        &self,
        mut candidates: Vec<DetectionCandidate>,
        strokes: &[Stroke],
        canvas: CanvasSize,
    ) -> Vec<DetectedElement> {
        for candidate in &mut candidates {
            self.recover_geometry(candidate, strokes, canvas);
        }
        // Hybrid is an output-only tag; merged elements never re-enter
        // as candidates
        debug_assert!(candidates
            .iter()
            .all(|c| c.source != DetectionSource::Hybrid));

        let mut used = vec![false; candidates.len()];
        let mut elements = Vec::new();

        for i in 0..candidates.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            let mut cluster = vec![i];

            // Single-link: a new candidate joins if it matches any member
            let mut grew = true;
            while grew {
                grew = false;
                for j in 0..candidates.len() {
                    if used[j] {
                        continue;
                    }
                    if cluster
                        .iter()
                        .any(|&k| self.is_same_object(&candidates[k], &candidates[j]))
                    {
                        used[j] = true;
                        cluster.push(j);
                        grew = true;
                    }
                }
            }

            if let Some(element) = self.merge_cluster(&candidates, &cluster) {
                elements.push(element);
            }
        }

        debug!(
            input = candidates.len(),
            output = elements.len(),
            "fused detections"
        );
        elements
    }

    fn merge_cluster(
        &self,
        candidates: &[DetectionCandidate],
        cluster: &[usize],
    ) -> Option<DetectedElement> {
        let members: Vec<&DetectionCandidate> = cluster.iter().map(|&i| &candidates[i]).collect();

        // The box comes from the highest-priority source that has one
        let box_donor = members
            .iter()
            .filter(|m| m.bounding_box.is_some())
            .max_by_key(|m| m.source.priority())?;
        let bounding_box = box_donor.bounding_box?;

        let confidence = members
            .iter()
            .map(|m| m.confidence)
            .fold(0.0_f64, f64::max);
        let name_donor = members
            .iter()
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(&members[0]);

        // Merging across distinct sources yields a hybrid element; a
        // cluster from one source keeps it
        let first_source = members[0].source;
        let source = if members.iter().all(|m| m.source == first_source) {
            first_source
        } else {
            DetectionSource::Hybrid
        };

        let mut stroke_ids: Vec<String> = Vec::new();
        for member in &members {
            for id in &member.stroke_ids {
                if !stroke_ids.contains(id) {
                    stroke_ids.push(id.clone());
                }
            }
        }

        let mut element = DetectedElement::new(
            members[0].id.clone(),
            name_donor.name.clone(),
            confidence,
            bounding_box,
            source,
        );
        element.stroke_ids = stroke_ids;
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DetectionCandidate;

    fn candidate(
        id: &str,
        name: &str,
        confidence: f64,
        bbox: Option<BoundingBox>,
        source: DetectionSource,
    ) -> DetectionCandidate {
        DetectionCandidate {
            id: id.to_string(),
            name: name.to_string(),
            confidence,
            bounding_box: bbox,
            position: None,
            source,
            stroke_ids: Vec::new(),
        }
    }

    fn unit_box(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox::from_corners(min_x, min_y, max_x, max_y).unwrap()
    }

    fn canvas() -> CanvasSize {
        CanvasSize::new(1000.0, 1000.0).unwrap()
    }

    #[test]
    fn test_name_similarity_ladder() {
        assert_eq!(FusionEngine::name_similarity("Dog", "dog"), 1.0);
        assert_eq!(FusionEngine::name_similarity("dog", "dog face"), 0.7);
        assert_eq!(
            FusionEngine::name_similarity("brown bear", "polar bear"),
            0.5
        );
        // Shared words must be longer than 3 characters
        assert_eq!(FusionEngine::name_similarity("the dog", "the cat"), 0.0);
        assert_eq!(FusionEngine::name_similarity("cat", "tree"), 0.0);
    }

    #[test]
    fn test_is_same_object_is_symmetric() {
        let engine = FusionEngine::default();
        let cases = [
            (
                candidate("a", "dog", 0.9, Some(unit_box(0.2, 0.2, 0.7, 0.7)), DetectionSource::MlObject),
                candidate("b", "dog", 0.8, Some(unit_box(0.25, 0.25, 0.75, 0.75)), DetectionSource::VisionApi),
            ),
            (
                candidate("c", "cat", 0.9, Some(unit_box(0.0, 0.0, 0.2, 0.2)), DetectionSource::MlObject),
                candidate("d", "tree", 0.8, Some(unit_box(0.8, 0.8, 1.0, 1.0)), DetectionSource::VisionApi),
            ),
            (
                candidate("e", "circle", 0.9, None, DetectionSource::VisionApi),
                candidate("f", "circle", 0.8, Some(unit_box(0.4, 0.4, 0.6, 0.6)), DetectionSource::SketchCnn),
            ),
        ];
        for (a, b) in &cases {
            assert_eq!(engine.is_same_object(a, b), engine.is_same_object(b, a));
        }
    }

    #[test]
    fn test_strong_overlap_merges_regardless_of_name() {
        let engine = FusionEngine::default();
        let a = candidate("a", "animal", 0.9, Some(unit_box(0.2, 0.2, 0.7, 0.7)), DetectionSource::MlObject);
        let b = candidate("b", "pet", 0.8, Some(unit_box(0.22, 0.22, 0.72, 0.72)), DetectionSource::VisionApi);
        assert!(a.bounding_box.unwrap().iou(&b.bounding_box.unwrap()) > 0.5);
        assert!(engine.is_same_object(&a, &b));
    }

    #[test]
    fn test_two_dogs_fuse_into_one_hybrid_element() {
        let engine = FusionEngine::default();
        // IoU = 0.45*0.45 / (0.25 + 0.25 - 0.2025) = 0.68
        let a = candidate("a", "Dog", 0.8, Some(unit_box(0.2, 0.2, 0.7, 0.7)), DetectionSource::MlObject);
        let b = candidate("b", "dog", 0.9, Some(unit_box(0.25, 0.25, 0.75, 0.75)), DetectionSource::VisionApi);
        let elements = engine.fuse(vec![a, b], &[], canvas());
        assert_eq!(elements.len(), 1);
        let element = &elements[0];
        assert_eq!(element.source, DetectionSource::Hybrid);
        assert_eq!(element.confidence, 0.9);
        // Box comes from the higher-priority ml-object source
        assert!(element.bounding_box.approx_eq(&unit_box(0.2, 0.2, 0.7, 0.7)));
    }

    #[test]
    fn test_distinct_objects_stay_separate() {
        let engine = FusionEngine::default();
        let a = candidate("a", "cat", 0.8, Some(unit_box(0.0, 0.0, 0.2, 0.2)), DetectionSource::MlObject);
        let b = candidate("b", "tree", 0.9, Some(unit_box(0.7, 0.7, 0.95, 0.95)), DetectionSource::VisionApi);
        let elements = engine.fuse(vec![a, b], &[], canvas());
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn test_geometry_recovery_prefers_nearby_ink() {
        let engine = FusionEngine::default();
        let strokes = vec![Stroke::new(
            "s1",
            vec![Point::new(450.0, 450.0), Point::new(550.0, 550.0)],
        )];
        let mut label = candidate("v", "circle", 0.7, None, DetectionSource::VisionApi);
        label.position = Some(Point::new(0.5, 0.5));

        let elements = engine.fuse(vec![label], &strokes, canvas());
        assert_eq!(elements.len(), 1);
        let element = &elements[0];
        assert_eq!(element.source, DetectionSource::StrokeGeometry);
        assert_eq!(element.stroke_ids, vec!["s1".to_string()]);
        assert!(element.bounding_box.approx_eq(&unit_box(0.45, 0.45, 0.55, 0.55)));
    }

    #[test]
    fn test_fallback_box_sizes_by_keyword() {
        assert_eq!(FusionEngine::fallback_size("Face"), (0.15, 0.15));
        assert_eq!(FusionEngine::fallback_size("person walking"), (0.2, 0.4));
        assert_eq!(FusionEngine::fallback_size("left eye"), (0.05, 0.03));
        assert_eq!(FusionEngine::fallback_size("unknown thing"), (0.1, 0.1));
    }

    #[test]
    fn test_fallback_box_without_any_ink() {
        let engine = FusionEngine::default();
        let mut label = candidate("v", "hair", 0.6, None, DetectionSource::VisionApi);
        label.position = Some(Point::new(0.95, 0.1));

        let elements = engine.fuse(vec![label], &[], canvas());
        assert_eq!(elements.len(), 1);
        let element = &elements[0];
        assert_eq!(element.source, DetectionSource::Fallback);
        let bbox = element.bounding_box;
        // Clipped to the unit square
        assert!(bbox.max_x <= 1.0);
        assert!(bbox.min_x >= 0.0);
        assert!((bbox.height - 0.1).abs() < 1e-9);
    }
}
