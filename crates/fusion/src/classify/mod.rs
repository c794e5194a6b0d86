//! Geometric shape classification for ink strokes.
//!
//! A single stroke is scored against a fixed shape vocabulary using pure
//! coordinate geometry; groups of nearby strokes are reported as one
//! multi-stroke shape without further sub-classification.

pub mod features;
pub mod shapes;

pub use features::{stroke_metrics, StrokeMetrics};

use sketch_kit_common::{BoundingBox, Point, Stroke};

use crate::config::ClassifierConfig;
use crate::traits::StrokeClassifier;
use crate::types::{GeometricFeatures, ShapeKind, ShapeScore};

/// A cluster of one or more strokes with its classification
#[derive(Debug, Clone)]
pub struct ClassifiedGroup {
    pub stroke_ids: Vec<String>,
    pub score: ShapeScore,
    pub features: Option<GeometricFeatures>,
    /// Pixel-space bounding box of the whole group
    pub bounding_box: Option<BoundingBox>,
}

/// Scores strokes against the shape vocabulary (circle, rectangle,
/// triangle, line, arrow, star) with polygon/freeform fallbacks.
#[derive(Debug, Clone, Default)]
pub struct GeometricShapeClassifier {
    pub config: ClassifierConfig,
}

impl GeometricShapeClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Confidence for every shape type. Strokes with fewer than 3 points
    /// score 0 across the board.
    pub fn shape_scores(&self, points: &[Point]) -> Vec<ShapeScore> {
        let zero = |kind| ShapeScore {
            kind,
            confidence: 0.0,
        };
        let mut scores = vec![
            zero(ShapeKind::Circle),
            zero(ShapeKind::Rectangle),
            zero(ShapeKind::Triangle),
            zero(ShapeKind::Line),
            zero(ShapeKind::Arrow),
            zero(ShapeKind::Star),
        ];
        if points.len() < 3 {
            return scores;
        }
        let Some(metrics) = stroke_metrics(points, &self.config) else {
            return scores;
        };
        scores[0].confidence = shapes::score_circle(&metrics, &self.config);
        scores[1].confidence = shapes::score_rectangle(&metrics, &self.config);
        scores[2].confidence = shapes::score_triangle(&metrics, &self.config);
        scores[3].confidence = shapes::score_line(points, &self.config);
        scores[4].confidence = shapes::score_arrow(points, &self.config);
        scores[5].confidence = shapes::score_star(&metrics, &self.config);
        scores
    }

    /// Classify one point sequence, with derived features when the
    /// geometry is sufficient
    pub fn classify_points(&self, points: &[Point]) -> (ShapeScore, Option<GeometricFeatures>) {
        if points.len() < 3 {
            return (
                ShapeScore {
                    kind: ShapeKind::Freeform,
                    confidence: 0.0,
                },
                None,
            );
        }
        let Some(metrics) = stroke_metrics(points, &self.config) else {
            return (
                ShapeScore {
                    kind: ShapeKind::Freeform,
                    confidence: 0.0,
                },
                None,
            );
        };

        let scores = self.shape_scores(points);
        // Leave the features carrying the raw sub-scores even when the
        // final classification falls back
        let features = GeometricFeatures {
            centroid: features::centroid(points),
            area: metrics.area,
            perimeter: metrics.perimeter,
            circularity: scores[0].confidence,
            rectangularity: scores[1].confidence,
            triangularity: scores[2].confidence,
            corner_count: metrics.corner_count,
            aspect_ratio: if metrics.bounding_box.height > 0.0 {
                metrics.bounding_box.width / metrics.bounding_box.height
            } else {
                0.0
            },
        };

        let best = scores
            .iter()
            .copied()
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(ShapeScore {
                kind: ShapeKind::Freeform,
                confidence: 0.0,
            });

        let score = if best.confidence >= self.config.shape_confidence_floor {
            best
        } else if metrics.closed && metrics.corner_count >= 3 {
            ShapeScore {
                kind: ShapeKind::Polygon {
                    corners: metrics.corner_count,
                },
                confidence: self.config.shape_confidence_floor,
            }
        } else {
            ShapeScore {
                kind: ShapeKind::Freeform,
                confidence: self.config.freeform_confidence,
            }
        };
        (score, Some(features))
    }

    /// Cluster strokes whose bounding-box centers fall within the group
    /// distance threshold, then classify each cluster. Multi-stroke
    /// clusters keep a fixed label and confidence; only singleton clusters
    /// get the full shape vocabulary.
    pub fn classify_scene(&self, strokes: &[Stroke]) -> Vec<ClassifiedGroup> {
        let centers: Vec<Option<Point>> = strokes
            .iter()
            .map(|s| s.bounding_box().map(|b| b.center()))
            .collect();

        // Greedy single-link clustering over bbox centers
        let mut clusters: Vec<Vec<usize>> = Vec::new();
        for (i, center) in centers.iter().enumerate() {
            let Some(center) = center else {
                clusters.push(vec![i]);
                continue;
            };
            let found = clusters.iter_mut().find(|cluster| {
                cluster.iter().any(|&j| {
                    centers[j]
                        .map(|c| c.distance_to(*center) <= self.config.group_center_dist_px)
                        .unwrap_or(false)
                })
            });
            match found {
                Some(cluster) => cluster.push(i),
                None => clusters.push(vec![i]),
            }
        }

        clusters
            .into_iter()
            .map(|cluster| self.classify_cluster(strokes, &cluster))
            .collect()
    }

    fn classify_cluster(&self, strokes: &[Stroke], cluster: &[usize]) -> ClassifiedGroup {
        let stroke_ids: Vec<String> = cluster.iter().map(|&i| strokes[i].id.clone()).collect();
        let boxes: Vec<BoundingBox> = cluster
            .iter()
            .filter_map(|&i| strokes[i].bounding_box())
            .collect();
        let bounding_box = boxes
            .into_iter()
            .reduce(|acc, b| acc.union(&b));

        if cluster.len() > 1 {
            return ClassifiedGroup {
                stroke_ids,
                score: ShapeScore {
                    kind: ShapeKind::MultiStrokeShape,
                    confidence: self.config.group_confidence,
                },
                features: None,
                bounding_box,
            };
        }

        let points = &strokes[cluster[0]].points;
        let (score, features) = self.classify_points(points);
        ClassifiedGroup {
            stroke_ids,
            score,
            features,
            bounding_box,
        }
    }
}

impl StrokeClassifier for GeometricShapeClassifier {
    fn classify(&self, stroke: &Stroke) -> ShapeScore {
        self.classify_points(&stroke.points).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn circle_stroke(id: &str, cx: f64, cy: f64, radius: f64, count: usize) -> Stroke {
        let points = (0..=count)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / count as f64;
                Point::new(cx + radius * theta.cos(), cy + radius * theta.sin())
            })
            .collect();
        Stroke::new(id, points)
    }

    #[test]
    fn test_short_stroke_scores_zero_for_every_shape() {
        let classifier = GeometricShapeClassifier::default();
        let points = [Point::new(0.0, 0.0), Point::new(50.0, 50.0)];
        for score in classifier.shape_scores(&points) {
            assert_eq!(score.confidence, 0.0, "{:?} should score 0", score.kind);
        }
    }

    #[test]
    fn test_circle_beats_rectangle_and_triangle() {
        let classifier = GeometricShapeClassifier::default();
        let stroke = circle_stroke("c", 300.0, 300.0, 120.0, 64);
        let scores = classifier.shape_scores(&stroke.points);
        let circle = scores[0].confidence;
        assert!(circle > 0.85);
        assert!(circle > scores[1].confidence);
        assert!(circle > scores[2].confidence);
        assert_eq!(classifier.classify(&stroke).kind, ShapeKind::Circle);
    }

    #[test]
    fn test_square_classifies_as_rectangle() {
        let classifier = GeometricShapeClassifier::default();
        let mut points = Vec::new();
        for i in 0..10 {
            points.push(Point::new(i as f64 * 10.0, 0.0));
        }
        for i in 0..10 {
            points.push(Point::new(100.0, i as f64 * 10.0));
        }
        for i in 0..10 {
            points.push(Point::new(100.0 - i as f64 * 10.0, 100.0));
        }
        for i in 0..10 {
            points.push(Point::new(0.0, 100.0 - i as f64 * 10.0));
        }
        points.push(Point::new(0.0, 0.0));
        let stroke = Stroke::new("sq", points);

        let scores = classifier.shape_scores(&stroke.points);
        let (score, features) = classifier.classify_points(&stroke.points);
        let features = features.unwrap();
        assert_eq!(features.corner_count, 4);
        assert_eq!(score.kind, ShapeKind::Rectangle);
        assert!(scores[1].confidence > scores[0].confidence);
        assert!(scores[1].confidence > scores[2].confidence);
    }

    #[test]
    fn test_nearby_strokes_form_a_multi_stroke_group() {
        let classifier = GeometricShapeClassifier::default();
        let strokes = vec![
            circle_stroke("a", 100.0, 100.0, 30.0, 32),
            circle_stroke("b", 140.0, 100.0, 30.0, 32),
            circle_stroke("far", 900.0, 900.0, 30.0, 32),
        ];
        let groups = classifier.classify_scene(&strokes);
        assert_eq!(groups.len(), 2);

        let multi = groups
            .iter()
            .find(|g| g.stroke_ids.len() == 2)
            .expect("two nearby strokes should cluster");
        assert_eq!(multi.score.kind, ShapeKind::MultiStrokeShape);
        assert_eq!(multi.score.confidence, 0.6);

        let single = groups.iter().find(|g| g.stroke_ids.len() == 1).unwrap();
        assert_eq!(single.score.kind, ShapeKind::Circle);
    }

    #[test]
    fn test_open_wobbly_stroke_falls_back_to_freeform() {
        let classifier = GeometricShapeClassifier::default();
        // Gentle open sine path: too bent for a line, no corners, not closed
        let points: Vec<Point> = (0..40)
            .map(|i| {
                let x = i as f64 * 5.0;
                Point::new(x, 60.0 * (x / 30.0).sin())
            })
            .collect();
        let (score, _) = classifier.classify_points(&points);
        assert_eq!(score.kind, ShapeKind::Freeform);
        assert_eq!(score.confidence, 0.5);
    }
}
