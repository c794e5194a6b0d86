//! Recovers ink-accurate geometry for elements that arrive with only a
//! name and an approximate position: finds strokes near a normalized
//! point and computes union bounding boxes over their raw points.

use sketch_kit_common::{BoundingBox, CanvasSize, Point, Stroke};

/// Radius query over stroke bounding-box centers
#[derive(Debug, Clone)]
pub struct StrokeAssociator {
    /// Search radius in normalized canvas units
    pub search_radius: f64,
}

impl Default for StrokeAssociator {
    fn default() -> Self {
        Self {
            search_radius: 0.15,
        }
    }
}

impl StrokeAssociator {
    pub fn new(search_radius: f64) -> Self {
        Self { search_radius }
    }

    /// Every stroke whose bounding-box center lies within the search
    /// radius of the normalized target point
    pub fn find_near<'a>(
        &self,
        strokes: &'a [Stroke],
        target: Point,
        canvas: CanvasSize,
    ) -> Vec<&'a Stroke> {
        strokes
            .iter()
            .filter(|stroke| {
                stroke
                    .bounding_box()
                    .map(|bbox| {
                        bbox.normalize(canvas)
                            .center()
                            .distance_to(target)
                            <= self.search_radius
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Componentwise min/max over all points of all given strokes, in the
    /// strokes' own (pixel) coordinate space
    pub fn union_bounding_box(strokes: &[&Stroke]) -> Option<BoundingBox> {
        strokes
            .iter()
            .filter_map(|s| s.bounding_box())
            .reduce(|acc, b| acc.union(&b))
    }

    /// Union box divided by the canvas dimensions
    pub fn normalized_union(strokes: &[&Stroke], canvas: CanvasSize) -> Option<BoundingBox> {
        Self::union_bounding_box(strokes).map(|b| b.normalize(canvas))
    }
}
