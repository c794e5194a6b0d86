//! Pure coordinate geometry over stroke point sequences: closure tests,
//! turning-angle corner detection, shoelace area, perimeter.
//!
//! Every function here is total: degenerate input yields zero or a safe
//! default, never a panic.

use geo::Area;
use geo_types::{Coord, LineString, Polygon};
use sketch_kit_common::{BoundingBox, Point};

use crate::config::ClassifierConfig;

/// Geometry computed once per stroke and shared by the shape scorers
#[derive(Debug, Clone)]
pub struct StrokeMetrics {
    pub closed: bool,
    pub corner_count: usize,
    pub area: f64,
    pub perimeter: f64,
    pub bounding_box: BoundingBox,
}

/// Compute the shared metrics for one stroke's points.
/// Returns `None` for an empty point sequence.
pub fn stroke_metrics(points: &[Point], config: &ClassifierConfig) -> Option<StrokeMetrics> {
    let bounding_box = BoundingBox::from_points(points)?;
    Some(StrokeMetrics {
        closed: is_closed(points, config),
        corner_count: count_corners(points, config),
        area: polygon_area(points),
        perimeter: perimeter(points),
        bounding_box,
    })
}

/// Mean length of consecutive segments; 0 for fewer than 2 points
pub fn mean_segment_length(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let total: f64 = points.windows(2).map(|w| w[0].distance_to(w[1])).sum();
    total / (points.len() - 1) as f64
}

/// A stroke is closed when its endpoints are within
/// `max(closure_base_px, closure_mean_segment_factor * mean segment length)`
pub fn is_closed(points: &[Point], config: &ClassifierConfig) -> bool {
    if points.len() < 3 {
        return false;
    }
    let gap = points[0].distance_to(points[points.len() - 1]);
    let tolerance = config
        .closure_base_px
        .max(config.closure_mean_segment_factor * mean_segment_length(points));
    gap < tolerance
}

/// Sampled turning-angle corner detection.
///
/// Samples every `max(1, n / corner_sample_divisor)` points, takes the
/// direction vectors before and after each sampled point, and accepts a
/// corner when the law-of-cosines angle between them deviates from pi by
/// more than `corner_angle_threshold` radians. Accepted corners must be
/// at least `corner_min_gap_steps` sample steps apart. Closed strokes are
/// scanned circularly so the start corner is counted too.
pub fn count_corners(points: &[Point], config: &ClassifierConfig) -> usize {
    if points.len() < 3 {
        return 0;
    }
    let closed = is_closed(points, config);

    // Scan the ring without the duplicated endpoint
    let ring: &[Point] = if closed && points[0].distance_to(points[points.len() - 1]) < 1e-9 {
        &points[..points.len() - 1]
    } else {
        points
    };
    let n = ring.len();
    if n < 3 {
        return 0;
    }

    let step = (n / config.corner_sample_divisor).max(1);
    let min_gap = (config.corner_min_gap_steps * step) as isize;

    let mut corners = 0usize;
    let mut last_accepted: isize = isize::MIN / 2;

    let indices: Vec<usize> = if closed {
        (0..n).step_by(step).collect()
    } else {
        (step..n.saturating_sub(step)).step_by(step).collect()
    };

    for i in indices {
        let prev = ring[(i + n - step) % n];
        let next = ring[(i + step) % n];
        let curr = ring[i];
        let a = prev.distance_to(curr);
        let b = curr.distance_to(next);
        let c = prev.distance_to(next);
        if a < 1e-9 || b < 1e-9 {
            continue;
        }
        // Interior angle at the sampled point; a straight path gives pi
        let cos_angle = ((a * a + b * b - c * c) / (2.0 * a * b)).clamp(-1.0, 1.0);
        let angle = cos_angle.acos();
        if (std::f64::consts::PI - angle).abs() > config.corner_angle_threshold {
            if i as isize - last_accepted >= min_gap {
                corners += 1;
                last_accepted = i as isize;
            }
        }
    }
    corners
}

/// Absolute shoelace area of the closed polygon through the points;
/// 0 for fewer than 3 points
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let coords: Vec<Coord<f64>> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    Polygon::new(LineString::new(coords), vec![]).unsigned_area()
}

/// Sum of consecutive segment lengths plus the closing segment
pub fn perimeter(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let open: f64 = points.windows(2).map(|w| w[0].distance_to(w[1])).sum();
    open + points[points.len() - 1].distance_to(points[0])
}

/// Mean of the points; origin for an empty sequence
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::new(0.0, 0.0);
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Point::new(sum_x / n, sum_y / n)
}

/// Perpendicular distance from a point to the segment `a`-`b`.
/// A zero-length segment falls back to the direct point distance.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-12 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * dx, a.y + t * dy);
    p.distance_to(proj)
}
