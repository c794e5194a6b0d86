//! Per-shape confidence scoring. Each scorer returns a confidence in
//! `[0, 1]`; malformed or insufficient geometry scores 0 rather than
//! erroring.

use std::f64::consts::PI;

use sketch_kit_common::Point;

use crate::classify::features::{point_segment_distance, StrokeMetrics};
use crate::config::ClassifierConfig;

/// Circle: weighted sum of bounding-box squareness and the ratio of the
/// actual perimeter to the perimeter expected from the area-derived
/// radius. Requires a closed stroke.
pub fn score_circle(metrics: &StrokeMetrics, _config: &ClassifierConfig) -> f64 {
    if !metrics.closed || metrics.area <= 0.0 || metrics.perimeter <= 0.0 {
        return 0.0;
    }
    let w = metrics.bounding_box.width;
    let h = metrics.bounding_box.height;
    let long_side = w.max(h);
    if long_side <= 0.0 {
        return 0.0;
    }
    let side_ratio = w.min(h) / long_side;

    let radius = (metrics.area / PI).sqrt();
    let expected_perimeter = 2.0 * PI * radius;
    let perimeter_ratio =
        metrics.perimeter.min(expected_perimeter) / metrics.perimeter.max(expected_perimeter);

    (0.6 * side_ratio + 0.4 * perimeter_ratio).clamp(0.0, 1.0)
}

/// Rectangle: requires a closed stroke with 3 to 6 detected corners.
/// Combines a corner score peaking at exactly 4 corners, the area-fill
/// ratio against the bounding box, and the perimeter ratio against
/// `2 * (w + h)`; a strongly filled box earns a boost.
pub fn score_rectangle(metrics: &StrokeMetrics, config: &ClassifierConfig) -> f64 {
    if !metrics.closed || !(3..=6).contains(&metrics.corner_count) {
        return 0.0;
    }
    let w = metrics.bounding_box.width;
    let h = metrics.bounding_box.height;
    let bbox_area = w * h;
    if bbox_area <= 0.0 || metrics.perimeter <= 0.0 {
        return 0.0;
    }

    let corner_score = 1.0 - (metrics.corner_count as f64 - 4.0).abs() * 0.25;
    let fill_ratio = (metrics.area / bbox_area).min(1.0);
    let expected_perimeter = 2.0 * (w + h);
    let perimeter_ratio =
        metrics.perimeter.min(expected_perimeter) / metrics.perimeter.max(expected_perimeter);

    let mut confidence = 0.4 * corner_score + 0.3 * fill_ratio + 0.3 * perimeter_ratio;
    if fill_ratio > config.rect_fill_boost_threshold {
        confidence *= config.rect_fill_boost;
    }
    confidence.clamp(0.0, 1.0)
}

/// Triangle: requires a closed stroke with 2 to 4 detected corners,
/// peaking at 3. A triangle fills about half of its bounding box.
pub fn score_triangle(metrics: &StrokeMetrics, _config: &ClassifierConfig) -> f64 {
    if !metrics.closed || !(2..=4).contains(&metrics.corner_count) {
        return 0.0;
    }
    let bbox_area = metrics.bounding_box.area();
    if bbox_area <= 0.0 {
        return 0.0;
    }

    let corner_score = 1.0 - (metrics.corner_count as f64 - 3.0).abs() * 0.5;
    let fill_ratio = metrics.area / bbox_area;
    let fill_score = (1.0 - (fill_ratio - 0.5).abs() * 2.0).max(0.0);

    (0.5 * corner_score + 0.5 * fill_score).clamp(0.0, 1.0)
}

/// Line: confidence falls off with the average perpendicular deviation
/// from the chord between the endpoints. Exactly-2-point strokes score
/// 1.0 (this fast path serves sub-segment evaluation; whole strokes with
/// fewer than 3 points are gated off upstream).
pub fn score_line(points: &[Point], config: &ClassifierConfig) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    if points.len() == 2 {
        return 1.0;
    }
    let a = points[0];
    let b = points[points.len() - 1];
    let length = a.distance_to(b);
    if length < 1e-9 {
        return 0.0;
    }

    let mut total_deviation = 0.0;
    let mut max_deviation: f64 = 0.0;
    for p in &points[1..points.len() - 1] {
        let d = point_segment_distance(*p, a, b);
        total_deviation += d;
        max_deviation = max_deviation.max(d);
    }
    let avg_deviation = total_deviation / (points.len() - 2) as f64;

    let mut confidence =
        (1.0 - avg_deviation / (config.line_deviation_fraction * length)).clamp(0.0, 1.0);
    if max_deviation > config.line_max_deviation_fraction * length {
        confidence *= 0.5;
    }
    if length > config.line_length_bonus_px {
        confidence = (confidence * 1.1).min(1.0);
    }
    confidence
}

/// Arrow: the leading portion of the stroke must look like a line (the
/// shaft) and the trailing portion must turn sharply at least twice (the
/// head).
pub fn score_arrow(points: &[Point], config: &ClassifierConfig) -> f64 {
    if points.len() < 4 {
        return 0.0;
    }
    let shaft_end = ((points.len() as f64 * config.arrow_shaft_fraction) as usize)
        .clamp(2, points.len() - 2);
    let shaft = &points[..shaft_end];

    let shaft_confidence = (score_line(shaft, config) * 1.1).min(1.0);
    if shaft_confidence < config.arrow_shaft_floor {
        return 0.0;
    }

    let head_len = ((points.len() as f64 * config.arrow_head_fraction) as usize).max(3);
    let head = &points[points.len().saturating_sub(head_len)..];
    let turns = count_sharp_turns(head, config.arrow_head_cos_threshold);
    if turns < 2 {
        return 0.0;
    }
    let head_score = (turns as f64 / 3.0).min(1.0);

    let shaft_length = shaft[0].distance_to(shaft[shaft.len() - 1]);
    let length_score = (shaft_length / 100.0).min(1.0);

    (0.5 * shaft_confidence + 0.3 * head_score + 0.2 * length_score).clamp(0.0, 1.0)
}

/// Star: many evenly alternating corners. Best between 5 and 12 corners,
/// with a bonus for closure.
pub fn score_star(metrics: &StrokeMetrics, _config: &ClassifierConfig) -> f64 {
    let corners = metrics.corner_count;
    if corners < 4 {
        return 0.0;
    }
    let corner_score = if (5..=12).contains(&corners) {
        1.0
    } else if corners == 4 {
        0.6
    } else {
        (1.0 - (corners as f64 - 12.0) * 0.05).max(0.3)
    };
    let closure_bonus = if metrics.closed { 0.25 } else { 0.0 };
    (0.7 * corner_score + closure_bonus).clamp(0.0, 1.0)
}

/// Count direction changes where the cosine between successive direction
/// vectors drops below the threshold (a turn sharper than ~45 degrees)
fn count_sharp_turns(points: &[Point], cos_threshold: f64) -> usize {
    let mut turns = 0;
    let mut prev_dir: Option<(f64, f64)> = None;
    for w in points.windows(2) {
        let dx = w[1].x - w[0].x;
        let dy = w[1].y - w[0].y;
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1e-9 {
            continue;
        }
        let dir = (dx / len, dy / len);
        if let Some((px, py)) = prev_dir {
            let cos = px * dir.0 + py * dir.1;
            if cos < cos_threshold {
                turns += 1;
            }
        }
        prev_dir = Some(dir);
    }
    turns
}
