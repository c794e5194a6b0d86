//! Tuned thresholds for classification, contour extraction, and fusion.
//!
//! The numbers here are empirically tuned for the sketch-recognition
//! domain. They are deliberately exposed as plain overridable fields
//! rather than inlined literals; whether they generalize to other domains
//! is unverified.

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Thresholds for single-stroke and stroke-group shape classification
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClassifierConfig {
    /// Closure test: first/last distance below `max(closure_base_px,
    /// closure_mean_segment_factor * mean segment length)` closes a stroke
    pub closure_base_px: f64,
    pub closure_mean_segment_factor: f64,
    /// Corner sampling step is `max(1, n / corner_sample_divisor)`
    pub corner_sample_divisor: usize,
    /// Turning angle must deviate from pi by more than this (radians)
    pub corner_angle_threshold: f64,
    /// Accepted corners must be at least this many sample steps apart
    pub corner_min_gap_steps: usize,
    /// Best single-shape score below this falls back to polygon/freeform
    pub shape_confidence_floor: f64,
    /// Line confidence is `1 - avg deviation / (fraction * length)`
    pub line_deviation_fraction: f64,
    /// Penalize lines whose max deviation exceeds this fraction of length
    pub line_max_deviation_fraction: f64,
    /// Lines longer than this (pixels) earn a small bonus
    pub line_length_bonus_px: f64,
    /// Leading fraction of an arrow stroke treated as the shaft
    pub arrow_shaft_fraction: f64,
    /// Trailing fraction of an arrow stroke searched for the head
    pub arrow_head_fraction: f64,
    /// Scaled shaft confidence below this rejects the arrow outright
    pub arrow_shaft_floor: f64,
    /// Direction-change cosine below this counts as an arrowhead turn
    pub arrow_head_cos_threshold: f64,
    /// Rectangle fill ratio above this earns the fill boost
    pub rect_fill_boost_threshold: f64,
    pub rect_fill_boost: f64,
    /// Strokes with bounding-box centers within this many pixels cluster
    /// into one multi-stroke group
    pub group_center_dist_px: f64,
    /// Fixed confidence reported for multi-stroke groups
    pub group_confidence: f64,
    /// Confidence reported for open, unrecognized strokes
    pub freeform_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            closure_base_px: 20.0,
            closure_mean_segment_factor: 2.0,
            corner_sample_divisor: 50,
            corner_angle_threshold: 0.5,
            corner_min_gap_steps: 2,
            shape_confidence_floor: 0.6,
            line_deviation_fraction: 0.1,
            line_max_deviation_fraction: 0.3,
            line_length_bonus_px: 50.0,
            arrow_shaft_fraction: 0.75,
            arrow_head_fraction: 0.3,
            arrow_shaft_floor: 0.6,
            arrow_head_cos_threshold: 0.7,
            rect_fill_boost_threshold: 0.85,
            rect_fill_boost: 1.1,
            group_center_dist_px: 100.0,
            group_confidence: 0.6,
            freeform_confidence: 0.5,
        }
    }
}

/// Thresholds for raster contour extraction
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContourConfig {
    /// Sobel gradient magnitude at or above this is an edge pixel
    pub edge_threshold: f64,
    /// Douglas-Peucker epsilon in normalized canvas units
    pub rdp_epsilon: f64,
    /// Regions smaller than this (pixels, either dimension) are skipped
    pub min_region_px: u32,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 50.0,
            rdp_epsilon: 0.005,
            min_region_px: 5,
        }
    }
}

/// Thresholds for cross-source deduplication and geometry recovery
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FusionConfig {
    /// Name similarity at or above this counts as a name match
    pub name_match_floor: f64,
    /// IoU above this (with a name match) marks the same object
    pub iou_same_object: f64,
    /// Center distance below this (with a name match) marks the same
    /// object, in normalized units
    pub center_dist_same_object: f64,
    /// IoU above this marks the same object regardless of names
    pub iou_strong_overlap: f64,
    /// Search radius for recovering ink geometry, in normalized units
    pub stroke_search_radius: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            name_match_floor: 0.5,
            iou_same_object: 0.2,
            center_dist_same_object: 0.15,
            iou_strong_overlap: 0.5,
            stroke_search_radius: 0.15,
        }
    }
}
