pub mod builder;

use tracing::debug;

use sketch_kit_common::{CanvasSize, Stroke};

use crate::{
    classify::GeometricShapeClassifier,
    config::ContourConfig,
    contour::{extract_region_contour, CanvasRaster},
    error::Result,
    fuse::FusionEngine,
    hierarchy::HierarchyBuilder,
    normalize::{DetectionCandidate, DetectionNormalizer, RawDetections},
    traits::{BoundaryExtractor, ContourSimplifier, RasterPreprocessor},
    types::{AnalyzedScene, DetectionSource},
};

/// Everything one analysis request operates on: an immutable snapshot of
/// the ink plus the already-resolved external detection lists and an
/// optional canvas raster for contour extraction.
#[derive(Debug, Default)]
pub struct SceneInput {
    pub strokes: Vec<Stroke>,
    pub detections: RawDetections,
    pub raster: Option<CanvasRaster>,
    pub canvas: Option<CanvasSize>,
}

impl SceneInput {
    fn canvas(&self) -> CanvasSize {
        self.canvas.unwrap_or(CanvasSize {
            width: 1000.0,
            height: 1000.0,
        })
    }
}

/// The full fusion pipeline: normalize external detections, classify ink
/// strokes, fuse everything into one element set, attach contours, and
/// derive the containment hierarchy.
///
/// Stateless and reentrant: each call operates on the caller's snapshot
/// and shares no mutable state, so one pipeline can serve concurrent
/// requests.
pub struct Pipeline {
    normalizer: DetectionNormalizer,
    classifier: GeometricShapeClassifier,
    engine: FusionEngine,
    hierarchy: HierarchyBuilder,
    preprocessor: Box<dyn RasterPreprocessor>,
    boundary: Box<dyn BoundaryExtractor>,
    simplifier: Box<dyn ContourSimplifier>,
    contour_config: ContourConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        normalizer: DetectionNormalizer,
        classifier: GeometricShapeClassifier,
        engine: FusionEngine,
        hierarchy: HierarchyBuilder,
        preprocessor: Box<dyn RasterPreprocessor>,
        boundary: Box<dyn BoundaryExtractor>,
        simplifier: Box<dyn ContourSimplifier>,
        contour_config: ContourConfig,
    ) -> Self {
        Self {
            normalizer,
            classifier,
            engine,
            hierarchy,
            preprocessor,
            boundary,
            simplifier,
            contour_config,
        }
    }

    /// Run one analysis request end to end
    pub fn process(&self, input: &SceneInput) -> Result<AnalyzedScene> {
        let canvas = input.canvas();

        // Step 1: ink strokes become stroke-geometry candidates
        let mut candidates = self.stroke_candidates(&input.strokes, canvas);

        // Step 2: external detections are canonicalized
        candidates.extend(self.normalizer.normalize_all(&input.detections, canvas));
        debug!(candidates = candidates.len(), "collected detection candidates");

        // Step 3: dedup/merge across sources, recovering missing geometry
        let mut elements = self.engine.fuse(candidates, &input.strokes, canvas);

        // Step 4: best-effort contours from the raster, if one was given
        if let Some(raster) = &input.raster {
            for element in &mut elements {
                let region_px = element.bounding_box.denormalize(canvas);
                match extract_region_contour(
                    self.preprocessor.as_ref(),
                    self.boundary.as_ref(),
                    self.simplifier.as_ref(),
                    &self.contour_config,
                    raster,
                    &region_px,
                    canvas,
                ) {
                    Ok(contour) => element.contour = contour,
                    Err(error) => {
                        // A bad region never aborts the whole analysis
                        debug!(id = %element.id, %error, "contour extraction skipped");
                    }
                }
            }
        }

        // Step 5: containment hierarchy over the final set
        self.hierarchy.build(&mut elements);

        debug!(elements = elements.len(), "analysis complete");
        Ok(AnalyzedScene { elements, canvas })
    }

    /// Classify the ink and wrap each stroke group as a candidate with
    /// normalized geometry
    fn stroke_candidates(
        &self,
        strokes: &[Stroke],
        canvas: CanvasSize,
    ) -> Vec<DetectionCandidate> {
        self.classifier
            .classify_scene(strokes)
            .into_iter()
            .enumerate()
            .filter_map(|(i, group)| {
                let bbox = group.bounding_box?;
                if group.score.confidence <= 0.0 {
                    return None;
                }
                Some(DetectionCandidate {
                    id: format!("stroke-{i}"),
                    name: group.score.kind.to_string(),
                    confidence: group.score.confidence,
                    bounding_box: Some(bbox.normalize(canvas)),
                    position: None,
                    source: DetectionSource::StrokeGeometry,
                    stroke_ids: group.stroke_ids,
                })
            })
            .collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}
