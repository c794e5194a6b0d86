use crate::{
    classify::GeometricShapeClassifier,
    config::{ClassifierConfig, ContourConfig, FusionConfig},
    contour::{DouglasPeuckerSimplifier, NeighborScanBoundary, SobelEdgeDetector},
    fuse::FusionEngine,
    hierarchy::HierarchyBuilder,
    normalize::DetectionNormalizer,
    pipeline::Pipeline,
    traits::{BoundaryExtractor, ContourSimplifier, RasterPreprocessor},
};

/// Fluent builder for [`Pipeline`].
///
/// Every stage has a default; callers only override what they need:
///
/// ```
/// use fusion::pipeline::Pipeline;
/// use fusion::config::FusionConfig;
///
/// let pipeline = Pipeline::builder()
///     .fusion_config(FusionConfig {
///         stroke_search_radius: 0.2,
///         ..Default::default()
///     })
///     .build();
/// # let _ = pipeline;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    classifier_config: ClassifierConfig,
    fusion_config: FusionConfig,
    contour_config: ContourConfig,
    hierarchy: HierarchyBuilder,
    preprocessor: Option<Box<dyn RasterPreprocessor>>,
    boundary: Option<Box<dyn BoundaryExtractor>>,
    simplifier: Option<Box<dyn ContourSimplifier>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classifier_config(mut self, config: ClassifierConfig) -> Self {
        self.classifier_config = config;
        self
    }

    pub fn fusion_config(mut self, config: FusionConfig) -> Self {
        self.fusion_config = config;
        self
    }

    pub fn contour_config(mut self, config: ContourConfig) -> Self {
        self.contour_config = config;
        self
    }

    pub fn max_child_area_ratio(mut self, ratio: f64) -> Self {
        self.hierarchy.max_child_area_ratio = ratio;
        self
    }

    pub fn preprocessor<P: RasterPreprocessor + 'static>(mut self, preprocessor: P) -> Self {
        self.preprocessor = Some(Box::new(preprocessor));
        self
    }

    pub fn boundary_extractor<B: BoundaryExtractor + 'static>(mut self, boundary: B) -> Self {
        self.boundary = Some(Box::new(boundary));
        self
    }

    pub fn simplifier<S: ContourSimplifier + 'static>(mut self, simplifier: S) -> Self {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    pub fn build(self) -> Pipeline {
        let edge_threshold = self.contour_config.edge_threshold;
        Pipeline::new(
            DetectionNormalizer,
            GeometricShapeClassifier::new(self.classifier_config),
            FusionEngine::new(self.fusion_config),
            self.hierarchy,
            self.preprocessor
                .unwrap_or_else(|| {
                    Box::new(SobelEdgeDetector {
                        threshold: edge_threshold,
                    })
                }),
            self.boundary
                .unwrap_or_else(|| Box::new(NeighborScanBoundary)),
            self.simplifier
                .unwrap_or_else(|| Box::new(DouglasPeuckerSimplifier)),
            self.contour_config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let pipeline = PipelineBuilder::new().build();
        assert_eq!(pipeline.contour_config.edge_threshold, 50.0);
    }

    #[test]
    fn test_builder_overrides_stick() {
        let pipeline = PipelineBuilder::new()
            .contour_config(ContourConfig {
                edge_threshold: 80.0,
                ..Default::default()
            })
            .max_child_area_ratio(0.75)
            .build();
        assert_eq!(pipeline.contour_config.edge_threshold, 80.0);
        assert_eq!(pipeline.hierarchy.max_child_area_ratio, 0.75);
    }
}
