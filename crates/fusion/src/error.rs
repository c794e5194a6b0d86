use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Raster decode error: {0}")]
    RasterDecode(#[from] image::ImageError),

    #[error("Raster buffer size mismatch: expected {expected} bytes, got {actual}")]
    RasterSizeMismatch { expected: usize, actual: usize },

    #[error("Geometric computation error: {0}")]
    GeometricComputation(String),

    #[error("Common type error: {0}")]
    Common(#[from] sketch_kit_common::SketchKitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, FusionError>;
