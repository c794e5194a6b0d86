use fusion::normalize::RawDetections;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sketch_kit_common::{CanvasSize, Stroke};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SketchCliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// On-disk scene description: the ink strokes plus whatever external
/// detection results the caller already has. The canvas raster travels
/// separately as an image file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SceneFile {
    pub canvas: Option<CanvasSize>,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    #[serde(default)]
    pub detections: RawDetections,
}

impl SceneFile {
    /// Load a scene from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, SketchCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a scene from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, SketchCliError> {
        let scene: SceneFile = toml::from_str(content)?;
        Ok(scene)
    }

    /// Load a scene from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SketchCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a scene from a JSON string
    pub fn from_json(content: &str) -> Result<Self, SketchCliError> {
        let scene: SceneFile = serde_json::from_str(content)?;
        Ok(scene)
    }

    /// Auto-detect file format and load the scene
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SketchCliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(SketchCliError::UnsupportedFileFormat),
        }
    }

    /// Save the scene to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SketchCliError> {
        let content = self.to_json()?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Convert the scene to a JSON string
    pub fn to_json(&self) -> Result<String, SketchCliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Convert the scene to a TOML string
    pub fn to_toml(&self) -> Result<String, SketchCliError> {
        let toml = toml::to_string_pretty(&self)?;
        Ok(toml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_kit_common::Point;

    #[test]
    fn test_json_round_trip() {
        let scene = SceneFile {
            canvas: Some(CanvasSize::new(800.0, 600.0).unwrap()),
            strokes: vec![Stroke::new(
                "s1",
                vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            )],
            detections: RawDetections::default(),
        };
        let text = scene.to_json().unwrap();
        let parsed = SceneFile::from_json(&text).unwrap();
        assert_eq!(parsed, scene);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let scene = SceneFile::from_json(r#"{"canvas": null}"#).unwrap();
        assert!(scene.strokes.is_empty());
        assert!(scene.detections.is_empty());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = SceneFile::from_file("scene.yaml").unwrap_err();
        assert!(matches!(err, SketchCliError::UnsupportedFileFormat));
    }
}
