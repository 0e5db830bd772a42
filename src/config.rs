use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::Result;
use crate::orientation::OrientationThresholds;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub models: ModelConfig,
    pub thresholds: OrientationThresholds,
    pub drawing: DrawingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub face_mesh_path: String,
    pub face_detection_path: String,
    pub intra_threads: usize,
    /// Minimum detector score for a face box to be used as the mesh ROI.
    pub detection_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorStyle {
    pub color_hex: String,
    pub line_width: u32,
}

impl ConnectorStyle {
    pub fn new(color_hex: &str, line_width: u32) -> Self {
        Self {
            color_hex: color_hex.to_string(),
            line_width,
        }
    }
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self::new("#E0E0E0", 4)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    pub tessellation: ConnectorStyle,
    /// Radius of a dot drawn on every landmark; 0 disables the dots.
    pub landmark_radius: i32,
    pub right_eye: ConnectorStyle,
    pub right_eyebrow: ConnectorStyle,
    pub right_iris: ConnectorStyle,
    pub left_eye: ConnectorStyle,
    pub left_eyebrow: ConnectorStyle,
    pub left_iris: ConnectorStyle,
    pub face_oval: ConnectorStyle,
    pub lips: ConnectorStyle,
    /// Outline of the detector region, drawn only when set.
    pub face_box: Option<ConnectorStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_mesh_path: "models/face_mesh.onnx".to_string(),
            face_detection_path: "models/face_detection.onnx".to_string(),
            intra_threads: 4,
            detection_score: 0.7,
        }
    }
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            tessellation: ConnectorStyle::new("#C0C0C070", 1),
            landmark_radius: 0,
            right_eye: ConnectorStyle::new("#FF3030", 4),
            right_eyebrow: ConnectorStyle::new("#FF3030", 4),
            right_iris: ConnectorStyle::new("#FF3030", 4),
            left_eye: ConnectorStyle::new("#30FF30", 4),
            left_eyebrow: ConnectorStyle::new("#30FF30", 4),
            left_iris: ConnectorStyle::new("#30FF30", 4),
            face_oval: ConnectorStyle::new("#E0E0E0", 4),
            lips: ConnectorStyle::new("#E0E0E0", 4),
            face_box: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where a loaded [`AppConfig`] came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File,
    /// No file at the path.
    Defaults,
    /// The file exists but could not be parsed; holds the parse error.
    Fallback(String),
}

impl ConfigSource {
    /// User-facing message when the file on disk was ignored.
    pub fn fallback_warning(&self, path: &Path) -> Option<String> {
        match self {
            ConfigSource::Fallback(error) => Some(format!(
                "Error parsing config {}: {}. Loading defaults.",
                path.display(),
                error
            )),
            _ => None,
        }
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.json";

    /// Load from `path`. A missing file gives defaults; so does a file that
    /// fails to parse, after a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::load_with_source(path)?.0)
    }

    /// Like [`AppConfig::load`], also reporting whether the file was used.
    /// Callers that log before a subscriber exists should report
    /// [`ConfigSource::Fallback`] themselves.
    pub fn load_with_source(path: impl AsRef<Path>) -> Result<(Self, ConfigSource)> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "configuration file not found, using defaults");
            return Ok((Self::default(), ConfigSource::Defaults));
        }

        let content = fs::read_to_string(path)?;
        // Missing fields fall back through #[serde(default)].
        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!(path = %path.display(), "loaded configuration");
                Ok((config, ConfigSource::File))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "error parsing config, loading defaults");
                Ok((Self::default(), ConfigSource::Fallback(e.to_string())))
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"thresholds": {"yaw_deg": 25.0}, "models": {"intra_threads": 1}}"#)
            .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.thresholds.yaw_deg, 25.0);
        assert_eq!(config.thresholds.pitch_deg, 10.0);
        assert_eq!(config.models.intra_threads, 1);
        assert_eq!(config.models.face_mesh_path, "models/face_mesh.onnx");
        assert_eq!(config.drawing, DrawingConfig::default());
    }

    #[test]
    fn unparsable_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn fallback_is_reported_to_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let (config, source) = AppConfig::load_with_source(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(matches!(source, ConfigSource::Fallback(ref e) if !e.is_empty()));

        let warning = source.fallback_warning(&path).unwrap();
        assert!(warning.contains("config.json"), "{warning}");
        assert!(warning.contains("Loading defaults"), "{warning}");
    }

    #[test]
    fn readable_or_absent_files_are_not_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.json");
        let (_, source) = AppConfig::load_with_source(&absent).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert!(source.fallback_warning(&absent).is_none());

        let present = dir.path().join("config.json");
        AppConfig::default().save(&present).unwrap();
        let (_, source) = AppConfig::load_with_source(&present).unwrap();
        assert_eq!(source, ConfigSource::File);
        assert!(source.fallback_warning(&present).is_none());
    }

    #[test]
    fn save_then_load_preserves_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.drawing.lips = ConnectorStyle::new("#112233", 2);
        config.logging.level = "debug".to_string();
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped: AppConfig = serde_json::from_str(include_str!("../config.json")).unwrap();
        assert_eq!(shipped, AppConfig::default());
    }
}
