use crate::brush::{MIN_BRUSH_WIDTH, Palette};
use crate::error::ConfigError;
use egui::Color32;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an optional JSON config file
pub const CONFIG_ENV_VAR: &str = "DRAWING_BOARD_CONFIG";

/// Startup configuration. Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields take their default values
pub struct BoardConfig {
    /// Swatch colors as `[r, g, b]`
    pub palette: Vec<[u8; 3]>,
    pub initial_brush_width: f32,
    /// Upper end of the brush size slider
    pub max_brush_width: f32,
    /// Where exports go; the user's picture directory when unset
    pub export_directory: Option<PathBuf>,
    pub file_prefix: String,
    pub window_size: [f32; 2],
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default()
                .colors()
                .iter()
                .map(|c| [c.r(), c.g(), c.b()])
                .collect(),
            initial_brush_width: 5.0,
            max_brush_width: 50.0,
            export_directory: None,
            file_prefix: "DrawingApp".to_owned(),
            window_size: [1024.0, 768.0],
        }
    }
}

impl BoardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from [`CONFIG_ENV_VAR`], falling back to defaults on any problem
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Self::default();
        };

        let path = PathBuf::from(path);
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("Ignoring config: {}", err);
                Self::default()
            }
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::new(
            self.palette
                .iter()
                .map(|[r, g, b]| Color32::from_rgb(*r, *g, *b))
                .collect(),
        )
    }

    pub fn max_brush_width(&self) -> f32 {
        self.max_brush_width.max(MIN_BRUSH_WIDTH)
    }

    /// Resolved export directory
    pub fn export_directory(&self) -> PathBuf {
        self.export_directory.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("DrawingApp")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = BoardConfig::from_json(r#"{ "max_brush_width": 30.0 }"#).unwrap();
        assert_eq!(config.max_brush_width, 30.0);
        assert_eq!(config.file_prefix, "DrawingApp");
        assert_eq!(config.palette, BoardConfig::default().palette);
    }

    #[test]
    fn test_palette_from_config() {
        let json = r#"{ "palette": [[255, 0, 0], [0, 0, 255]] }"#;
        let config = BoardConfig::from_json(json).unwrap();
        let palette = config.palette();
        assert_eq!(palette.colors(), &[Color32::RED, Color32::BLUE]);
    }

    #[test]
    fn test_malformed_config() {
        let err = BoardConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = BoardConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_explicit_export_directory() {
        let config = BoardConfig {
            export_directory: Some(PathBuf::from("/tmp/exports")),
            ..BoardConfig::default()
        };
        assert_eq!(config.export_directory(), PathBuf::from("/tmp/exports"));
        assert!(BoardConfig::default().export_directory().ends_with("DrawingApp"));
    }
}
