//! Editor configuration.

use crate::elements::{ImageDefaults, TextDefaults};
use crate::gesture::GestureConfig;
use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Canvas size must be positive, got {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },
    #[error("Movement threshold must not be negative, got {0}")]
    NegativeThreshold(f64),
    #[error("Minimum panel size must not be negative, got {0}")]
    NegativePanelSize(f64),
}

/// Settings for one editing session. Every field has a default, so a
/// partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Initial canvas size in pixels.
    pub canvas: Size,
    pub gesture: GestureConfig,
    pub text_defaults: TextDefaults,
    pub image_defaults: ImageDefaults,
    /// Offset applied to duplicated elements (both axes).
    pub duplicate_offset: f64,
    /// Smallest width/height the property panel accepts.
    pub min_panel_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: Size::new(1000.0, 700.0),
            gesture: GestureConfig::default(),
            text_defaults: TextDefaults::default(),
            image_defaults: ImageDefaults::default(),
            duplicate_offset: 30.0,
            min_panel_size: 30.0,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if let Err(err) = config.validate() {
            log::warn!("Rejecting configuration: {}", err);
            return Err(err);
        }
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the editor cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.canvas.width > 0.0 && self.canvas.height > 0.0) {
            return Err(ConfigError::InvalidCanvas {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }
        if !(self.gesture.movement_threshold >= 0.0) {
            return Err(ConfigError::NegativeThreshold(self.gesture.movement_threshold));
        }
        if !(self.min_panel_size >= 0.0) {
            return Err(ConfigError::NegativePanelSize(self.min_panel_size));
        }
        Ok(())
    }

    pub fn duplicate_offset(&self) -> Vec2 {
        Vec2::new(self.duplicate_offset, self.duplicate_offset)
    }
}
