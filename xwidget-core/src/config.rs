//! Toolkit configuration
//!
//! Every field has a default that reproduces the stock four-button menu bar,
//! so a JSON file only needs the values it changes:
//!
//! ```json
//! { "window": { "title": "demo" }, "buttons": { "labels": ["Open", "Quit"] } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::component::HitRegion;
use crate::error::ConfigError;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    pub window: WindowConfig,
    pub buttons: ButtonBarConfig,
}

/// Window geometry and decoration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub border_width: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "xwidget".to_string(),
            width: 640,
            height: 480,
            border_width: 1,
        }
    }
}

/// A horizontal row of buttons
///
/// Button `i` is placed at `x = i * spacing`. `width` is the nominal
/// hit-test width; the painted width follows the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonBarConfig {
    pub labels: Vec<String>,
    pub spacing: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub vertical_margin: u32,
    pub font: String,
    pub hit_region: HitRegion,
}

impl Default for ButtonBarConfig {
    fn default() -> Self {
        Self {
            labels: ["File", "Edit", "Help", "About"]
                .into_iter()
                .map(String::from)
                .collect(),
            spacing: 37,
            y: 0,
            width: 0,
            height: 24,
            vertical_margin: 0,
            font: "fixed".to_string(),
            hit_region: HitRegion::Nominal,
        }
    }
}

impl ButtonBarConfig {
    /// `(label, x)` for every button, in order
    pub fn placements(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), (i as i32).saturating_mul(self.spacing)))
    }
}

impl ToolkitConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.window.width > u32::from(u16::MAX) || self.window.height > u32::from(u16::MAX) {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} exceeds {}",
                self.window.width,
                self.window.height,
                u16::MAX
            )));
        }
        if self.buttons.font.is_empty() {
            return Err(ConfigError::Invalid("font name is empty".to_string()));
        }
        Ok(())
    }
}
