//! Desktop runtime configuration loaded from TOML.
//!
//! Every field has a default, so an empty document yields [`DesktopConfig::default`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::DesktopBounds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse desktop config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid desktop config: {0}")]
    Invalid(String),
}

/// Default placement and size limits for new windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowPlacementConfig {
    pub default_width: i32,
    pub default_height: i32,
    /// Space kept free around a default-sized window on small desktops.
    pub margin: i32,
    pub cascade_step: i32,
    /// Number of cascade offsets before placement wraps back to the center.
    pub cascade_slots: usize,
    pub min_width: i32,
    pub min_height: i32,
}

impl Default for WindowPlacementConfig {
    fn default() -> Self {
        Self {
            default_width: 800,
            default_height: 600,
            margin: 100,
            cascade_step: 20,
            cascade_slots: 10,
            min_width: 300,
            min_height: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconGridConfig {
    pub grid_size: i32,
}

impl Default for IconGridConfig {
    fn default() -> Self {
        Self { grid_size: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub desktop: DesktopBounds,
    pub window: WindowPlacementConfig,
    pub icons: IconGridConfig,
}

impl DesktopConfig {
    /// Parses and validates a TOML config document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.desktop.width <= 0 || self.desktop.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "desktop size must be positive, got {}x{}",
                self.desktop.width, self.desktop.height
            )));
        }
        let window = &self.window;
        if window.min_width <= 0 || window.min_height <= 0 {
            return Err(ConfigError::Invalid(
                "minimum window size must be positive".to_string(),
            ));
        }
        if window.default_width < window.min_width || window.default_height < window.min_height {
            return Err(ConfigError::Invalid(
                "default window size is below the minimum".to_string(),
            ));
        }
        if window.cascade_slots == 0 {
            return Err(ConfigError::Invalid(
                "cascade_slots must be at least 1".to_string(),
            ));
        }
        if self.icons.grid_size <= 0 {
            return Err(ConfigError::Invalid(
                "icon grid size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
