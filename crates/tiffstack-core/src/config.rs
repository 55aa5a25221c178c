use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::display::Normalization;
use crate::error::{Result, StackError};

/// Top-level viewer configuration, usually read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub viewer: ViewerOptions,
    #[serde(default)]
    pub limits: DecodeLimits,
}

impl ViewerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| StackError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded viewer config from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| StackError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let v = &self.viewer;
        if !(v.min_zoom > 0.0 && v.min_zoom <= v.max_zoom) {
            return Err(StackError::Config(format!(
                "zoom limits must satisfy 0 < min_zoom <= max_zoom (got {} and {})",
                v.min_zoom, v.max_zoom
            )));
        }
        if let Normalization::Fixed { low, high } = self.display.normalization {
            if low >= high {
                return Err(StackError::Config(format!(
                    "fixed normalization needs low < high (got {low} and {high})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub normalization: Normalization,
}

/// Interaction options for the image viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    pub can_zoom: bool,
    pub can_pan: bool,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Exponent applied per scroll point when zooming with the wheel.
    pub zoom_speed: f32,
    /// Fit the image to the view when a new stack is loaded.
    pub fit_on_load: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            can_zoom: true,
            can_pan: true,
            min_zoom: 0.1,
            max_zoom: 20.0,
            zoom_speed: 0.005,
            fit_on_load: true,
        }
    }
}

/// Buffer limits handed to the TIFF decoder, in megabytes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    pub decoding_buffer_mb: usize,
    pub intermediate_buffer_mb: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            decoding_buffer_mb: 1024,
            intermediate_buffer_mb: 1024,
        }
    }
}

impl DecodeLimits {
    pub fn to_tiff_limits(&self) -> tiff::decoder::Limits {
        let mut limits = tiff::decoder::Limits::default();
        limits.decoding_buffer_size = self.decoding_buffer_mb * 1024 * 1024;
        limits.intermediate_buffer_size = self.intermediate_buffer_mb * 1024 * 1024;
        limits.ifd_value_size = self.intermediate_buffer_mb * 1024 * 1024;
        limits
    }
}
