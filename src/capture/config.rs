//! Capture and process configuration.
//!
//! `CaptureConfig` carries the per-initialization parameters (device index
//! and requested resolution); `FileConfig` is the optional TOML process
//! configuration loaded at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default frame width when the caller does not request one.
pub const DEFAULT_WIDTH: u32 = 1280;
/// Default frame height when the caller does not request one.
pub const DEFAULT_HEIGHT: u32 = 720;

/// Configuration for opening a camera device.
///
/// The requested resolution is a hint: the driver negotiates and may grant
/// a different one, which the handle reports after opening. The device
/// index is not part of this type; it is fixed when the handle is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Requested frame width in pixels.
    pub width: u32,
    /// Requested frame height in pixels.
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl CaptureConfig {
    /// Creates a configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid jpeg quality (must be 1-100)")]
    InvalidQuality,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub server: ListenConfig,
    #[serde(default)]
    pub encode: EncodeConfig,
}

/// Camera device selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeviceConfig {
    /// Camera device index, usually 0.
    #[serde(default)]
    pub index: u32,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to.
    pub address: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_owned(),
            port: 8080,
        }
    }
}

/// JPEG encoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeConfig {
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the file-level settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encode.jpeg_quality == 0 || self.encode.jpeg_quality > 100 {
            return Err(ConfigError::InvalidQuality);
        }
        Ok(())
    }
}
