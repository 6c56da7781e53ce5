//! Engine configuration.
//!
//! A [`Config`] bundles decode [`Limits`] and [`EncodeOptions`]. It can be
//! built in code or loaded from YAML:
//!
//! ```
//! use dynimg_core::Config;
//!
//! let config = Config::from_yaml_str("
//! limits:
//!   max_image_width: 8192
//! encode:
//!   jpeg_quality: 75
//! ").unwrap();
//! assert_eq!(config.limits.max_image_width, Some(8192));
//! assert_eq!(config.encode.jpeg_quality, 75);
//! ```
//!
//! Fields left out of the YAML keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::limits::Limits;

/// PNG deflate effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    /// Fastest, largest output.
    Fast,
    /// Balanced.
    #[default]
    Default,
    /// Slowest, smallest output.
    Best,
}

/// Encoder settings shared by all codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
    /// PNG compression level.
    pub png_compression: PngCompression,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            png_compression: PngCompression::Default,
        }
    }
}

impl EncodeOptions {
    /// Sets the JPEG quality, clamped to 1..=100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Sets the PNG compression level.
    pub fn with_png_compression(mut self, compression: PngCompression) -> Self {
        self.png_compression = compression;
        self
    }
}

/// Limits plus encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decode limits.
    pub limits: Limits,
    /// Encoder settings.
    pub encode: EncodeOptions,
}

impl Config {
    /// Parses a YAML document.
    ///
    /// Syntax or type errors are reported as `ParameterMalformed`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| Error::malformed(format!("invalid config: {e}")))?;
        config.encode.jpeg_quality = config.encode.jpeg_quality.clamp(1, 100);
        Ok(config)
    }

    /// Loads a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Unknown(e.to_string()))
    }
}
