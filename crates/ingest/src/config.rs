//! Configuration for the decode pipeline.
//!
//! [`DecodeConfig`] is small, cheap to clone and deserializable from any serde
//! format, so it can be embedded directly in a service configuration file.
//!
//! # Quick Start
//!
//! ```rust
//! use ingest::DecodeConfig;
//!
//! let config = DecodeConfig::default();
//! config.validate().expect("defaults are valid");
//! assert_eq!(config.max_decompressed_bytes, Some(64 * 1024 * 1024));
//! assert!(config.transport_fallback);
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only `content-encoding` token that enables compression handling.
pub const COMPRESSION_TOKEN: &str = "zstd";

/// Default ceiling on decompressed output (64 MiB).
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 64 * 1024 * 1024;

/// Runtime configuration for the decode chain.
///
/// # Serialization
///
/// ```json
/// {
///   "max_decompressed_bytes": 67108864,
///   "transport_fallback": true
/// }
/// ```
///
/// Both fields are optional when deserializing; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Maximum number of bytes a single frame may decompress to.
    ///
    /// Frames that would exceed the ceiling are abandoned as if they were
    /// corrupt, so the delivery falls through to the next strategy and
    /// ultimately to the raw body. `None` disables the ceiling.
    ///
    /// Default: `Some(64 MiB)`
    pub max_decompressed_bytes: Option<usize>,

    /// Whether to try base64-unwrap-then-decompress when direct decompression
    /// of the body fails.
    ///
    /// Default: `true`
    pub transport_fallback: bool,
}

/// Errors reported by [`DecodeConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A zero ceiling would reject every compressed delivery.
    #[error("max_decompressed_bytes must be greater than zero")]
    ZeroDecompressionLimit,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_decompressed_bytes: Some(DEFAULT_MAX_DECOMPRESSED_BYTES),
            transport_fallback: true,
        }
    }
}

impl DecodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_decompressed_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_decompressed_bytes = limit;
        self
    }

    pub fn with_transport_fallback(mut self, enabled: bool) -> Self {
        self.transport_fallback = enabled;
        self
    }

    /// Checks the configuration for values that can never work.
    ///
    /// ```rust
    /// use ingest::{ConfigError, DecodeConfig};
    ///
    /// let cfg = DecodeConfig::new().with_max_decompressed_bytes(Some(0));
    /// assert_eq!(cfg.validate(), Err(ConfigError::ZeroDecompressionLimit));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_decompressed_bytes == Some(0) {
            return Err(ConfigError::ZeroDecompressionLimit);
        }
        Ok(())
    }
}
