//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading or validating a [`ModelConfig`](super::ModelConfig).
///
/// Every variant is fatal: a configuration that fails validation is rejected
/// before any operator table is built or any step is taken.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A per-layer parameter array does not match the layer count.
    #[error("Shape mismatch for `{field}`: expected {expected} entries, got {actual}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Grid dimensions that cannot be padded by the 3/2 rule.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Time stepping parameters that leave nothing to integrate.
    #[error("Invalid time parameters: {0}")]
    InvalidTime(String),

    /// Layer/moisture arrangement outside the supported two-layer coupling.
    #[error("Unsupported layer configuration: {0}")]
    UnsupportedLayers(String),
}

impl ConfigError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            field,
            expected,
            actual,
        }
    }
}
