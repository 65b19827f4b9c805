//! Error types for the gridtown core.

use thiserror::Error;

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration file failed to parse.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    ConfigInvalid {
        /// What is wrong with it.
        reason: String,
    },
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CoreError>;
