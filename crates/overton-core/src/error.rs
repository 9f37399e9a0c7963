//! Error types for Overton Core

use thiserror::Error;

/// Result type alias for installation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Installation error types
///
/// Almost everything at runtime degrades instead of erroring (missing
/// catalog entries fall back, sequencer misuse is a no-op), so the variants
/// here are confined to configuration loading.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown {axis} axis value: {value}")]
    UnknownAxisValue { axis: String, value: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
