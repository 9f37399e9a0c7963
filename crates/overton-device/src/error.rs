//! Error types for the device client
//!
//! These never escape the pollers: every poll failure is absorbed into the
//! connection statistics and surfaced only as the connected flag and the
//! strength score.

use thiserror::Error;

/// Result type alias for device operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Device client error types
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Device returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed device response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Device request timed out")]
    Timeout,

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),
}
