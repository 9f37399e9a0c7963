//! Overton Device - polling client for the installation's input hardware
//!
//! The physical input is a WiFi microcontroller exposing slider and switch
//! state over plain HTTP JSON. This crate provides:
//! - The wire model for the `/sliders`, `/switches` and `/status` endpoints
//! - A transport seam ([`DeviceTransport`]) with a reqwest implementation
//! - The analog poller (fixed interval, cancel-superseded-request
//!   discipline, per-channel change thresholds)
//! - The digital poller (adaptive backoff, detached reconnect probe)
//! - Connection statistics and the advisory 0-5 strength score
//!
//! Poll failures never surface as errors: consumers see change events, a
//! connected flag and the strength score, nothing else.

pub mod delta;
pub mod error;
pub mod sliders;
pub mod stats;
pub mod switches;
pub mod transport;
pub mod wire;

pub use delta::DeltaTracker;
pub use error::{DeviceError, Result};
pub use sliders::{SliderEvent, SliderHandle, SliderPollerConfig};
pub use stats::{ConnectionHealth, ConnectionStats};
pub use switches::{SwitchEvent, SwitchHandle, SwitchId, SwitchPollerConfig};
pub use transport::{DeviceTransport, HttpTransport};
pub use wire::{ChannelReading, SliderChannel, SliderFrame, SliderPair, StatusFrame, SwitchFrame};

/// Runtime instructions accepted by a running poller
#[derive(Debug, Clone)]
pub enum PollerCommand {
    /// Point at a different device; resets statistics and last-reported
    /// values
    SetAddress(String),
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
