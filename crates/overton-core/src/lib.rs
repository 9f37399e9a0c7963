//! Overton Core - playback sequencing for the installation
//!
//! This crate provides the decision-making half of the installation:
//! - The two-axis position model with configurable axis domains
//! - The position-to-source catalog with per-kind fallbacks
//! - The playback sequencer (news / ad / banner transition protocol)
//! - Playback event emission
//! - Installation configuration loading
//!
//! # Architecture
//!
//! ```text
//! device events ──▶ Sequencer ──▶ PlayDirective ──▶ video surface
//!                      ▲                                  │
//!                      └────── progress / finished ◀──────┘
//! ```
//!
//! The sequencer is a synchronous state machine driven from a single event
//! loop; all I/O lives in the device crate and the kiosk binary.

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod position;
pub mod sequencer;

pub use catalog::{ContentKind, SourceCatalog, SourceTier};
pub use config::{DeviceSettings, DeviceVariant, InstallationConfig};
pub use error::{Error, Result};
pub use events::{EventEmitter, EventRecord, PlaybackEvent, SessionId};
pub use position::{AxisDomain, Position};
pub use sequencer::{PlayDirective, Sequencer, SequencerConfig, Transition};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
