//! Installation configuration
//!
//! One JSON file describes a deployment: the axis domain, the source
//! catalog, sequencer behaviour and the input device. Everything that
//! changed between installation iterations (axis values, ad tiers, banner
//! presence, device variant) lives here.

use crate::{AxisDomain, Position, Result, SequencerConfig, SourceCatalog};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which device endpoint drives the installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceVariant {
    /// Analog sliders, `GET /sliders`
    Sliders,
    /// Digital switches, `GET /switches`
    Switches,
}

/// Input device settings
///
/// Plain data here; the device crate turns these into poller configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Device IP or hostname
    pub host: String,
    /// HTTP port, 8080 on the stock firmware
    pub port: u16,
    pub variant: DeviceVariant,
    /// Poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Minimum percentage delta before a slider change is reported
    pub threshold: f64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            host: "192.168.0.60".into(),
            port: 8080,
            variant: DeviceVariant::Sliders,
            poll_interval_ms: 150,
            threshold: 2.0,
        }
    }
}

/// Full installation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallationConfig {
    pub axes: AxisDomain,
    pub catalog: SourceCatalog,
    pub sequencer: SequencerConfig,
    pub device: DeviceSettings,
    /// Position shown at startup
    pub initial_position: Position,
}

impl Default for InstallationConfig {
    fn default() -> Self {
        Self {
            axes: AxisDomain::default(),
            catalog: SourceCatalog::default(),
            sequencer: SequencerConfig::default(),
            device: DeviceSettings::default(),
            initial_position: Position::new("collective", "progressive"),
        }
    }
}

impl InstallationConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.axes.validate_domain()?;
        self.axes.validate(&self.initial_position)?;
        if self.sequencer.ad_tiers > 2 {
            return Err(crate::Error::InvalidConfig(format!(
                "ad_tiers must be 0..=2, got {}",
                self.sequencer.ad_tiers
            )));
        }
        Ok(())
    }
}
