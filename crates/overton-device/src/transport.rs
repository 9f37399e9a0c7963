//! Transport seam between the pollers and the device
//!
//! The pollers are generic over [`DeviceTransport`] so their scheduling,
//! threshold and connection-health behaviour can be exercised against a
//! scripted fake; [`HttpTransport`] is the production implementation.

use crate::error::{DeviceError, Result};
use crate::wire::{SliderFrame, StatusFrame, SwitchFrame};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

/// Request timeout for the analog endpoint
pub const SLIDERS_TIMEOUT: Duration = Duration::from_secs(3);
/// Request timeout for the digital endpoint and the status probe
pub const SWITCHES_TIMEOUT: Duration = Duration::from_secs(2);

/// Fetches device state over some medium
#[async_trait]
pub trait DeviceTransport: Send + Sync + 'static {
    async fn fetch_sliders(&self) -> Result<SliderFrame>;

    async fn fetch_switches(&self) -> Result<SwitchFrame>;

    /// Cheap liveness probe, used by the reconnect path
    async fn probe_status(&self) -> Result<StatusFrame>;

    /// Point the transport at a different device
    fn set_host(&self, host: &str);
}

/// HTTP transport against the device firmware
pub struct HttpTransport {
    client: reqwest::Client,
    base: RwLock<Url>,
    port: u16,
}

impl HttpTransport {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            base: RwLock::new(Self::base_url(host, port)?),
            port,
        })
    }

    fn base_url(host: &str, port: u16) -> Result<Url> {
        Url::parse(&format!("http://{host}:{port}/"))
            .map_err(|e| DeviceError::InvalidAddress(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, timeout: Duration) -> Result<T> {
        let url = {
            let base = self.base.read().expect("base url lock poisoned");
            base.join(path)
                .map_err(|e| DeviceError::InvalidAddress(e.to_string()))?
        };

        let response = self.client.get(url).timeout(timeout).send().await?;

        if !response.status().is_success() {
            return Err(DeviceError::Status {
                status: response.status().as_u16(),
            });
        }

        // Decode by hand so a malformed body is distinguishable from a
        // transport error in the logs. Both count as a failed poll.
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl DeviceTransport for HttpTransport {
    async fn fetch_sliders(&self) -> Result<SliderFrame> {
        self.get_json("sliders", SLIDERS_TIMEOUT).await
    }

    async fn fetch_switches(&self) -> Result<SwitchFrame> {
        self.get_json("switches", SWITCHES_TIMEOUT).await
    }

    async fn probe_status(&self) -> Result<StatusFrame> {
        self.get_json("status", SWITCHES_TIMEOUT).await
    }

    fn set_host(&self, host: &str) {
        if let Ok(url) = Self::base_url(host, self.port) {
            *self.base.write().expect("base url lock poisoned") = url;
        }
    }
}
