//! Analog slider poller
//!
//! Samples `GET /sliders` on a fixed interval and turns raw readings into
//! thresholded change events. The polling discipline allows at most one
//! outstanding request: a tick that arrives while a request is still in
//! flight cancels it by dropping the future. A superseded request is not a
//! failure.
//!
//! Poll failures are absorbed into the connection statistics; the only
//! externally visible effects are the health snapshot on the watch channel
//! and the absence of events.

use crate::delta::DeltaTracker;
use crate::error::Result;
use crate::stats::{ConnectionHealth, ConnectionStats};
use crate::transport::DeviceTransport;
use crate::wire::{SliderChannel, SliderFrame};
use crate::PollerCommand;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Analog poller settings
#[derive(Debug, Clone)]
pub struct SliderPollerConfig {
    pub poll_interval: Duration,
    /// Minimum percentage delta before a channel change is reported
    pub threshold: f64,
    /// Failures in a row before the device counts as disconnected
    pub max_consecutive_failures: u32,
}

impl Default for SliderPollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(150),
            threshold: 2.0,
            max_consecutive_failures: 3,
        }
    }
}

/// A thresholded channel change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderEvent {
    pub channel: SliderChannel,
    pub percentage: f64,
}

/// Running poller plus its output channels
///
/// Dropping the handle aborts the poll task, which cancels any in-flight
/// request.
pub struct SliderHandle {
    pub events: mpsc::Receiver<SliderEvent>,
    pub health: watch::Receiver<ConnectionHealth>,
    commands: mpsc::Sender<PollerCommand>,
    task: JoinHandle<()>,
}

impl SliderHandle {
    /// Repoint the poller at a different device, resetting all statistics
    /// and last-reported values
    pub async fn set_address(&self, host: impl Into<String>) {
        let _ = self
            .commands
            .send(PollerCommand::SetAddress(host.into()))
            .await;
    }
}

impl Drop for SliderHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start polling; the poller issues its first request on the next tick
pub fn spawn<T: DeviceTransport>(transport: T, config: SliderPollerConfig) -> SliderHandle {
    let (event_tx, event_rx) = mpsc::channel(64);
    let (health_tx, health_rx) = watch::channel(ConnectionHealth::down());
    let (command_tx, command_rx) = mpsc::channel(8);

    let task = tokio::spawn(run(
        Arc::new(transport),
        config,
        event_tx,
        health_tx,
        command_rx,
    ));

    SliderHandle {
        events: event_rx,
        health: health_rx,
        commands: command_tx,
        task,
    }
}

type InFlight = Pin<Box<dyn Future<Output = Result<SliderFrame>> + Send>>;

async fn run<T: DeviceTransport>(
    transport: Arc<T>,
    config: SliderPollerConfig,
    events: mpsc::Sender<SliderEvent>,
    health: watch::Sender<ConnectionHealth>,
    mut commands: mpsc::Receiver<PollerCommand>,
) {
    let mut stats = ConnectionStats::new(Instant::now());
    let mut tracker = DeltaTracker::new(config.threshold);
    let mut connected = false;

    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut in_flight: Option<InFlight> = None;
    let mut started = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if in_flight.is_some() {
                    // Superseded, not failed
                    trace!("in-flight poll superseded by newer tick");
                }
                let t = Arc::clone(&transport);
                started = Instant::now();
                in_flight = Some(Box::pin(async move { t.fetch_sliders().await }));
            }

            result = async { in_flight.as_mut().expect("guarded by precondition").await },
                if in_flight.is_some() =>
            {
                in_flight = None;
                let now = Instant::now();

                match result {
                    Ok(frame) => {
                        stats.record_success(now - started, now);
                        connected = true;

                        for channel in SliderChannel::ALL {
                            let percentage = frame.percentage(channel);
                            if tracker.observe(channel, percentage) {
                                debug!(%channel, percentage, "slider change");
                                if events
                                    .send(SliderEvent { channel, percentage })
                                    .await
                                    .is_err()
                                {
                                    return;
                                }
                            }
                        }
                    }
                    Err(err) => {
                        stats.record_failure();
                        debug!(
                            error = %err,
                            consecutive = stats.consecutive_failures(),
                            "slider poll failed"
                        );
                        if connected
                            && stats.consecutive_failures() >= config.max_consecutive_failures
                        {
                            warn!(
                                failures = stats.consecutive_failures(),
                                "slider device disconnected"
                            );
                            connected = false;
                        }
                    }
                }

                ConnectionHealth { connected, strength: stats.strength(now) }.publish(&health);
            }

            command = commands.recv() => {
                match command {
                    Some(PollerCommand::SetAddress(host)) => {
                        debug!(%host, "device address changed, resetting poller state");
                        transport.set_host(&host);
                        stats.reset(Instant::now());
                        tracker.reset();
                        connected = false;
                        in_flight = None;
                        ConnectionHealth::down().publish(&health);
                    }
                    None => return,
                }
            }
        }
    }
}
