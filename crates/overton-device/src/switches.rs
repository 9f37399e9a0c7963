//! Digital switch poller
//!
//! Samples `GET /switches` sequentially on a slow interval; the transport
//! timeout (2 s) is well under the interval (3 s), so at most one request
//! is ever outstanding. While the device is failing, the effective
//! interval widens proportionally to the consecutive-failure count, and on
//! sustained disconnect the regular loop is suspended in favour of a
//! detached `/status` probe on a fixed delay.

use crate::stats::{ConnectionHealth, ConnectionStats};
use crate::transport::DeviceTransport;
use crate::wire::SwitchFrame;
use crate::PollerCommand;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Digital poller settings
#[derive(Debug, Clone)]
pub struct SwitchPollerConfig {
    pub poll_interval: Duration,
    /// Failures in a row before the device counts as disconnected
    pub max_consecutive_failures: u32,
    /// Fixed delay before each reconnect probe while disconnected
    pub reconnect_delay: Duration,
}

impl Default for SwitchPollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            max_consecutive_failures: 5,
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

/// One of the two physical switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchId {
    Switch1,
    Switch2,
}

impl std::fmt::Display for SwitchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwitchId::Switch1 => write!(f, "switch1"),
            SwitchId::Switch2 => write!(f, "switch2"),
        }
    }
}

/// A switch state change (also fired for the first reading, so consumers
/// learn the starting device state)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchEvent {
    pub switch: SwitchId,
    pub state: u8,
}

/// Running poller plus its output channels
pub struct SwitchHandle {
    pub events: mpsc::Receiver<SwitchEvent>,
    pub health: watch::Receiver<ConnectionHealth>,
    commands: mpsc::Sender<PollerCommand>,
    task: JoinHandle<()>,
}

impl SwitchHandle {
    /// Repoint the poller at a different device, resetting all state
    pub async fn set_address(&self, host: impl Into<String>) {
        let _ = self
            .commands
            .send(PollerCommand::SetAddress(host.into()))
            .await;
    }
}

impl Drop for SwitchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start polling
pub fn spawn<T: DeviceTransport>(transport: T, config: SwitchPollerConfig) -> SwitchHandle {
    let (event_tx, event_rx) = mpsc::channel(16);
    let (health_tx, health_rx) = watch::channel(ConnectionHealth::down());
    let (command_tx, command_rx) = mpsc::channel(8);

    let task = tokio::spawn(run(
        Arc::new(transport),
        config,
        event_tx,
        health_tx,
        command_rx,
    ));

    SwitchHandle {
        events: event_rx,
        health: health_rx,
        commands: command_tx,
        task,
    }
}

/// Effective wait between polls, widened while the device is failing
fn backoff_interval(base: Duration, consecutive_failures: u32) -> Duration {
    if consecutive_failures == 0 {
        base
    } else {
        base.mul_f64(1.0 + consecutive_failures as f64 * 0.5)
    }
}

struct PollerState {
    stats: ConnectionStats,
    last_states: [Option<u8>; 2],
    connected: bool,
}

impl PollerState {
    fn new() -> Self {
        Self {
            stats: ConnectionStats::new(Instant::now()),
            last_states: [None, None],
            connected: false,
        }
    }

    fn apply_address_change<T: DeviceTransport>(
        &mut self,
        transport: &Arc<T>,
        host: &str,
        health: &watch::Sender<ConnectionHealth>,
    ) {
        debug!(%host, "device address changed, resetting poller state");
        transport.set_host(host);
        self.stats.reset(Instant::now());
        self.last_states = [None, None];
        self.connected = false;
        ConnectionHealth::down().publish(health);
    }
}

async fn run<T: DeviceTransport>(
    transport: Arc<T>,
    config: SwitchPollerConfig,
    events: mpsc::Sender<SwitchEvent>,
    health: watch::Sender<ConnectionHealth>,
    mut commands: mpsc::Receiver<PollerCommand>,
) {
    let mut state = PollerState::new();

    loop {
        let started = Instant::now();

        let result = tokio::select! {
            result = transport.fetch_switches() => result,
            command = commands.recv() => {
                match command {
                    Some(PollerCommand::SetAddress(host)) => {
                        state.apply_address_change(&transport, &host, &health);
                        continue;
                    }
                    None => return,
                }
            }
        };

        let now = Instant::now();
        match result {
            Ok(frame) => {
                state.stats.record_success(now - started, now);
                if !state.connected {
                    info!("switch device connected");
                    state.connected = true;
                }
                ConnectionHealth { connected: true, strength: 0 }.publish(&health);

                if !emit_changes(&frame, &mut state.last_states, &events).await {
                    return;
                }
            }
            Err(err) => {
                state.stats.record_failure();
                debug!(
                    error = %err,
                    consecutive = state.stats.consecutive_failures(),
                    "switch poll failed"
                );

                if state.stats.consecutive_failures() >= config.max_consecutive_failures {
                    if state.connected {
                        warn!(
                            failures = state.stats.consecutive_failures(),
                            "switch device disconnected, suspending polls"
                        );
                    }
                    state.connected = false;
                    ConnectionHealth::down().publish(&health);

                    // Detached reconnect: fixed delay, then a cheap /status
                    // probe, independent of the regular poll timer
                    if !wait_for_device(&transport, &config, &mut state, &health, &mut commands)
                        .await
                    {
                        return;
                    }
                    continue;
                }
            }
        }

        let wait = backoff_interval(config.poll_interval, state.stats.consecutive_failures());
        tokio::select! {
            _ = tokio::time::sleep_until((started + wait).into()) => {}
            command = commands.recv() => {
                match command {
                    Some(PollerCommand::SetAddress(host)) => {
                        state.apply_address_change(&transport, &host, &health);
                    }
                    None => return,
                }
            }
        }
    }
}

/// Probe `/status` until the device answers; returns false when the
/// command channel closed and the poller should exit
async fn wait_for_device<T: DeviceTransport>(
    transport: &Arc<T>,
    config: &SwitchPollerConfig,
    state: &mut PollerState,
    health: &watch::Sender<ConnectionHealth>,
    commands: &mut mpsc::Receiver<PollerCommand>,
) -> bool {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(config.reconnect_delay) => {}
            command = commands.recv() => {
                match command {
                    Some(PollerCommand::SetAddress(host)) => {
                        state.apply_address_change(transport, &host, health);
                        return true;
                    }
                    None => return false,
                }
            }
        }

        info!("attempting to reconnect to switch device");
        match transport.probe_status().await {
            Ok(_) => {
                info!("switch device reachable again, resuming polls");
                return true;
            }
            Err(err) => {
                debug!(error = %err, "reconnect probe failed");
            }
        }
    }
}

async fn emit_changes(
    frame: &SwitchFrame,
    last_states: &mut [Option<u8>; 2],
    events: &mpsc::Sender<SwitchEvent>,
) -> bool {
    let readings = [
        (SwitchId::Switch1, frame.switch1),
        (SwitchId::Switch2, frame.switch2),
    ];

    for (i, (switch, state)) in readings.into_iter().enumerate() {
        if last_states[i] != Some(state) {
            info!(%switch, state, "switch changed");
            if events.send(SwitchEvent { switch, state }).await.is_err() {
                return false;
            }
            last_states[i] = Some(state);
        }
    }
    true
}
