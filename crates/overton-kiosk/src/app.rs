//! Application wiring
//!
//! One event loop owns the sequencer and reacts to three sources: position
//! requests derived from device events, progress/finished signals from the
//! video surface, and connection-health changes. Decisions flow out as
//! [`PlayDirective`]s on a watch channel that the surface driver follows.

use crate::input::InputMapper;
use crate::surface::{self, HeadlessSurface, SurfaceEvent};
use anyhow::Context;
use overton_core::{
    DeviceVariant, EventEmitter, InstallationConfig, PlayDirective, PlaybackEvent, Position,
    Sequencer, Transition,
};
use overton_device::{
    sliders, switches, ConnectionHealth, HttpTransport, SliderPollerConfig, SwitchPollerConfig,
};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Nominal clip length ascribed by the headless surface
const HEADLESS_CLIP_DURATION: Duration = Duration::from_secs(30);

pub async fn run(config: InstallationConfig) -> anyhow::Result<()> {
    config.validate()?;

    let mut sequencer = Sequencer::new(
        config.sequencer.clone(),
        config.catalog.clone(),
        config.initial_position.clone(),
    );
    let mut emitter = EventEmitter::new();
    info!(
        session_id = %emitter.session_id(),
        device = %config.device.host,
        "installation starting"
    );

    let (surface_tx, mut surface_events) = mpsc::channel(16);
    let surface = HeadlessSurface::new(surface_tx, HEADLESS_CLIP_DURATION);

    let (directive_tx, directive_rx) = watch::channel(sequencer.directive(Instant::now()));
    tokio::spawn(surface::drive(surface, directive_rx));

    let (mut positions, mut health) = spawn_device(&config)?;
    let mut inputs_open = true;
    let mut device_alive = true;
    let mut cooldown: Option<tokio::time::Instant> = None;

    loop {
        tokio::select! {
            maybe_position = positions.recv(), if inputs_open => {
                match maybe_position {
                    Some(position) => {
                        let now = Instant::now();
                        if let Some(transition) = sequencer.request_position_change(position, now) {
                            emit_transition(&mut emitter, &sequencer, &transition, now).await;
                            if sequencer.is_transitioning(now) {
                                cooldown = Some(
                                    tokio::time::Instant::now()
                                        + config.sequencer.transition_cooldown,
                                );
                            }
                            publish(&directive_tx, &sequencer, now);
                        }
                    }
                    None => {
                        warn!("device input bridge closed");
                        inputs_open = false;
                    }
                }
            }

            event = surface_events.recv() => {
                match event {
                    Some(SurfaceEvent::Progress(fraction)) => {
                        sequencer.handle_progress(fraction);
                    }
                    Some(SurfaceEvent::Finished) => {
                        let now = Instant::now();
                        if let Some(transition) = sequencer.handle_finished(now) {
                            emit_transition(&mut emitter, &sequencer, &transition, now).await;
                            publish(&directive_tx, &sequencer, now);
                        }
                    }
                    None => anyhow::bail!("surface event channel closed"),
                }
            }

            changed = health.changed(), if device_alive => {
                match changed {
                    Ok(()) => {
                        let snapshot: ConnectionHealth = *health.borrow_and_update();
                        if snapshot.connected {
                            info!(strength = snapshot.strength, "device connected");
                        } else {
                            warn!("device disconnected");
                        }
                        emitter
                            .emit(PlaybackEvent::DeviceConnection {
                                connected: snapshot.connected,
                                strength: snapshot.strength,
                            })
                            .await;
                    }
                    Err(_) => {
                        warn!("device poller stopped");
                        device_alive = false;
                    }
                }
            }

            _ = async { tokio::time::sleep_until(cooldown.expect("guarded by precondition")).await },
                if cooldown.is_some() =>
            {
                cooldown = None;
                // Re-publish so the surface lifts its control suppression
                publish(&directive_tx, &sequencer, Instant::now());
            }

            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }

    Ok(())
}

/// Journal a completed transition
async fn emit_transition(
    emitter: &mut EventEmitter,
    sequencer: &Sequencer,
    transition: &Transition,
    now: Instant,
) {
    if transition.from != transition.to {
        emitter
            .emit(PlaybackEvent::StateChange {
                from: transition.from,
                to: transition.to,
                version: transition.version,
            })
            .await;
    }

    if let Some(position) = &transition.committed_position {
        emitter
            .emit(PlaybackEvent::PositionCommitted {
                position: position.clone(),
                version: transition.version,
            })
            .await;
    }

    let directive = sequencer.directive(now);
    emitter
        .emit(PlaybackEvent::SourceSelected {
            source: directive.source,
            kind: sequencer.content(),
            start_offset: directive.start_offset,
        })
        .await;
}

fn publish(tx: &watch::Sender<PlayDirective>, sequencer: &Sequencer, now: Instant) {
    let _ = tx.send(sequencer.directive(now));
}

/// Start the configured poller variant and bridge its events into
/// position-change requests
fn spawn_device(
    config: &InstallationConfig,
) -> anyhow::Result<(mpsc::Receiver<Position>, watch::Receiver<ConnectionHealth>)> {
    let transport = HttpTransport::new(&config.device.host, config.device.port)
        .context("invalid device address")?;
    let poll_interval = Duration::from_millis(config.device.poll_interval_ms);

    let (position_tx, position_rx) = mpsc::channel(16);
    let mut mapper = InputMapper::new(config.axes.clone(), config.initial_position.clone());

    let health = match config.device.variant {
        DeviceVariant::Sliders => {
            let mut handle = sliders::spawn(
                transport,
                SliderPollerConfig {
                    poll_interval,
                    threshold: config.device.threshold,
                    ..Default::default()
                },
            );
            let health = handle.health.clone();
            tokio::spawn(async move {
                while let Some(event) = handle.events.recv().await {
                    if let Some(position) = mapper.apply_slider(&event) {
                        if position_tx.send(position).await.is_err() {
                            return;
                        }
                    }
                }
            });
            health
        }
        DeviceVariant::Switches => {
            let mut handle = switches::spawn(
                transport,
                SwitchPollerConfig {
                    poll_interval,
                    ..Default::default()
                },
            );
            let health = handle.health.clone();
            tokio::spawn(async move {
                while let Some(event) = handle.events.recv().await {
                    if let Some(position) = mapper.apply_switch(&event) {
                        if position_tx.send(position).await.is_err() {
                            return;
                        }
                    }
                }
            });
            health
        }
    };

    Ok((position_rx, health))
}
