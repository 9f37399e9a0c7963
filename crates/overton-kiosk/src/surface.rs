//! Video surface seam
//!
//! The kiosk does not decode video itself; it hands [`PlayDirective`]s to a
//! [`VideoSurface`] and consumes progress/finished signals back. The
//! shipped [`HeadlessSurface`] stands in for a real player backend: it logs
//! every load and simulates clip progress on a timer, which keeps the full
//! sequencing loop exercisable on machines without a video stack.

use async_trait::async_trait;
use overton_core::PlayDirective;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Signals a surface delivers back to the sequencing loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// Fractional playback progress in [0, 1]
    Progress(f64),
    /// Terminal signal; the clip ran to its end
    Finished,
}

/// Something that can show a video source
///
/// Implementations own all decode/seek/autoplay mechanics. A changed
/// `directive.version` must be treated as a reload even when the source
/// string is unchanged.
#[async_trait]
pub trait VideoSurface: Send + Sync + 'static {
    async fn load(&self, directive: &PlayDirective) -> anyhow::Result<()>;
}

/// Drives a surface from the directive watch channel
pub async fn drive<S: VideoSurface>(surface: S, mut directives: watch::Receiver<PlayDirective>) {
    let mut current = directives.borrow().clone();
    if let Err(err) = surface.load(&current).await {
        warn!(error = %err, "surface rejected initial load");
    }

    while directives.changed().await.is_ok() {
        let next = directives.borrow_and_update().clone();
        // The version is the reload key; suppress_controls alone changing
        // is not a reload
        if next.version != current.version {
            if let Err(err) = surface.load(&next).await {
                warn!(error = %err, source = %next.source, "surface load failed");
            }
        }
        current = next;
    }
}

/// Timer-driven stand-in for a real player backend
pub struct HeadlessSurface {
    events: mpsc::Sender<SurfaceEvent>,
    /// Nominal duration ascribed to every clip
    clip_duration: Duration,
    playing: Mutex<Option<JoinHandle<()>>>,
}

impl HeadlessSurface {
    pub fn new(events: mpsc::Sender<SurfaceEvent>, clip_duration: Duration) -> Self {
        Self {
            events,
            clip_duration,
            playing: Mutex::new(None),
        }
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        if let Some(task) = self.playing.lock().expect("playback lock poisoned").take() {
            task.abort();
        }
    }
}

#[async_trait]
impl VideoSurface for HeadlessSurface {
    async fn load(&self, directive: &PlayDirective) -> anyhow::Result<()> {
        info!(
            source = %directive.source,
            start_offset = directive.start_offset,
            version = directive.version,
            suppress_controls = directive.suppress_controls,
            "loading source"
        );

        let events = self.events.clone();
        let start = directive.start_offset.clamp(0.0, 1.0);
        let remaining = self.clip_duration.mul_f64(1.0 - start);

        let playback = tokio::spawn(async move {
            // Coarse quarter-clip progress ticks, then the terminal signal
            const STEPS: u32 = 4;
            for step in 1..=STEPS {
                tokio::time::sleep(remaining / STEPS).await;
                let fraction = start + (1.0 - start) * f64::from(step) / f64::from(STEPS);
                debug!(fraction, "playback progress");
                if events.send(SurfaceEvent::Progress(fraction)).await.is_err() {
                    return;
                }
            }
            let _ = events.send(SurfaceEvent::Finished).await;
        });

        let mut playing = self.playing.lock().expect("playback lock poisoned");
        if let Some(previous) = playing.replace(playback) {
            previous.abort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overton_core::PlayDirective;

    fn directive(version: u64, start_offset: f64) -> PlayDirective {
        PlayDirective {
            source: "/videos/neutral.mp4".into(),
            start_offset,
            version,
            suppress_controls: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_headless_surface_plays_through() {
        let (tx, mut rx) = mpsc::channel(16);
        let surface = HeadlessSurface::new(tx, Duration::from_secs(8));

        surface.load(&directive(1, 0.0)).await.unwrap();

        let mut events = Vec::new();
        for _ in 0..5 {
            events.push(rx.recv().await.unwrap());
        }
        assert_eq!(events[0], SurfaceEvent::Progress(0.25));
        assert_eq!(events[4], SurfaceEvent::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_cancels_previous_clip() {
        let (tx, mut rx) = mpsc::channel(16);
        let surface = HeadlessSurface::new(tx, Duration::from_secs(8));

        surface.load(&directive(1, 0.0)).await.unwrap();
        // Reload immediately; the first clip's timer must never fire
        surface.load(&directive(2, 0.5)).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event, SurfaceEvent::Progress(0.625));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_reloads_on_version_change_only() {
        let (tx, mut rx) = mpsc::channel(16);
        let surface = HeadlessSurface::new(tx, Duration::from_secs(4));

        let (directive_tx, directive_rx) = watch::channel(directive(1, 0.0));
        tokio::spawn(drive(surface, directive_rx));

        // First progress event proves the initial load happened
        assert_eq!(rx.recv().await.unwrap(), SurfaceEvent::Progress(0.25));

        // Same version, different flag: no reload, playback continues
        let mut flagged = directive(1, 0.0);
        flagged.suppress_controls = true;
        directive_tx.send(flagged).unwrap();
        assert_eq!(rx.recv().await.unwrap(), SurfaceEvent::Progress(0.5));

        // New version: reload restarts progress from the new offset
        directive_tx.send(directive(2, 0.0)).unwrap();
        loop {
            // Drain whatever the old clip still sent before the reload won
            match rx.recv().await.unwrap() {
                SurfaceEvent::Progress(f) if f <= 0.25 => break,
                _ => continue,
            }
        }
    }
}
