//! Playback Sequencer - decides what plays next
//!
//! The sequencer owns all playback state: the current content kind, the
//! active and pending positions, per-kind resume offsets, and the content
//! version counter. It reacts to two external signals - "content finished"
//! from the video surface and "position change requested" from user input -
//! and exposes its decision as a [`PlayDirective`].
//!
//! Transition protocol:
//! - News plays until finished, then one or two ad tiers, then News again.
//! - A position change during News cuts to the neutral banner; the new
//!   position is held pending and committed when the banner finishes.
//! - A position change during an ad applies immediately (ads are
//!   position-tied but not gated by the banner ritual).
//!
//! All methods are synchronous and take the current `Instant` from the
//! caller, so the cooldown window is testable without a runtime.

use crate::{ContentKind, Position, SourceCatalog};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Sequencer behaviour knobs
///
/// The installation's feature set changed between iterations (second ad
/// tier added, banner removed in one revision), so these are configuration
/// rather than hard-coded flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Number of ad tiers between news clips (0, 1 or 2)
    pub ad_tiers: u8,
    /// Interpose the neutral banner on news position changes
    pub banner_enabled: bool,
    /// UI flicker-suppression window after a cut to the banner
    #[serde(with = "duration_ms", rename = "transition_cooldown_ms")]
    pub transition_cooldown: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            ad_tiers: 1,
            banner_enabled: true,
            transition_cooldown: Duration::from_millis(800),
        }
    }
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// What the video surface should be showing right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayDirective {
    /// Asset path or URL
    pub source: String,
    /// Fractional start offset in [0, 1]
    pub start_offset: f64,
    /// Reload key: a changed version means reload even if `source` is
    /// unchanged (same kind, different position can map to the same file)
    pub version: u64,
    /// True while the transition cooldown runs; the surface hides controls
    pub suppress_controls: bool,
}

/// Record of a completed state change, for logging and event emission
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: ContentKind,
    pub to: ContentKind,
    pub version: u64,
    /// Position committed to `active_position` by this transition, if any
    pub committed_position: Option<Position>,
}

/// Fractional resume offsets, one per content kind
///
/// The banner always starts at zero; news and ad tracks keep independent
/// offsets so each kind resumes where it left off.
#[derive(Debug, Clone, Copy, Default)]
struct ResumeOffsets {
    news: f64,
    ad1: f64,
    ad2: f64,
}

impl ResumeOffsets {
    fn get(&self, kind: ContentKind) -> f64 {
        match kind {
            ContentKind::Banner => 0.0,
            ContentKind::Ad1 => self.ad1,
            ContentKind::Ad2 => self.ad2,
            ContentKind::News => self.news,
        }
    }

    fn set(&mut self, kind: ContentKind, offset: f64) {
        let offset = offset.clamp(0.0, 1.0);
        match kind {
            ContentKind::Banner => {}
            ContentKind::Ad1 => self.ad1 = offset,
            ContentKind::Ad2 => self.ad2 = offset,
            ContentKind::News => self.news = offset,
        }
    }
}

/// The playback sequencing state machine
pub struct Sequencer {
    config: SequencerConfig,
    catalog: SourceCatalog,
    content: ContentKind,
    active_position: Position,
    pending_position: Option<Position>,
    offsets: ResumeOffsets,
    version: u64,
    /// Cooldown deadline; the transition flag is derived from it, so the
    /// flag can never outlive its bound
    transition_until: Option<Instant>,
}

impl Sequencer {
    pub fn new(config: SequencerConfig, catalog: SourceCatalog, initial: Position) -> Self {
        Self {
            config,
            catalog,
            content: ContentKind::News,
            active_position: initial,
            pending_position: None,
            offsets: ResumeOffsets::default(),
            version: 0,
            transition_until: None,
        }
    }

    pub fn content(&self) -> ContentKind {
        self.content
    }

    pub fn active_position(&self) -> &Position {
        &self.active_position
    }

    pub fn pending_position(&self) -> Option<&Position> {
        self.pending_position.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// True while the post-cut cooldown window is open
    pub fn is_transitioning(&self, now: Instant) -> bool {
        self.transition_until.is_some_and(|until| now < until)
    }

    /// Resume offset currently recorded for a kind
    pub fn resume_offset(&self, kind: ContentKind) -> f64 {
        self.offsets.get(kind)
    }

    /// The source decision for the video surface
    pub fn directive(&self, now: Instant) -> PlayDirective {
        PlayDirective {
            source: self
                .catalog
                .source_for(&self.active_position, self.content)
                .to_string(),
            start_offset: self.offsets.get(self.content),
            version: self.version,
            suppress_controls: self.is_transitioning(now),
        }
    }

    /// Record playback progress from the surface
    ///
    /// Banner progress is never persisted; the bumper always restarts.
    pub fn handle_progress(&mut self, fraction: f64) {
        self.offsets.set(self.content, fraction);
    }

    /// Advance the state machine on a terminal "finished" signal
    ///
    /// A finished event arriving inside the cooldown window is treated as
    /// surface noise and ignored.
    pub fn handle_finished(&mut self, now: Instant) -> Option<Transition> {
        if self.is_transitioning(now) {
            debug!(content = %self.content, "finished ignored during transition cooldown");
            return None;
        }

        let from = self.content;
        let mut committed = None;

        let to = match from {
            ContentKind::News => {
                self.offsets.set(ContentKind::News, 0.0);
                if self.config.ad_tiers >= 1 {
                    ContentKind::Ad1
                } else {
                    ContentKind::News
                }
            }
            ContentKind::Ad1 => {
                self.offsets.set(ContentKind::Ad1, 0.0);
                if self.config.ad_tiers >= 2 {
                    ContentKind::Ad2
                } else {
                    ContentKind::News
                }
            }
            ContentKind::Ad2 => {
                self.offsets.set(ContentKind::Ad2, 0.0);
                ContentKind::News
            }
            ContentKind::Banner => {
                if let Some(pending) = self.pending_position.take() {
                    if pending != self.active_position {
                        self.active_position = pending.clone();
                    }
                    committed = Some(pending);
                }
                ContentKind::News
            }
        };

        self.content = to;
        self.version += 1;

        info!(
            from = %from,
            to = %to,
            version = self.version,
            committed = committed.as_ref().map(|p| p.to_string()),
            "content finished, advancing"
        );

        Some(Transition {
            from,
            to,
            version: self.version,
            committed_position: committed,
        })
    }

    /// Handle a user position-change request
    ///
    /// While the banner shows, requests are captured into the pending slot
    /// (queue-of-one, latest wins) and the banner itself is never cut
    /// short; the cooldown does not gate this capture. Outside the banner a
    /// request is dropped while a transition is in progress or when it
    /// matches the active position.
    pub fn request_position_change(
        &mut self,
        new: Position,
        now: Instant,
    ) -> Option<Transition> {
        if self.content == ContentKind::Banner {
            // Latest wins; a request equal to the active position cancels
            // the pending change on commit (applying it is a no-op).
            debug!(position = %new, "position change captured while banner showing");
            self.pending_position = Some(new);
            return None;
        }

        if self.is_transitioning(now) {
            debug!(position = %new, "position change dropped, transition in progress");
            return None;
        }

        if new == self.active_position {
            return None;
        }

        let from = self.content;
        match from {
            ContentKind::News if self.config.banner_enabled => {
                self.transition_until = Some(now + self.config.transition_cooldown);
                self.pending_position = Some(new.clone());
                self.content = ContentKind::Banner;
                self.version += 1;

                info!(
                    pending = %new,
                    version = self.version,
                    "cutting to banner for position change"
                );

                Some(Transition {
                    from,
                    to: ContentKind::Banner,
                    version: self.version,
                    committed_position: None,
                })
            }
            // Ads are position-tied but not gated by the banner ritual;
            // same for news when the banner is disabled.
            ContentKind::News | ContentKind::Ad1 | ContentKind::Ad2 => {
                self.active_position = new.clone();
                self.version += 1;

                info!(
                    position = %new,
                    content = %from,
                    version = self.version,
                    "position applied immediately"
                );

                Some(Transition {
                    from,
                    to: from,
                    version: self.version,
                    committed_position: Some(new),
                })
            }
            ContentKind::Banner => unreachable!("handled above"),
        }
    }
}
