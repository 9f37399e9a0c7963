//! Playback event emission
//!
//! Advisory telemetry for the installation log: state transitions, position
//! commits, source selections and device connection changes. Never consulted
//! for control decisions.

use crate::{ContentKind, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Unique identifier for one run of the installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playback event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Content kind changed
    StateChange {
        from: ContentKind,
        to: ContentKind,
        version: u64,
    },

    /// A pending or immediate position change took effect
    PositionCommitted {
        position: Position,
        version: u64,
    },

    /// A new source was handed to the video surface
    SourceSelected {
        source: String,
        kind: ContentKind,
        start_offset: f64,
    },

    /// Device connection health changed
    DeviceConnection {
        connected: bool,
        strength: u8,
    },
}

/// Playback event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event ID
    pub id: Uuid,
    /// Session ID
    pub session_id: SessionId,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Sequence number
    pub sequence: u64,
    /// The event
    #[serde(flatten)]
    pub event: PlaybackEvent,
}

/// Buffers event records and forwards them to a background logger task
pub struct EventEmitter {
    session_id: SessionId,
    sequence: u64,
    buffer: Vec<EventRecord>,
    max_buffer_size: usize,
    event_tx: mpsc::Sender<EventRecord>,
}

impl EventEmitter {
    pub fn new() -> Self {
        let (event_tx, mut event_rx) = mpsc::channel::<EventRecord>(256);

        // Background logger; a sink for the installation journal
        tokio::spawn(async move {
            while let Some(record) = event_rx.recv().await {
                debug!(
                    event_id = %record.id,
                    sequence = record.sequence,
                    event = ?record.event,
                    "playback event"
                );
            }
        });

        Self {
            session_id: SessionId::new(),
            sequence: 0,
            buffer: Vec::new(),
            max_buffer_size: 64,
            event_tx,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Emit a playback event
    pub async fn emit(&mut self, event: PlaybackEvent) {
        self.sequence += 1;

        let record = EventRecord {
            id: Uuid::new_v4(),
            session_id: self.session_id,
            timestamp: Utc::now(),
            sequence: self.sequence,
            event,
        };

        self.buffer.push(record.clone());
        if self.buffer.len() > self.max_buffer_size {
            self.buffer.remove(0);
        }

        let _ = self.event_tx.send(record).await;
    }

    /// Recent records, oldest first
    pub fn recent(&self) -> &[EventRecord] {
        &self.buffer
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emitter_sequences_records() {
        let mut emitter = EventEmitter::new();

        emitter
            .emit(PlaybackEvent::StateChange {
                from: ContentKind::News,
                to: ContentKind::Ad1,
                version: 1,
            })
            .await;
        emitter
            .emit(PlaybackEvent::DeviceConnection {
                connected: true,
                strength: 5,
            })
            .await;

        let records = emitter.recent();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, 1);
        assert_eq!(records[1].sequence, 2);
        assert_eq!(records[0].session_id, emitter.session_id());
    }

    #[tokio::test]
    async fn test_event_serializes_tagged() {
        let mut emitter = EventEmitter::new();
        emitter
            .emit(PlaybackEvent::SourceSelected {
                source: "/videos/neutral.mp4".into(),
                kind: ContentKind::Banner,
                start_offset: 0.0,
            })
            .await;

        let json = serde_json::to_string(&emitter.recent()[0]).unwrap();
        assert!(json.contains("\"event\":\"source_selected\""));
        assert!(json.contains("\"kind\":\"banner\""));
    }
}
