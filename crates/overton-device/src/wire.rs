//! Wire model for the device's HTTP endpoints
//!
//! The firmware exposes three JSON endpoints on port 8080:
//! - `GET /sliders`: two analog sliders, two channels each
//! - `GET /switches`: two digital switch states
//! - `GET /status`: liveness probe with uptime

use serde::{Deserialize, Serialize};

/// One monitored slider channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliderChannel {
    Slider1A,
    Slider1B,
    Slider2A,
    Slider2B,
}

impl SliderChannel {
    /// All channels, in frame order
    pub const ALL: [SliderChannel; 4] = [
        SliderChannel::Slider1A,
        SliderChannel::Slider1B,
        SliderChannel::Slider2A,
        SliderChannel::Slider2B,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            SliderChannel::Slider1A => 0,
            SliderChannel::Slider1B => 1,
            SliderChannel::Slider2A => 2,
            SliderChannel::Slider2B => 3,
        }
    }
}

impl std::fmt::Display for SliderChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliderChannel::Slider1A => write!(f, "slider1.a"),
            SliderChannel::Slider1B => write!(f, "slider1.b"),
            SliderChannel::Slider2A => write!(f, "slider2.a"),
            SliderChannel::Slider2B => write!(f, "slider2.b"),
        }
    }
}

/// Raw ADC value and scaled percentage for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelReading {
    pub raw: i64,
    pub percentage: f64,
}

/// Both channels of one physical slider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderPair {
    pub channel_a: ChannelReading,
    pub channel_b: ChannelReading,
}

/// Response body of `GET /sliders`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderFrame {
    pub slider1: SliderPair,
    pub slider2: SliderPair,
}

impl SliderFrame {
    /// Reported percentage for a channel
    pub fn percentage(&self, channel: SliderChannel) -> f64 {
        match channel {
            SliderChannel::Slider1A => self.slider1.channel_a.percentage,
            SliderChannel::Slider1B => self.slider1.channel_b.percentage,
            SliderChannel::Slider2A => self.slider2.channel_a.percentage,
            SliderChannel::Slider2B => self.slider2.channel_b.percentage,
        }
    }
}

/// Response body of `GET /switches`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchFrame {
    pub switch1: u8,
    pub switch2: u8,
}

/// Response body of `GET /status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFrame {
    pub status: String,
    pub uptime: u64,
}
