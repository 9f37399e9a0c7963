//! Per-channel change thresholding
//!
//! A channel's change is reported when it moves at least `threshold`
//! percentage points away from the last *reported* value, not the last
//! sampled one, which suppresses jitter that oscillates under the
//! threshold. The first reading of a channel always reports so consumers
//! learn the starting device state.

use crate::wire::SliderChannel;

#[derive(Debug)]
pub struct DeltaTracker {
    threshold: f64,
    last_reported: [Option<f64>; 4],
}

impl DeltaTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_reported: [None; 4],
        }
    }

    /// Returns true when this reading should be reported; reporting
    /// updates the remembered value for the channel.
    pub fn observe(&mut self, channel: SliderChannel, percentage: f64) -> bool {
        let slot = &mut self.last_reported[channel.index()];
        let fire = match *slot {
            None => true,
            Some(last) => (percentage - last).abs() >= self.threshold,
        };
        if fire {
            *slot = Some(percentage);
        }
        fire
    }

    /// Forget all channels, e.g. after a device-address change
    pub fn reset(&mut self) {
        self.last_reported = [None; 4];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::SliderChannel::*;

    #[test]
    fn test_first_reading_always_fires() {
        let mut tracker = DeltaTracker::new(2.0);
        assert!(tracker.observe(Slider1A, 0.0));
        assert!(tracker.observe(Slider1B, 50.0));
    }

    #[test]
    fn test_jitter_below_threshold_suppressed() {
        let mut tracker = DeltaTracker::new(2.0);
        tracker.observe(Slider1A, 50.0);

        assert!(!tracker.observe(Slider1A, 51.0));
        assert!(!tracker.observe(Slider1A, 49.0));
        assert!(!tracker.observe(Slider1A, 51.9));
    }

    #[test]
    fn test_delta_is_against_last_reported_not_last_sample() {
        let mut tracker = DeltaTracker::new(2.0);
        tracker.observe(Slider1A, 50.0);

        // Creeps by 1% per sample; each sample is within threshold of the
        // previous one, but the second is 2% from the last *reported* value
        assert!(!tracker.observe(Slider1A, 51.0));
        assert!(tracker.observe(Slider1A, 52.0));

        // Reported value is now 52
        assert!(!tracker.observe(Slider1A, 53.0));
        assert!(tracker.observe(Slider1A, 54.0));
    }

    #[test]
    fn test_exact_threshold_fires() {
        let mut tracker = DeltaTracker::new(2.0);
        tracker.observe(Slider2B, 10.0);
        assert!(tracker.observe(Slider2B, 12.0));
        assert!(tracker.observe(Slider2B, 10.0));
    }

    #[test]
    fn test_channels_tracked_independently() {
        let mut tracker = DeltaTracker::new(2.0);
        tracker.observe(Slider1A, 50.0);

        // A different channel's first reading still fires
        assert!(tracker.observe(Slider2A, 50.0));
        assert!(!tracker.observe(Slider1A, 50.5));
    }

    #[test]
    fn test_reset_forgets_reported_values() {
        let mut tracker = DeltaTracker::new(2.0);
        tracker.observe(Slider1A, 50.0);
        tracker.reset();
        assert!(tracker.observe(Slider1A, 50.0));
    }
}
