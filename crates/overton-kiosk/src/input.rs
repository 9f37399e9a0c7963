//! Input mapping - device events to position requests
//!
//! Panel wiring: slider 1 sweeps the economic axis, slider 2 the social
//! axis; on the switch panel, switch 1 and 2 toggle between the two ends
//! of the same axes. The B channels are spares on the current panel and
//! are ignored.

use overton_core::{AxisDomain, Position};
use overton_device::{SliderChannel, SliderEvent, SwitchEvent, SwitchId};

/// Folds raw device events into position-change requests
///
/// Tracks the last derived position so bucket-internal slider movement does
/// not produce duplicate requests.
pub struct InputMapper {
    axes: AxisDomain,
    current: Position,
}

impl InputMapper {
    pub fn new(axes: AxisDomain, initial: Position) -> Self {
        Self {
            axes,
            current: initial,
        }
    }

    /// Returns the new position when a slider event moves it
    pub fn apply_slider(&mut self, event: &SliderEvent) -> Option<Position> {
        let fraction = event.percentage / 100.0;
        let next = match event.channel {
            SliderChannel::Slider1A => Position::new(
                self.axes.horizontal_for_fraction(fraction),
                self.current.vertical.clone(),
            ),
            SliderChannel::Slider2A => Position::new(
                self.current.horizontal.clone(),
                self.axes.vertical_for_fraction(fraction),
            ),
            SliderChannel::Slider1B | SliderChannel::Slider2B => return None,
        };
        self.advance(next)
    }

    /// Returns the new position when a switch event moves it
    ///
    /// A switch selects an axis end: open (0) is the first configured
    /// value, closed is the last.
    pub fn apply_switch(&mut self, event: &SwitchEvent) -> Option<Position> {
        let pick = |values: &[String]| -> String {
            if event.state == 0 {
                values.first().cloned().unwrap_or_default()
            } else {
                values.last().cloned().unwrap_or_default()
            }
        };

        let next = match event.switch {
            SwitchId::Switch1 => Position::new(
                pick(&self.axes.horizontal),
                self.current.vertical.clone(),
            ),
            SwitchId::Switch2 => Position::new(
                self.current.horizontal.clone(),
                pick(&self.axes.vertical),
            ),
        };
        self.advance(next)
    }

    fn advance(&mut self, next: Position) -> Option<Position> {
        if next == self.current {
            return None;
        }
        self.current = next.clone();
        Some(next)
    }
}
