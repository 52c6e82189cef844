//! Two-color flash
//!
//! Fills the whole strip with one color, then the other, swapping every
//! interval. Runs until replaced.

use embassy_time::{Duration, Instant};

use super::{Direction, Pattern, Step};
use crate::color::Rgb;

#[derive(Debug, Clone)]
pub struct FlashPattern {
    primary: Rgb,
    secondary: Rgb,
    interval: Duration,
    direction: Direction,
    /// Color currently shown, `None` before the first frame
    showing_secondary: Option<bool>,
}

impl FlashPattern {
    /// Create a new flash
    ///
    /// `Forward` shows the primary color first, `Reverse` the secondary one.
    pub const fn new(primary: Rgb, secondary: Rgb, interval: Duration, direction: Direction) -> Self {
        Self {
            primary,
            secondary,
            interval,
            direction,
            showing_secondary: None,
        }
    }

    pub const fn primary(&self) -> Rgb {
        self.primary
    }

    pub const fn secondary(&self) -> Rgb {
        self.secondary
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

impl Pattern for FlashPattern {
    fn step(&mut self, _now: Instant, leds: &mut [Rgb]) -> Step {
        let secondary = match self.showing_secondary {
            None => matches!(self.direction, Direction::Reverse),
            Some(secondary) => !secondary,
        };
        self.showing_secondary = Some(secondary);

        let color = if secondary { self.secondary } else { self.primary };
        leds.fill(color);

        Step::Continue(self.interval)
    }
}
