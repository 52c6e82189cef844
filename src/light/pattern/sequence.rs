//! Accelerating sequence
//!
//! A short lit segment with a fading tail runs along the strip, wrapping at
//! the end. It starts slow and speeds up along an ease-in curve, then blanks
//! the strip and finishes once the total duration has elapsed.

use embassy_time::{Duration, Instant};

use super::{Direction, Pattern, Step};
use crate::{
    color::{BLACK, Rgb, dim},
    math8::progress8,
};

// Step interval at the start and at the end of the run
const START_STEP_MS: f32 = 200.0;
const END_STEP_MS: f32 = 15.0;
const ACCELERATION: f32 = 2.0;

/// Brightness of the head and each tail pixel
const SEGMENT: [u8; 3] = [255, 120, 40];

#[derive(Debug, Clone)]
pub struct SequencePattern {
    color: Rgb,
    direction: Direction,
    total: Duration,
    /// Set on the first rendered frame
    started_at: Option<Instant>,
    /// Logical position of the segment head
    head: usize,
}

impl SequencePattern {
    pub const fn new(color: Rgb, direction: Direction, total: Duration) -> Self {
        Self {
            color,
            direction,
            total,
            started_at: None,
            head: 0,
        }
    }

    pub const fn color(&self) -> Rgb {
        self.color
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub const fn total(&self) -> Duration {
        self.total
    }

    /// Step interval after `elapsed` time; never increases as `elapsed` grows
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_lossless
    )]
    pub fn step_interval(&self, elapsed: Duration) -> Duration {
        let progress = f32::from(progress8(elapsed, self.total)) / 255.0;
        let remaining = libm::powf(1.0 - progress, ACCELERATION);
        let millis = END_STEP_MS + (START_STEP_MS - END_STEP_MS) * remaining;
        Duration::from_millis(millis as u64)
    }
}

impl Pattern for SequencePattern {
    fn step(&mut self, now: Instant, leds: &mut [Rgb]) -> Step {
        let started = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);

        leds.fill(BLACK);
        if leds.is_empty() || elapsed >= self.total {
            return Step::Finished;
        }

        let len = leds.len();
        for (offset, scale) in SEGMENT.iter().enumerate().take(len) {
            let position = (self.head + len - offset) % len;
            leds[self.direction.pixel(position, len)] = dim(self.color, *scale);
        }
        self.head = (self.head + 1) % len;

        Step::Continue(self.step_interval(elapsed))
    }
}
