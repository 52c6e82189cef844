//! Pattern system with compile-time known variants
//!
//! All patterns are stored in an enum to avoid heap allocations.
//! Animated patterns implement the `Pattern` trait.

mod flash;
mod sequence;

use embassy_time::{Duration, Instant};
pub use flash::FlashPattern;
pub use lamp_test::LampTestPattern;
pub use sequence::SequencePattern;

use crate::color::Rgb;

/// Which end of the strip an animation starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Map a logical position to a pixel index
    pub(crate) const fn pixel(self, position: usize, len: usize) -> usize {
        match self {
            Self::Forward => position,
            Self::Reverse => len - 1 - position,
        }
    }
}

/// Outcome of advancing a pattern by one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Nothing to animate
    Idle,
    /// Pixels updated; advance again after the given interval
    Continue(Duration),
    /// Time-bounded pattern ran to completion
    Finished,
}

pub(crate) trait Pattern {
    /// Render the next frame into `leds`
    fn step(&mut self, now: Instant, leds: &mut [Rgb]) -> Step;
}

/// Pattern tag without parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PatternKind {
    None,
    Solid,
    Flash,
    AcceleratingSequence,
    LampTest,
}

/// Pattern slot - enum containing every pattern a strip can run
#[derive(Debug, Clone, Default)]
pub enum ActivePattern {
    /// No pattern; pixels keep their last rendered values
    #[default]
    None,
    /// Filled with one color
    Solid(Rgb),
    /// Alternating between two colors
    Flash(FlashPattern),
    /// Moving segment that speeds up until it finishes
    AcceleratingSequence(SequencePattern),
    /// Startup check, one strip after another
    LampTest(LampTestPattern),
}

impl ActivePattern {
    pub fn kind(&self) -> PatternKind {
        match self {
            Self::None => PatternKind::None,
            Self::Solid(_) => PatternKind::Solid,
            Self::Flash(_) => PatternKind::Flash,
            Self::AcceleratingSequence(_) => PatternKind::AcceleratingSequence,
            Self::LampTest(_) => PatternKind::LampTest,
        }
    }

    /// Check if this is a flash with the given primary color
    pub fn is_flashing(&self, color: Rgb) -> bool {
        matches!(self, Self::Flash(flash) if flash.primary() == color)
    }

    pub(crate) fn step(&mut self, now: Instant, leds: &mut [Rgb]) -> Step {
        match self {
            Self::None | Self::Solid(_) => Step::Idle,
            Self::Flash(pattern) => pattern.step(now, leds),
            Self::AcceleratingSequence(pattern) => pattern.step(now, leds),
            Self::LampTest(pattern) => pattern.step(now, leds),
        }
    }
}
