//! Light strip animation
//!
//! Four strips, each with its own pattern and its own due time. The engine
//! advances all of them from one `tick` call per control loop pass.

mod engine;
pub mod pattern;

pub use engine::{LightEngine, LightStrip};
pub use pattern::{
    ActivePattern, Direction, FlashPattern, LampTestPattern, PatternKind, SequencePattern,
};

/// Number of light strips on the prop
pub const STRIP_COUNT: usize = 4;

/// Physical light strips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StripId {
    /// Behind the beaker shelf
    Beaker,
    /// Left pipe
    RedPipe,
    /// Crystal compartment
    Crystal,
    /// Right pipe
    BluePipe,
}

impl StripId {
    pub const ALL: [Self; STRIP_COUNT] = [Self::Beaker, Self::RedPipe, Self::Crystal, Self::BluePipe];

    /// Strips animated by the solve sequence
    pub const SEQUENCE: [Self; 3] = [Self::RedPipe, Self::Crystal, Self::BluePipe];

    pub const fn index(self) -> usize {
        match self {
            Self::Beaker => 0,
            Self::RedPipe => 1,
            Self::Crystal => 2,
            Self::BluePipe => 3,
        }
    }
}
