#![no_std]

#[macro_use]
mod logging;

pub mod actuator;
pub mod color;
pub mod command;
pub mod config;
pub mod controller;
pub mod light;
pub mod link;
pub mod machine;
pub mod math8;
pub mod output;
pub mod scheduler;
pub mod sensor;
pub mod tokens;

pub use actuator::ActuatorController;
pub use command::{CommandChannel, CommandReceiver, CommandSender, RemoteCommand};
pub use config::{ActiveLevel, ConfigError, PinConfig, PropConfig, StripConfig, Timings};
pub use controller::{PropController, PropPeripherals};
pub use light::{ActivePattern, Direction, LightEngine, PatternKind, STRIP_COUNT, StripId};
pub use link::{CommandLink, LinkSupervisor};
pub use machine::{Decision, LightDirective, PuzzleState, PuzzleStateMachine, TickInputs};
pub use output::SmartLedsOutput;
pub use scheduler::{TickResult, TickScheduler};
pub use sensor::DigitalSensor;
pub use tokens::{Classification, KnownTokens, READER_COUNT, TokenMatcher, TokenReader, Uid};

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};

/// Abstract LED strip output
///
/// Implement this trait to push committed frames to the physical strips.
/// The light engine only calls it for strips whose pixels changed.
pub trait OutputDriver {
    /// Write colors to one LED strip
    fn write(&mut self, strip: StripId, colors: &[Rgb]);
}
