//! Build-time configuration
//!
//! Everything here is fixed when the firmware is built. [`PropConfig::validate`]
//! runs once before the control loop starts; a failure means the build is
//! misconfigured and the loop must not start.

use core::fmt;

use embassy_time::Duration;

use crate::color::{BLUE, GREEN, PURPLE, RED, Rgb};
use crate::light::{STRIP_COUNT, StripId};
use crate::scheduler::DEFAULT_TICK_PERIOD;
use crate::tokens::{KnownTokens, READER_COUNT, Uid};

/// Longest crystal lock pulse accepted by validation
pub const MAX_PULSE_DURATION: Duration = Duration::from_millis(100);

/// Electrical level at which a pin is considered active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

/// Digital pin identity with its active level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO number
    pub pin: u8,
    pub active: ActiveLevel,
}

impl PinConfig {
    pub const fn active_high(pin: u8) -> Self {
        Self {
            pin,
            active: ActiveLevel::High,
        }
    }

    pub const fn active_low(pin: u8) -> Self {
        Self {
            pin,
            active: ActiveLevel::Low,
        }
    }
}

/// One LED strip: data pin and pixel count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripConfig {
    pub pin: u8,
    pub length: usize,
}

/// Sensor and lock pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignments {
    /// Laser sensor; asserted while the machine is "powered"
    pub power_sensor: PinConfig,
    /// Beaker door reed switch; asserted while the door is closed
    pub door_sensor: PinConfig,
    /// Beaker door maglock (held)
    pub hold_lock: PinConfig,
    /// Crystal door latch (pulsed)
    pub pulse_lock: PinConfig,
}

/// Timing constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Beaker strip flash half-period
    pub flash_interval: Duration,
    /// Total duration of the solve sequence animation
    pub sequence_duration: Duration,
    /// How long the crystal latch is energized
    pub pulse_duration: Duration,
    /// How long `Solved` lasts before `GameOver`
    pub solve_dwell: Duration,
    /// Control loop cadence
    pub tick_period: Duration,
    /// Time each lamp test color stays on one strip; zero skips the test
    pub lamp_test_step: Duration,
}

/// Colors used for each puzzle signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Beaker flash while the beakers are wrong
    pub incorrect: Rgb,
    /// Beaker flash while the beakers are right but the door is open
    pub correct: Rgb,
    /// Beaker strip while the solve sequence runs
    pub sealed: Rgb,
    pub red_pipe: Rgb,
    pub crystal: Rgb,
    pub blue_pipe: Rgb,
    /// Final color of every strip, indexed by [`StripId::index`]
    pub solved: [Rgb; STRIP_COUNT],
    /// Colors shown in turn by the startup lamp test
    pub lamp_test: [Rgb; 2],
}

/// Complete prop configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropConfig {
    pub pins: PinAssignments,
    /// Strips, indexed by [`StripId::index`]
    pub strips: [StripConfig; STRIP_COUNT],
    pub tokens: KnownTokens,
    pub timings: Timings,
    pub palette: Palette,
}

/// Reasons a configuration is rejected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    EmptyStrip(StripId),
    StripTooLong {
        strip: StripId,
        length: usize,
        max: usize,
    },
    DuplicatePin(u8),
    ResetTokenIsCorrectToken {
        reader: usize,
    },
    ZeroFlashInterval,
    ZeroSequenceDuration,
    ZeroPulseDuration,
    PulseTooLong,
    ZeroDwell,
    DwellShorterThanSequence,
    ZeroTickPeriod,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStrip(strip) => write!(f, "strip {:?} has no pixels", strip),
            Self::StripTooLong { strip, length, max } => {
                write!(f, "strip {:?} has {} pixels, at most {} supported", strip, length, max)
            }
            Self::DuplicatePin(pin) => write!(f, "GPIO {} is assigned twice", pin),
            Self::ResetTokenIsCorrectToken { reader } => {
                write!(f, "reset token equals the correct token of reader {}", reader)
            }
            Self::ZeroFlashInterval => f.write_str("flash interval must be non-zero"),
            Self::ZeroSequenceDuration => f.write_str("sequence duration must be non-zero"),
            Self::ZeroPulseDuration => f.write_str("lock pulse duration must be non-zero"),
            Self::PulseTooLong => write!(
                f,
                "lock pulse must not exceed {} ms",
                MAX_PULSE_DURATION.as_millis()
            ),
            Self::ZeroDwell => f.write_str("solve dwell must be non-zero"),
            Self::DwellShorterThanSequence => {
                f.write_str("solve dwell must outlast the solve sequence")
            }
            Self::ZeroTickPeriod => f.write_str("tick period must be non-zero"),
        }
    }
}

impl PropConfig {
    /// Reference build of the alchemy machine
    pub const DEFAULT: Self = Self {
        pins: PinAssignments {
            power_sensor: PinConfig::active_low(34),
            door_sensor: PinConfig::active_low(14),
            hold_lock: PinConfig::active_high(32),
            pulse_lock: PinConfig::active_high(33),
        },
        strips: [
            StripConfig { pin: 25, length: 27 },
            StripConfig { pin: 26, length: 8 },
            StripConfig { pin: 27, length: 22 },
            StripConfig { pin: 13, length: 8 },
        ],
        tokens: KnownTokens {
            correct: [
                Uid([0x3C, 0x33, 0x13, 0x66, 0x08, 0x01, 0x04, 0xE0]),
                Uid([0x04, 0x3A, 0x13, 0x66, 0x08, 0x01, 0x04, 0xE0]),
            ],
            reset: Uid([0x24, 0x43, 0x13, 0x66, 0x08, 0x01, 0x04, 0xE0]),
        },
        timings: Timings {
            flash_interval: Duration::from_millis(80),
            sequence_duration: Duration::from_millis(5_000),
            pulse_duration: Duration::from_millis(10),
            solve_dwell: Duration::from_millis(1_800_000),
            tick_period: DEFAULT_TICK_PERIOD,
            lamp_test_step: Duration::from_millis(1_000),
        },
        palette: Palette {
            incorrect: RED,
            correct: GREEN,
            sealed: GREEN,
            red_pipe: RED,
            crystal: PURPLE,
            blue_pipe: BLUE,
            solved: [GREEN, GREEN, PURPLE, GREEN],
            lamp_test: [RED, BLUE],
        },
    };

    pub fn strip(&self, strip: StripId) -> StripConfig {
        self.strips[strip.index()]
    }

    /// Check the configuration before the control loop starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        for strip in StripId::ALL {
            if self.strip(strip).length == 0 {
                return Err(ConfigError::EmptyStrip(strip));
            }
        }

        self.check_pins()?;

        for reader in 0..READER_COUNT {
            if self.tokens.correct[reader] == self.tokens.reset {
                return Err(ConfigError::ResetTokenIsCorrectToken { reader });
            }
        }

        let timings = &self.timings;
        if timings.flash_interval.as_millis() == 0 {
            return Err(ConfigError::ZeroFlashInterval);
        }
        if timings.sequence_duration.as_millis() == 0 {
            return Err(ConfigError::ZeroSequenceDuration);
        }
        if timings.pulse_duration.as_millis() == 0 {
            return Err(ConfigError::ZeroPulseDuration);
        }
        if timings.pulse_duration > MAX_PULSE_DURATION {
            return Err(ConfigError::PulseTooLong);
        }
        if timings.solve_dwell.as_millis() == 0 {
            return Err(ConfigError::ZeroDwell);
        }
        if timings.tick_period.as_millis() == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        // the latch opens up to two ticks after the sequence ends
        let unlock_by = timings.sequence_duration + timings.tick_period + timings.tick_period;
        if timings.solve_dwell <= unlock_by {
            return Err(ConfigError::DwellShorterThanSequence);
        }

        Ok(())
    }

    fn check_pins(&self) -> Result<(), ConfigError> {
        let pins = &self.pins;
        let mut used = [0u8; 4 + STRIP_COUNT];
        used[..4].copy_from_slice(&[
            pins.power_sensor.pin,
            pins.door_sensor.pin,
            pins.hold_lock.pin,
            pins.pulse_lock.pin,
        ]);
        for (slot, strip) in used[4..].iter_mut().zip(self.strips.iter()) {
            *slot = strip.pin;
        }

        for (i, pin) in used.iter().enumerate() {
            if used[i + 1..].contains(pin) {
                return Err(ConfigError::DuplicatePin(*pin));
            }
        }
        Ok(())
    }
}

impl Default for PropConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
