//! Prop controller
//!
//! The single context that owns every piece of puzzle state: the state
//! machine, the token matcher, the light engine, the locks and the sensors.
//! The main loop owns one controller and calls [`PropController::tick`]
//! followed by [`PropController::commit`] once per pass.

use embassy_time::Instant;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::OutputDriver;
use crate::color::{BLACK, Rgb};
use crate::actuator::ActuatorController;
use crate::command::{CommandReceiver, RemoteCommand};
use crate::config::{ConfigError, Palette, PropConfig, Timings};
use crate::light::{Direction, LightEngine, StripId};
use crate::machine::{Decision, LightDirective, PuzzleState, PuzzleStateMachine, TickInputs};
use crate::sensor::DigitalSensor;
use crate::tokens::{READER_COUNT, TokenMatcher, TokenReader};

/// Hardware handed to the controller at startup
pub struct PropPeripherals<S, R, L, D> {
    pub power_sensor: S,
    pub door_sensor: S,
    pub readers: [R; READER_COUNT],
    pub hold_lock: L,
    pub pulse_lock: L,
    /// Used to time the crystal latch pulse
    pub delay: D,
}

/// Prop controller - the main orchestrator
pub struct PropController<'a, S, R, L, D, const MAX_PIXELS: usize, const QUEUE_SIZE: usize> {
    machine: PuzzleStateMachine,
    matcher: TokenMatcher,
    lights: LightEngine<MAX_PIXELS>,
    actuators: ActuatorController<L, D>,
    power: DigitalSensor<S>,
    door: DigitalSensor<S>,
    readers: [R; READER_COUNT],
    commands: CommandReceiver<'a, QUEUE_SIZE>,
    timings: Timings,
    palette: Palette,
}

impl<'a, S, R, L, D, const MAX_PIXELS: usize, const QUEUE_SIZE: usize>
    PropController<'a, S, R, L, D, MAX_PIXELS, QUEUE_SIZE>
where
    S: InputPin,
    R: TokenReader,
    L: OutputPin,
    D: DelayNs,
{
    /// Validate the configuration and take ownership of the hardware
    ///
    /// Both locks are released before this returns. The controller starts
    /// in `Initializing` and runs the lamp test there unless
    /// `lamp_test_step` is zero.
    pub fn new(
        config: &PropConfig,
        peripherals: PropPeripherals<S, R, L, D>,
        commands: CommandReceiver<'a, QUEUE_SIZE>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let lights = LightEngine::new(&config.strips)?;

        let PropPeripherals {
            power_sensor,
            door_sensor,
            readers,
            hold_lock,
            pulse_lock,
            delay,
        } = peripherals;

        let mut machine = PuzzleStateMachine::new(config.timings.solve_dwell);
        if config.timings.lamp_test_step.as_millis() > 0 {
            machine = machine.with_lamp_test();
        }

        Ok(Self {
            machine,
            matcher: TokenMatcher::new(config.tokens),
            lights,
            actuators: ActuatorController::new(
                hold_lock,
                pulse_lock,
                delay,
                &config.pins,
                &config.timings,
            ),
            power: DigitalSensor::new(power_sensor, config.pins.power_sensor.active),
            door: DigitalSensor::new(door_sensor, config.pins.door_sensor.active),
            readers,
            commands,
            timings: config.timings,
            palette: config.palette,
        })
    }

    pub fn state(&self) -> PuzzleState {
        self.machine.state()
    }

    pub fn machine(&self) -> &PuzzleStateMachine {
        &self.machine
    }

    pub fn matcher(&self) -> &TokenMatcher {
        &self.matcher
    }

    pub fn lights(&self) -> &LightEngine<MAX_PIXELS> {
        &self.lights
    }

    pub fn actuators(&self) -> &ActuatorController<L, D> {
        &self.actuators
    }

    /// Run one control tick
    ///
    /// Reads the sensors, applies queued remote commands, evaluates the
    /// state machine, drives the locks and advances the light patterns.
    /// Nothing is written to the strips until [`Self::commit`].
    pub fn tick(&mut self, now: Instant) {
        let previous = self.machine.state();
        let power = self.power.is_asserted();
        let door_closed = self.door.is_asserted();

        if !self.apply_commands(now) {
            let tokens = self
                .machine
                .polls_tokens()
                .then(|| self.matcher.poll(&mut self.readers));
            let inputs = TickInputs {
                now,
                power,
                door_closed,
                tokens,
                sequence_complete: self.sequence_complete(),
                lamp_test_complete: self.lamp_test_complete(),
            };
            let decision = self.machine.step(&inputs);
            self.execute(decision);
        }

        let state = self.machine.state();
        if state != previous {
            log!("[PropController] {:?} -> {:?}", previous, state);
        }

        self.lights.tick(now);
    }

    /// Push changed strips to the output driver
    pub fn commit<O: OutputDriver>(&mut self, output: &mut O) {
        self.lights.commit(output);
    }

    /// Apply every queued remote command in arrival order
    ///
    /// Returns true if at least one command took effect.
    fn apply_commands(&mut self, now: Instant) -> bool {
        let mut applied = false;
        while let Some(command) = self.commands.try_receive() {
            let decision = match command {
                RemoteCommand::Reset => Some(self.machine.reset()),
                RemoteCommand::Solve => self.machine.force_solve(now),
            };
            match decision {
                Some(decision) => {
                    log!("[PropController] remote {}", command.as_str());
                    self.execute(decision);
                    applied = true;
                }
                None => log!("[PropController] remote {} ignored", command.as_str()),
            }
        }
        applied
    }

    fn sequence_complete(&self) -> bool {
        StripId::SEQUENCE
            .iter()
            .all(|strip| self.lights.is_complete(*strip))
    }

    fn lamp_test_complete(&self) -> bool {
        StripId::ALL
            .iter()
            .all(|strip| self.lights.is_complete(*strip))
    }

    /// Carry out a decision: locks first, then lights
    fn execute(&mut self, decision: Decision) {
        let requested = decision.hold_lock.unwrap_or(self.actuators.is_holding());
        let locked = requested && decision.next.hold_allowed();
        if requested && !locked {
            log!("[PropController] beaker lock refused in {:?}", decision.next);
        }
        self.actuators.set_hold_lock(locked);
        if decision.pulse_crystal {
            self.actuators.pulse_crystal_lock();
        }

        match decision.lights {
            LightDirective::Keep => {}
            LightDirective::StartLampTest => self
                .lights
                .start_lamp_test(self.palette.lamp_test, self.timings.lamp_test_step),
            LightDirective::ExtinguishAll => self.lights.extinguish_all(),
            LightDirective::FlashIncorrect => self.flash_beaker(self.palette.incorrect),
            LightDirective::FlashCorrect => self.flash_beaker(self.palette.correct),
            LightDirective::StartSolveSequence => self.start_solve_sequence(),
            LightDirective::ShowSolved => {
                for strip in StripId::ALL {
                    self.lights
                        .set_solid(strip, self.palette.solved[strip.index()]);
                }
            }
        }
    }

    /// Start the beaker flash unless it is already running in that color
    fn flash_beaker(&mut self, color: Rgb) {
        if self.lights.pattern(StripId::Beaker).is_flashing(color) {
            return;
        }
        self.lights.start_flash(
            StripId::Beaker,
            color,
            BLACK,
            self.timings.flash_interval,
            Direction::Forward,
        );
    }

    fn start_solve_sequence(&mut self) {
        log!("[PropController] puzzle solved, starting sequence");
        self.lights.set_solid(StripId::Beaker, self.palette.sealed);

        let duration = self.timings.sequence_duration;
        let sequences = [
            (StripId::RedPipe, self.palette.red_pipe, Direction::Forward),
            (StripId::Crystal, self.palette.crystal, Direction::Forward),
            (StripId::BluePipe, self.palette.blue_pipe, Direction::Reverse),
        ];
        for (strip, color, direction) in sequences {
            self.lights
                .start_accelerating_sequence(strip, color, direction, duration);
        }
    }
}
