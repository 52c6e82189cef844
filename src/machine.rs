//! Puzzle state machine
//!
//! The transition function is pure: it looks at one [`TickInputs`] snapshot
//! and returns a [`Decision`]. Carrying out the decision (pins, lights) is
//! the controller's job, so every rule here can be tested without hardware.

use embassy_time::{Duration, Instant};

use crate::tokens::Classification;

/// Puzzle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PuzzleState {
    /// Cold start or reset in progress
    Initializing,
    /// No laser on the sensor
    Unpowered,
    /// Laser present, waiting for the beakers and the door
    Powered,
    /// Puzzle solved, final lights shown
    Solved,
    /// Solved long enough ago that the prop went dark
    GameOver,
}

impl PuzzleState {
    /// Check if the token readers are polled in this state
    pub const fn polls_tokens(self) -> bool {
        matches!(self, Self::Powered | Self::Solved | Self::GameOver)
    }

    /// Check if the beaker lock may be held in this state
    pub const fn hold_allowed(self) -> bool {
        matches!(self, Self::Powered | Self::Solved)
    }
}

/// Everything the state machine looks at in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInputs {
    pub now: Instant,
    /// Laser sensor asserted
    pub power: bool,
    /// Door sensor asserted
    pub door_closed: bool,
    /// Token classification, `None` when the readers were not polled
    pub tokens: Option<Classification>,
    /// Every solve sequence strip has finished its animation
    pub sequence_complete: bool,
    /// The startup lamp test has finished on every strip
    pub lamp_test_complete: bool,
}

/// Light change requested by a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightDirective {
    /// Leave every strip as it is
    Keep,
    /// Run the startup lamp test on every strip
    StartLampTest,
    /// Stop all patterns and turn all strips off
    ExtinguishAll,
    /// Flash the beaker strip in the "wrong beakers" color
    FlashIncorrect,
    /// Flash the beaker strip in the "right beakers" color
    FlashCorrect,
    /// Start the solve animation on the pipe and crystal strips
    StartSolveSequence,
    /// Show the final solved colors on every strip
    ShowSolved,
}

/// What the controller must do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub next: PuzzleState,
    /// New beaker lock level, `None` keeps the current one
    pub hold_lock: Option<bool>,
    /// Pulse the crystal latch once
    pub pulse_crystal: bool,
    pub lights: LightDirective,
}

impl Decision {
    const fn stay(state: PuzzleState, lights: LightDirective) -> Self {
        Self {
            next: state,
            hold_lock: None,
            pulse_crystal: false,
            lights,
        }
    }

    /// Turn everything off and release the beaker lock
    const fn shut_down(next: PuzzleState) -> Self {
        Self {
            next,
            hold_lock: Some(false),
            pulse_crystal: false,
            lights: LightDirective::ExtinguishAll,
        }
    }
}

/// Progress of the startup lamp test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LampTest {
    Skipped,
    Pending,
    Running,
}

/// Owns the puzzle state and decides every transition
#[derive(Debug, Clone)]
pub struct PuzzleStateMachine {
    state: PuzzleState,
    dwell: Duration,
    solved_at: Option<Instant>,
    /// Solve animation finished and the crystal latch was released
    unlocked: bool,
    /// A reset happened and the reset tag has not been seen leaving yet
    reset_pending: bool,
    lamp_test: LampTest,
}

impl PuzzleStateMachine {
    /// Create a state machine that leaves `Initializing` on the first tick
    pub const fn new(dwell: Duration) -> Self {
        Self {
            state: PuzzleState::Initializing,
            dwell,
            solved_at: None,
            unlocked: false,
            reset_pending: false,
            lamp_test: LampTest::Skipped,
        }
    }

    /// Hold `Initializing` until the startup lamp test reports completion
    pub const fn with_lamp_test(mut self) -> Self {
        self.lamp_test = LampTest::Pending;
        self
    }

    pub const fn state(&self) -> PuzzleState {
        self.state
    }

    /// When the puzzle was solved, while in `Solved`
    pub const fn solved_at(&self) -> Option<Instant> {
        self.solved_at
    }

    /// Check if the solve animation has finished and the crystal door opened
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Check if a reset is waiting for the reset tag to be removed
    pub const fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Check if the token readers must be polled before the next step
    ///
    /// While a reset is pending the readers are polled in every state, so
    /// the tag leaving the reader is noticed even in `Unpowered`.
    pub const fn polls_tokens(&self) -> bool {
        self.state.polls_tokens() || self.reset_pending
    }

    /// Evaluate one tick and move to the next state
    pub fn step(&mut self, inputs: &TickInputs) -> Decision {
        use LightDirective::{ExtinguishAll, FlashCorrect, FlashIncorrect, StartSolveSequence};
        use PuzzleState::{GameOver, Initializing, Powered, Solved, Unpowered};

        match inputs.tokens {
            // the tag is still on the reader: stay reset, no second pulse
            Some(Classification::ResetRequested) if self.reset_pending => {
                self.state = Unpowered;
                return Decision::shut_down(Unpowered);
            }
            Some(Classification::ResetRequested) => return self.reset(),
            Some(_) => self.reset_pending = false,
            None => {}
        }

        let decision = match self.state {
            Initializing => self.step_initializing(inputs),
            Unpowered if inputs.power && !self.reset_pending => Decision::shut_down(Powered),
            Unpowered => Decision::shut_down(Unpowered),
            Powered if !inputs.power => Decision::shut_down(Unpowered),
            Powered => match inputs.tokens.unwrap_or(Classification::Incorrect) {
                Classification::AllCorrect if inputs.door_closed => {
                    self.enter_solved(inputs.now);
                    Decision {
                        next: Solved,
                        hold_lock: Some(true),
                        pulse_crystal: false,
                        lights: StartSolveSequence,
                    }
                }
                Classification::AllCorrect => Decision {
                    next: Powered,
                    hold_lock: Some(true),
                    pulse_crystal: false,
                    lights: FlashCorrect,
                },
                _ => Decision {
                    next: Powered,
                    hold_lock: Some(false),
                    pulse_crystal: false,
                    lights: FlashIncorrect,
                },
            },
            Solved => self.step_solved(inputs),
            GameOver => Decision::stay(GameOver, ExtinguishAll),
        };

        self.state = decision.next;
        decision
    }

    fn step_initializing(&mut self, inputs: &TickInputs) -> Decision {
        match self.lamp_test {
            LampTest::Pending => {
                self.lamp_test = LampTest::Running;
                Decision {
                    next: PuzzleState::Initializing,
                    hold_lock: Some(false),
                    pulse_crystal: false,
                    lights: LightDirective::StartLampTest,
                }
            }
            LampTest::Running if !inputs.lamp_test_complete => {
                Decision::stay(PuzzleState::Initializing, LightDirective::Keep)
            }
            _ => {
                self.lamp_test = LampTest::Skipped;
                Decision::shut_down(PuzzleState::Unpowered)
            }
        }
    }

    fn step_solved(&mut self, inputs: &TickInputs) -> Decision {
        let solved_at = *self.solved_at.get_or_insert(inputs.now);
        if inputs.now.saturating_duration_since(solved_at) >= self.dwell {
            log!("[PuzzleStateMachine] solve dwell elapsed, game over");
            self.solved_at = None;
            return Decision::shut_down(PuzzleState::GameOver);
        }

        if self.unlocked {
            return Decision::stay(PuzzleState::Solved, LightDirective::ShowSolved);
        }
        if !inputs.sequence_complete {
            return Decision::stay(PuzzleState::Solved, LightDirective::Keep);
        }

        self.unlocked = true;
        Decision {
            next: PuzzleState::Solved,
            hold_lock: None,
            pulse_crystal: true,
            lights: LightDirective::ShowSolved,
        }
    }

    fn enter_solved(&mut self, now: Instant) {
        self.solved_at = Some(now);
        self.unlocked = false;
    }

    /// Reset from any state
    ///
    /// Releases the beaker lock, opens the crystal latch and turns every
    /// strip off. The machine then stays in `Unpowered` until the readers
    /// report something other than the reset tag.
    pub fn reset(&mut self) -> Decision {
        self.state = PuzzleState::Unpowered;
        self.solved_at = None;
        self.unlocked = false;
        self.reset_pending = true;
        self.lamp_test = LampTest::Skipped;
        Decision {
            next: PuzzleState::Unpowered,
            hold_lock: Some(false),
            pulse_crystal: true,
            lights: LightDirective::ExtinguishAll,
        }
    }

    /// Jump straight to the solve sequence, ignoring the sensors
    ///
    /// Returns `None` when already solved.
    pub fn force_solve(&mut self, now: Instant) -> Option<Decision> {
        if self.state == PuzzleState::Solved {
            return None;
        }
        self.enter_solved(now);
        self.reset_pending = false;
        self.lamp_test = LampTest::Skipped;
        self.state = PuzzleState::Solved;
        Some(Decision::stay(
            PuzzleState::Solved,
            LightDirective::StartSolveSequence,
        ))
    }
}
