//! Tick scheduling
//!
//! Portable loop pacing without async/await or platform timers. The caller
//! owns the clock and does the sleeping; the scheduler runs one pass of the
//! control loop and says how long to wait before the next one.

use embassy_time::{Duration, Instant};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::OutputDriver;
use crate::command::CommandSender;
use crate::config::Timings;
use crate::controller::PropController;
use crate::link::{CommandLink, LinkSupervisor};
use crate::tokens::TokenReader;

/// Default control loop cadence
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(50);

/// Result of one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickResult {
    /// When the next tick is due
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero when behind schedule)
    pub sleep_duration: Duration,
}

/// Fixed-cadence driver for the control loop
///
/// Each tick runs, in order: the controller tick, the frame commit to the
/// output driver and one pass of the link supervisor.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = TickScheduler::new(output, link, channel.sender());
///
/// loop {
///     let result = scheduler.tick(&mut controller, Instant::now());
///     delay.delay_ms(result.sleep_duration.as_millis() as u32);
/// }
/// ```
pub struct TickScheduler<'a, O, K, const QUEUE_SIZE: usize> {
    output: O,
    link: K,
    supervisor: LinkSupervisor<'a, QUEUE_SIZE>,
    next_tick: Option<Instant>,
    period: Duration,
}

impl<'a, O, K, const QUEUE_SIZE: usize> TickScheduler<'a, O, K, QUEUE_SIZE>
where
    O: OutputDriver,
    K: CommandLink,
{
    /// Create a scheduler running at [`DEFAULT_TICK_PERIOD`]
    pub fn new(output: O, link: K, commands: CommandSender<'a, QUEUE_SIZE>) -> Self {
        Self::with_supervisor(output, link, LinkSupervisor::new(commands), DEFAULT_TICK_PERIOD)
    }

    /// Create a scheduler running at the configured tick period
    pub fn from_timings(
        output: O,
        link: K,
        commands: CommandSender<'a, QUEUE_SIZE>,
        timings: &Timings,
    ) -> Self {
        Self::with_supervisor(output, link, LinkSupervisor::new(commands), timings.tick_period)
    }

    /// Create a scheduler with a custom supervisor and period
    pub fn with_supervisor(
        output: O,
        link: K,
        supervisor: LinkSupervisor<'a, QUEUE_SIZE>,
        period: Duration,
    ) -> Self {
        Self {
            output,
            link,
            supervisor,
            next_tick: None,
            period,
        }
    }

    /// Run one pass of the control loop and return timing information
    ///
    /// If the caller has fallen more than two periods behind, the backlog is
    /// skipped instead of caught up.
    pub fn tick<S, R, L, D, const MAX_PIXELS: usize>(
        &mut self,
        controller: &mut PropController<'a, S, R, L, D, MAX_PIXELS, QUEUE_SIZE>,
        now: Instant,
    ) -> TickResult
    where
        S: InputPin,
        R: TokenReader,
        L: OutputPin,
        D: DelayNs,
    {
        let max_drift = self.period * 2;
        let scheduled = match self.next_tick {
            Some(due) if now <= due + max_drift => due,
            _ => now,
        };

        controller.tick(now);
        controller.commit(&mut self.output);
        self.supervisor.service(&mut self.link, now);

        let next_deadline = scheduled + self.period;
        self.next_tick = Some(next_deadline);

        TickResult {
            next_deadline,
            sleep_duration: next_deadline.saturating_duration_since(now),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn link(&self) -> &K {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut K {
        &mut self.link
    }

    pub fn supervisor(&self) -> &LinkSupervisor<'a, QUEUE_SIZE> {
        &self.supervisor
    }
}
