use embassy_time::{Duration, Instant};
use heapless::Vec;

use super::pattern::{
    ActivePattern, Direction, FlashPattern, LampTestPattern, SequencePattern, Step,
};
use super::{STRIP_COUNT, StripId};
use crate::OutputDriver;
use crate::color::{BLACK, Rgb};
use crate::config::{ConfigError, StripConfig};

/// One physical strip and the pattern running on it
#[derive(Debug, Clone)]
pub struct LightStrip<const MAX_PIXELS: usize> {
    id: StripId,
    pixels: Vec<Rgb, MAX_PIXELS>,
    pattern: ActivePattern,
    /// When the running pattern advances next, `None` means the next tick
    next_due: Option<Instant>,
    /// Set when a time-bounded pattern ran to completion
    completed: bool,
    /// Pixels changed since the last commit
    dirty: bool,
}

impl<const MAX_PIXELS: usize> LightStrip<MAX_PIXELS> {
    const fn new(id: StripId) -> Self {
        Self {
            id,
            pixels: Vec::new(),
            pattern: ActivePattern::None,
            next_due: None,
            completed: false,
            dirty: true,
        }
    }

    pub const fn id(&self) -> StripId {
        self.id
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub const fn pattern(&self) -> &ActivePattern {
        &self.pattern
    }

    pub const fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    fn start(&mut self, pattern: ActivePattern) {
        self.pattern = pattern;
        self.next_due = None;
        self.completed = false;
    }

    fn fill(&mut self, color: Rgb) {
        if self.pixels.iter().any(|led| *led != color) {
            self.pixels.fill(color);
            self.dirty = true;
        }
    }

    /// Advance the pattern if it is due
    fn advance(&mut self, now: Instant) {
        if self.next_due.is_some_and(|due| now < due) {
            return;
        }

        match self.pattern.step(now, &mut self.pixels) {
            Step::Idle => {
                self.next_due = None;
            }
            Step::Continue(interval) => {
                self.next_due = Some(now + interval);
                self.dirty = true;
            }
            Step::Finished => {
                log!("[LightEngine] {:?} pattern finished", self.id);
                self.pattern = ActivePattern::None;
                self.next_due = None;
                self.completed = true;
                self.dirty = true;
            }
        }
    }
}

/// Light engine - owns and animates all strips
///
/// Pattern calls only record what should be shown. Pixels are recomputed in
/// [`LightEngine::tick`] and pushed to hardware in [`LightEngine::commit`].
#[derive(Debug, Clone)]
pub struct LightEngine<const MAX_PIXELS: usize> {
    strips: [LightStrip<MAX_PIXELS>; STRIP_COUNT],
}

impl<const MAX_PIXELS: usize> LightEngine<MAX_PIXELS> {
    /// Create the engine with every strip dark
    pub fn new(config: &[StripConfig; STRIP_COUNT]) -> Result<Self, ConfigError> {
        let mut strips: [LightStrip<MAX_PIXELS>; STRIP_COUNT] =
            core::array::from_fn(|i| LightStrip::new(StripId::ALL[i]));

        for (strip, strip_config) in strips.iter_mut().zip(config.iter()) {
            if strip_config.length == 0 {
                return Err(ConfigError::EmptyStrip(strip.id));
            }
            strip
                .pixels
                .resize(strip_config.length, BLACK)
                .map_err(|()| ConfigError::StripTooLong {
                    strip: strip.id,
                    length: strip_config.length,
                    max: MAX_PIXELS,
                })?;
        }

        Ok(Self { strips })
    }

    pub fn strip(&self, strip: StripId) -> &LightStrip<MAX_PIXELS> {
        &self.strips[strip.index()]
    }

    fn strip_mut(&mut self, strip: StripId) -> &mut LightStrip<MAX_PIXELS> {
        &mut self.strips[strip.index()]
    }

    pub fn pattern(&self, strip: StripId) -> &ActivePattern {
        &self.strip(strip).pattern
    }

    pub fn pixels(&self, strip: StripId) -> &[Rgb] {
        &self.strip(strip).pixels
    }

    /// Fill a strip immediately, replacing any running pattern
    ///
    /// Black turns the strip off and leaves no pattern behind.
    pub fn set_solid(&mut self, strip: StripId, color: Rgb) {
        let strip = self.strip_mut(strip);
        strip.start(if color == BLACK {
            ActivePattern::None
        } else {
            ActivePattern::Solid(color)
        });
        strip.fill(color);
    }

    /// Alternate between two colors until replaced
    pub fn start_flash(
        &mut self,
        strip: StripId,
        primary: Rgb,
        secondary: Rgb,
        interval: Duration,
        direction: Direction,
    ) {
        self.strip_mut(strip).start(ActivePattern::Flash(FlashPattern::new(
            primary, secondary, interval, direction,
        )));
    }

    /// Run an accelerating segment for `total`, then finish
    pub fn start_accelerating_sequence(
        &mut self,
        strip: StripId,
        color: Rgb,
        direction: Direction,
        total: Duration,
    ) {
        self.strip_mut(strip)
            .start(ActivePattern::AcceleratingSequence(SequencePattern::new(
                color, direction, total,
            )));
    }

    /// Light every strip in turn, `colors[0]` then `colors[1]`, one `step` each
    ///
    /// Strips already tested keep the second color until the last one is
    /// done, then all of them go dark and report complete together.
    pub fn start_lamp_test(&mut self, colors: [Rgb; 2], step: Duration) {
        let slot = step + step;
        let total = StripId::ALL.iter().fold(Duration::from_ticks(0), |total, _| total + slot);

        let mut delay = Duration::from_ticks(0);
        for strip in StripId::ALL {
            self.strip_mut(strip)
                .start(ActivePattern::LampTest(LampTestPattern::new(
                    colors, delay, step, total,
                )));
            delay += slot;
        }
    }

    /// Stop the running pattern, keeping the last rendered pixels
    pub fn stop(&mut self, strip: StripId) {
        let strip = self.strip_mut(strip);
        strip.pattern = ActivePattern::None;
        strip.next_due = None;
    }

    /// Stop every pattern and turn every strip off
    pub fn extinguish_all(&mut self) {
        for strip in StripId::ALL {
            self.stop(strip);
            self.set_solid(strip, BLACK);
        }
    }

    /// Check if a time-bounded pattern on the strip has finished
    pub fn is_complete(&self, strip: StripId) -> bool {
        self.strip(strip).completed
    }

    /// Advance every strip whose pattern is due
    pub fn tick(&mut self, now: Instant) {
        for strip in &mut self.strips {
            strip.advance(now);
        }
    }

    /// Write every strip that changed since the last commit
    pub fn commit<O: OutputDriver>(&mut self, output: &mut O) {
        for strip in self.strips.iter_mut().filter(|strip| strip.dirty) {
            output.write(strip.id, &strip.pixels);
            strip.dirty = false;
        }
    }
}
