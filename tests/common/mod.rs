#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use alchemy_prop::link::Payload;
use alchemy_prop::tokens::Uid;
use alchemy_prop::{
    CommandLink, Duration, Instant, OutputDriver, PropConfig, PropController, PropPeripherals, Rgb,
    StripId, TokenReader,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};

pub const CORRECT: [Uid; 2] = PropConfig::DEFAULT.tokens.correct;
pub const RESET: Uid = PropConfig::DEFAULT.tokens.reset;
pub const STRANGER: Uid = Uid([0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22, 0x33]);

pub const MAX_PIXELS: usize = 32;
pub const QUEUE_SIZE: usize = 4;

pub type TestController<'a> =
    PropController<'a, MockInput, MockReader, MockOutput, MockDelay, MAX_PIXELS, QUEUE_SIZE>;

/// Reference configuration with the startup lamp test skipped
pub fn quick_config() -> PropConfig {
    let mut config = PropConfig::DEFAULT;
    config.timings.lamp_test_step = Duration::from_millis(0);
    config
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPinError;

impl digital::Error for MockPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Input pin whose level is set by the test
#[derive(Debug, Clone, Default)]
pub struct MockInput {
    level: Rc<Cell<bool>>,
    fail: Rc<Cell<bool>>,
}

impl MockInput {
    pub fn new(level: bool) -> Self {
        let pin = Self::default();
        pin.set_level(level);
        pin
    }

    pub fn set_level(&self, high: bool) {
        self.level.set(high);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl ErrorType for MockInput {
    type Error = MockPinError;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.fail.get() {
            return Err(MockPinError);
        }
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Output pin that records every level written to it
#[derive(Debug, Clone, Default)]
pub struct MockOutput {
    history: Rc<RefCell<Vec<bool>>>,
    fail: Rc<Cell<bool>>,
}

impl MockOutput {
    pub fn history(&self) -> Vec<bool> {
        self.history.borrow().clone()
    }

    /// Last written level, `None` if never written
    pub fn level(&self) -> Option<bool> {
        self.history.borrow().last().copied()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.set(fail);
    }

    fn record(&self, high: bool) -> Result<(), MockPinError> {
        if self.fail.get() {
            return Err(MockPinError);
        }
        self.history.borrow_mut().push(high);
        Ok(())
    }
}

impl ErrorType for MockOutput {
    type Error = MockPinError;
}

impl OutputPin for MockOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true)
    }
}

/// Delay that returns immediately and remembers how long it was asked to wait
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    total_ns: Rc<Cell<u64>>,
    probe: Option<MockOutput>,
    observed: Rc<RefCell<Vec<Option<bool>>>>,
}

impl MockDelay {
    /// Record the level of `pin` every time the delay runs
    pub fn with_probe(pin: &MockOutput) -> Self {
        Self {
            probe: Some(pin.clone()),
            ..Self::default()
        }
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }

    pub fn observed(&self) -> Vec<Option<bool>> {
        self.observed.borrow().clone()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
        if let Some(probe) = &self.probe {
            self.observed.borrow_mut().push(probe.level());
        }
    }
}

/// Token reader showing whatever tag the test placed on it
#[derive(Debug, Clone, Default)]
pub struct MockReader {
    tag: Rc<Cell<Option<Uid>>>,
}

impl MockReader {
    pub fn place(&self, tag: Option<Uid>) {
        self.tag.set(tag);
    }
}

impl TokenReader for MockReader {
    fn poll(&mut self) -> Option<Uid> {
        self.tag.get()
    }
}

/// Output driver recording every strip write
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    writes: Rc<RefCell<Vec<(StripId, Vec<Rgb>)>>>,
}

impl RecordingOutput {
    pub fn writes(&self) -> Vec<(StripId, Vec<Rgb>)> {
        self.writes.borrow().clone()
    }

    pub fn writes_to(&self, strip: StripId) -> usize {
        self.writes.borrow().iter().filter(|(id, _)| *id == strip).count()
    }

    pub fn clear(&self) {
        self.writes.borrow_mut().clear();
    }
}

impl OutputDriver for RecordingOutput {
    fn write(&mut self, strip: StripId, colors: &[Rgb]) {
        self.writes.borrow_mut().push((strip, colors.to_vec()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLinkError;

/// Remote link whose broker is simulated by the test
#[derive(Debug, Clone, Default)]
pub struct MockLink {
    connected: Rc<Cell<bool>>,
    accept: Rc<Cell<bool>>,
    attempts: Rc<Cell<u32>>,
    published: Rc<RefCell<Vec<String>>>,
    inbox: Rc<RefCell<VecDeque<Payload>>>,
}

impl MockLink {
    pub fn accepting() -> Self {
        let link = Self::default();
        link.set_accepting(true);
        link
    }

    pub fn set_accepting(&self, accept: bool) {
        self.accept.set(accept);
    }

    pub fn drop_connection(&self) {
        self.connected.set(false);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }

    pub fn published(&self) -> Vec<String> {
        self.published.borrow().clone()
    }

    pub fn deliver(&self, payload: &[u8]) {
        let payload = Payload::from_slice(payload).expect("payload too long");
        self.inbox.borrow_mut().push_back(payload);
    }
}

impl CommandLink for MockLink {
    type Error = MockLinkError;

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        self.attempts.set(self.attempts.get() + 1);
        if self.accept.get() {
            self.connected.set(true);
            Ok(())
        } else {
            Err(MockLinkError)
        }
    }

    fn publish(&mut self, message: &str) -> Result<(), Self::Error> {
        if !self.connected.get() {
            return Err(MockLinkError);
        }
        self.published.borrow_mut().push(message.to_string());
        Ok(())
    }

    fn receive(&mut self) -> Option<Payload> {
        self.inbox.borrow_mut().pop_front()
    }
}

/// Simulated prop hardware, wired for the reference pin levels
///
/// Power and door sensors are active-low, both locks active-high.
#[derive(Debug, Clone)]
pub struct Rig {
    pub power: MockInput,
    pub door: MockInput,
    pub readers: [MockReader; 2],
    pub hold: MockOutput,
    pub pulse: MockOutput,
    pub delay: MockDelay,
}

impl Rig {
    /// No laser, door open, no tags
    pub fn new() -> Self {
        let pulse = MockOutput::default();
        Self {
            power: MockInput::new(true),
            door: MockInput::new(true),
            readers: [MockReader::default(), MockReader::default()],
            hold: MockOutput::default(),
            delay: MockDelay::with_probe(&pulse),
            pulse,
        }
    }

    pub fn peripherals(&self) -> PropPeripherals<MockInput, MockReader, MockOutput, MockDelay> {
        PropPeripherals {
            power_sensor: self.power.clone(),
            door_sensor: self.door.clone(),
            readers: self.readers.clone(),
            hold_lock: self.hold.clone(),
            pulse_lock: self.pulse.clone(),
            delay: self.delay.clone(),
        }
    }

    pub fn set_power(&self, present: bool) {
        self.power.set_level(!present);
    }

    pub fn set_door_closed(&self, closed: bool) {
        self.door.set_level(!closed);
    }

    pub fn place(&self, reader: usize, tag: Option<Uid>) {
        self.readers[reader].place(tag);
    }

    pub fn place_correct(&self) {
        self.place(0, Some(CORRECT[0]));
        self.place(1, Some(CORRECT[1]));
    }
}

pub fn at(millis: u64) -> Instant {
    Instant::from_millis(millis)
}
