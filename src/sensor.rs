//! Digital sensor inputs
//!
//! The laser sensor and the door reed switch are plain level reads. A read
//! error counts as "not asserted", which keeps the puzzle from advancing.

use embedded_hal::digital::InputPin;

use crate::config::ActiveLevel;

/// A digital input with a fixed active level
pub struct DigitalSensor<P> {
    pin: P,
    active: ActiveLevel,
}

impl<P: InputPin> DigitalSensor<P> {
    pub const fn new(pin: P, active: ActiveLevel) -> Self {
        Self { pin, active }
    }

    /// Read the pin and report whether the sensed condition is present
    pub fn is_asserted(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => high == self.active.is_high(),
            Err(err) => {
                log!("[DigitalSensor] read failed: {:?}", err);
                false
            }
        }
    }
}
