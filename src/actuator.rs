//! Door lock drivers
//!
//! The beaker door has a maglock that is held for as long as it should stay
//! locked. The crystal door has a latch that releases on a short pulse and
//! must never stay energized: holding it burns out the solenoid.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{ActiveLevel, PinAssignments, Timings};

/// Drive a pin to its energized or released level
fn drive<P: OutputPin>(pin: &mut P, active: ActiveLevel, energized: bool) -> Result<(), P::Error> {
    if energized == active.is_high() {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

/// Energized pin that is released when dropped
struct Energized<'a, P: OutputPin> {
    pin: &'a mut P,
    active: ActiveLevel,
}

impl<'a, P: OutputPin> Energized<'a, P> {
    fn acquire(pin: &'a mut P, active: ActiveLevel) -> Result<Self, P::Error> {
        if let Err(err) = drive(pin, active, true) {
            let _ = drive(pin, active, false);
            return Err(err);
        }
        Ok(Self { pin, active })
    }
}

impl<P: OutputPin> Drop for Energized<'_, P> {
    fn drop(&mut self) {
        if let Err(err) = drive(&mut *self.pin, self.active, false) {
            log!("[ActuatorController] failed to release pulse lock: {:?}", err);
        }
    }
}

/// Controls the two door locks
pub struct ActuatorController<L, D> {
    hold: L,
    hold_active: ActiveLevel,
    pulse: L,
    pulse_active: ActiveLevel,
    delay: D,
    pulse_duration: Duration,
    holding: bool,
    pulses: u32,
}

impl<L: OutputPin, D: DelayNs> ActuatorController<L, D> {
    /// Create the controller and drive both locks to their released level
    pub fn new(hold: L, pulse: L, delay: D, pins: &PinAssignments, timings: &Timings) -> Self {
        let mut controller = Self {
            hold,
            hold_active: pins.hold_lock.active,
            pulse,
            pulse_active: pins.pulse_lock.active,
            delay,
            pulse_duration: timings.pulse_duration,
            holding: true,
            pulses: 0,
        };
        controller.set_hold_lock(false);
        if let Err(err) = drive(&mut controller.pulse, controller.pulse_active, false) {
            log!("[ActuatorController] failed to release pulse lock: {:?}", err);
        }
        controller
    }

    /// Engage or release the beaker maglock
    ///
    /// Safe to call every tick; the pin is only written on change. A failed
    /// write is retried on the next call.
    pub fn set_hold_lock(&mut self, locked: bool) {
        if locked == self.holding {
            return;
        }
        match drive(&mut self.hold, self.hold_active, locked) {
            Ok(()) => {
                log!(
                    "[ActuatorController] beaker door {}",
                    if locked { "locked" } else { "unlocked" }
                );
                self.holding = locked;
            }
            Err(err) => log!("[ActuatorController] beaker lock write failed: {:?}", err),
        }
    }

    /// Release the crystal latch with one short pulse
    ///
    /// Blocks for the configured pulse duration only. The latch is released
    /// before this returns on every path.
    pub fn pulse_crystal_lock(&mut self) {
        let millis = u32::try_from(self.pulse_duration.as_millis()).unwrap_or(u32::MAX);
        match Energized::acquire(&mut self.pulse, self.pulse_active) {
            Ok(_energized) => {
                self.delay.delay_ms(millis);
                self.pulses = self.pulses.wrapping_add(1);
                log!("[ActuatorController] crystal latch pulsed");
            }
            Err(err) => log!("[ActuatorController] crystal latch pulse failed: {:?}", err),
        }
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Number of completed crystal latch pulses since startup
    pub fn pulse_count(&self) -> u32 {
        self.pulses
    }
}
