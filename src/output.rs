//! `smart-leds` output adapter
//!
//! Routes committed frames to one `SmartLedsWrite` driver per strip.
//! Write errors are logged and dropped; the next change is written again.

use core::fmt::Debug;

use smart_leds::{SmartLedsWrite, gamma};

use crate::color::Rgb;
use crate::{OutputDriver, StripId};

/// Four `smart-leds` drivers, one per strip
pub struct SmartLedsOutput<A, B, C, E> {
    beaker: A,
    red_pipe: B,
    crystal: C,
    blue_pipe: E,
    gamma: bool,
}

impl<A, B, C, E> SmartLedsOutput<A, B, C, E> {
    pub const fn new(beaker: A, red_pipe: B, crystal: C, blue_pipe: E) -> Self {
        Self {
            beaker,
            red_pipe,
            crystal,
            blue_pipe,
            gamma: false,
        }
    }

    /// Apply gamma correction to every written frame
    #[must_use]
    pub fn with_gamma(mut self) -> Self {
        self.gamma = true;
        self
    }
}

fn write_strip<W>(driver: &mut W, strip: StripId, colors: &[Rgb], with_gamma: bool)
where
    W: SmartLedsWrite,
    W::Color: From<Rgb>,
    W::Error: Debug,
{
    let pixels = colors.iter().copied();
    let result = if with_gamma {
        driver.write(gamma(pixels))
    } else {
        driver.write(pixels)
    };
    if let Err(err) = result {
        log!("[SmartLedsOutput] {:?} write failed: {:?}", strip, err);
    }
}

impl<A, B, C, E> OutputDriver for SmartLedsOutput<A, B, C, E>
where
    A: SmartLedsWrite,
    A::Color: From<Rgb>,
    A::Error: Debug,
    B: SmartLedsWrite,
    B::Color: From<Rgb>,
    B::Error: Debug,
    C: SmartLedsWrite,
    C::Color: From<Rgb>,
    C::Error: Debug,
    E: SmartLedsWrite,
    E::Color: From<Rgb>,
    E::Error: Debug,
{
    fn write(&mut self, strip: StripId, colors: &[Rgb]) {
        match strip {
            StripId::Beaker => write_strip(&mut self.beaker, strip, colors, self.gamma),
            StripId::RedPipe => write_strip(&mut self.red_pipe, strip, colors, self.gamma),
            StripId::Crystal => write_strip(&mut self.crystal, strip, colors, self.gamma),
            StripId::BluePipe => write_strip(&mut self.blue_pipe, strip, colors, self.gamma),
        }
    }
}
