use smart_leds::RGB8;

use crate::math8::scale8;

pub type Rgb = RGB8;

pub const BLACK: Rgb = rgb_from_u32(0x00_00_00);
pub const RED: Rgb = rgb_from_u32(0xFF_00_00);
pub const GREEN: Rgb = rgb_from_u32(0x00_FF_00);
pub const BLUE: Rgb = rgb_from_u32(0x00_00_FF);
pub const PURPLE: Rgb = rgb_from_u32(0x80_00_80);

/// Create an RGB color from a u32 value (0xRRGGBB format)
#[allow(clippy::cast_possible_truncation)]
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Scale every channel of a color (0 = black, 255 = unchanged)
#[inline]
pub const fn dim(color: Rgb, scale: u8) -> Rgb {
    Rgb {
        r: scale8(color.r, scale),
        g: scale8(color.g, scale),
        b: scale8(color.b, scale),
    }
}

/// Check if every pixel is off
pub fn is_dark(leds: &[Rgb]) -> bool {
    leds.iter().all(|led| *led == BLACK)
}
