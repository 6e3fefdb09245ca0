//! Participant colors and the fixed palette.
//!
//! A [`Color`] is the only identity a participant has on the wire: the
//! broadcast snapshot is keyed by it, and clients draw each trail in it.
//! Colors are 24-bit RGB values rendered as `#RRGGBB`.

use std::fmt;
use std::str::FromStr;

use crate::error::RelayError;

/// Number of colors in the palette, and therefore the maximum number of
/// simultaneously Active participants.
pub const PALETTE_SIZE: usize = 8;

/// The fixed palette handed out by [`ColorPool`](crate::ColorPool).
pub const PALETTE: [Color; PALETTE_SIZE] = [
    Color::rgb(0xF6, 0xC9, 0x45), // gold
    Color::rgb(0xF0, 0x67, 0x2E), // orange
    Color::rgb(0x2E, 0xD1, 0xC5), // teal
    Color::rgb(0xA7, 0x5D, 0xF0), // purple
    Color::rgb(0x7B, 0xEB, 0x4F), // lime
    Color::rgb(0xFF, 0x7A, 0xCD), // pink
    Color::rgb(0x48, 0xC9, 0xFA), // cyan
    Color::rgb(0xE6, 0x39, 0x46), // red
];

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub fn r(&self) -> u8 {
        self.r
    }

    pub fn g(&self) -> u8 {
        self.g
    }

    pub fn b(&self) -> u8 {
        self.b
    }

    /// Position of this color in [`PALETTE`], if it is a palette color.
    pub fn palette_index(&self) -> Option<usize> {
        PALETTE.iter().position(|c| c == self)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = RelayError;

    /// Accepts `#RRGGBB` or `RRGGBB`, hex digits in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RelayError::InvalidColor(s.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| RelayError::InvalidColor(s.to_string()))
        };

        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}
