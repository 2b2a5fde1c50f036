use std::fmt;

use serde::{Serialize, Serializer};
use syntect::highlighting;

/// An RGBA color as handed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels scaled to `0.0..=1.0`, in r, g, b, a order
    pub fn to_unit(&self) -> [f64; 4] {
        [
            self.r as f64 / 255.,
            self.g as f64 / 255.,
            self.b as f64 / 255.,
            self.a as f64 / 255.,
        ]
    }

    /// Perceived brightness, 0 (black) to 255 (white)
    pub fn luma(&self) -> u8 {
        let luma = 0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64;
        luma.round() as u8
    }

    // Common colors
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl From<highlighting::Color> for Color {
    fn from(color: highlighting::Color) -> Self {
        Self::rgba(color.r, color.g, color.b, color.a)
    }
}

/// `#rrggbb`, or `#rrggbbaa` when not fully opaque
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
