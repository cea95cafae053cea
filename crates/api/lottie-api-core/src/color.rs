//! RGBA colors and hex-string coercion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while coercing a host color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    #[error("color '{0}' must have 3, 6 or 8 hex digits")]
    Length(String),
    #[error("color '{0}' contains a non-hex digit")]
    Digit(String),
}

/// Straight (non-premultiplied) RGBA, each channel in 0..1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Quantize back to 8-bit channels (round to nearest).
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Build from a Lottie static color array (`[r, g, b]` or `[r, g, b, a]`, 0..1).
    pub fn from_components(c: &[f32]) -> Option<Self> {
        match c {
            [r, g, b] => Some(Self::new(*r, *g, *b, 1.0)),
            [r, g, b, a, ..] => Some(Self::new(*r, *g, *b, *a)),
            _ => None,
        }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ColorError::Empty);
        }
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::Digit(s.to_string()));
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|n| n * 17);
        let parsed = match digits.len() {
            3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
            6 => (byte(0), byte(2), byte(4), Ok(255)),
            8 => (byte(0), byte(2), byte(4), byte(6)),
            _ => return Err(ColorError::Length(s.to_string())),
        };
        match parsed {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Self::from_rgba8(r, g, b, a)),
            _ => Err(ColorError::Digit(s.to_string())),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{r:02X}{g:02X}{b:02X}")
        } else {
            write!(f, "#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl FromStr for Rgba {
    type Err = ColorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        let c = Rgba::from_hex("#FF0000").unwrap();
        assert_eq!(c.to_rgba8(), [255, 0, 0, 255]);
        assert_eq!(c.to_string(), "#FF0000");
    }

    #[test]
    fn parses_short_and_alpha_forms() {
        assert_eq!(Rgba::from_hex("0f0").unwrap().to_rgba8(), [0, 255, 0, 255]);
        assert_eq!(
            Rgba::from_hex("#00000080").unwrap().to_rgba8(),
            [0, 0, 0, 128]
        );
        assert_eq!(Rgba::from_hex("#00000080").unwrap().to_string(), "#00000080");
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(Rgba::from_hex("  "), Err(ColorError::Empty));
        assert!(matches!(Rgba::from_hex("#12345"), Err(ColorError::Length(_))));
        assert!(matches!(Rgba::from_hex("#GG0000"), Err(ColorError::Digit(_))));
        assert!(matches!(Rgba::from_hex("#ÿÿ"), Err(ColorError::Digit(_))));
    }

    #[test]
    fn components_default_alpha() {
        let c = Rgba::from_components(&[1.0, 0.5, 0.0]).unwrap();
        assert_eq!(c.a, 1.0);
        assert!(Rgba::from_components(&[1.0]).is_none());
    }
}
