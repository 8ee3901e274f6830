//! Colour type used by chart styles.
//!
//! Colours parse from `#rrggbb`, `#rrggbbaa`, `#rgb` or a small set of CSS
//! basic names, which is also the form they take in YAML configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::new(255, 255, 0, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Scale alpha by an opacity in `0.0..=1.0`.
    #[must_use]
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        self.with_alpha((f32::from(self.a) * opacity).round() as u8)
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from array representation.
    #[must_use]
    pub const fn from_array(arr: [u8; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// Hex form, `#rrggbb` when opaque and `#rrggbbaa` otherwise.
    #[must_use]
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse a hex literal or CSS basic colour name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for anything else.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| Error::InvalidColor(s.to_string()));
        }
        named(&s.to_ascii_lowercase()).ok_or_else(|| Error::InvalidColor(s.to_string()))
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nib = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some(Rgba::rgb(nib(0)?, nib(1)?, nib(2)?))
        }
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn named(name: &str) -> Option<Rgba> {
    let color = match name {
        "black" => Rgba::BLACK,
        "white" => Rgba::WHITE,
        "red" => Rgba::RED,
        "lime" => Rgba::GREEN,
        "green" => Rgba::rgb(0, 128, 0),
        "blue" => Rgba::BLUE,
        "yellow" => Rgba::YELLOW,
        "orange" => Rgba::rgb(255, 165, 0),
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        "navy" => Rgba::rgb(0, 0, 128),
        "teal" => Rgba::rgb(0, 128, 128),
        "transparent" => Rgba::TRANSPARENT,
        _ => return None,
    };
    Some(color)
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_constants() {
        assert_eq!(Rgba::BLACK.to_array(), [0, 0, 0, 255]);
        assert_eq!(Rgba::TRANSPARENT.a, 0);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgba::parse("#036564").unwrap(), Rgba::rgb(0x03, 0x65, 0x64));
        assert_eq!(Rgba::parse("#FF0000").unwrap(), Rgba::RED);
        assert_eq!(Rgba::parse("#fff").unwrap(), Rgba::WHITE);
        assert_eq!(Rgba::parse("#00ff0080").unwrap(), Rgba::new(0, 255, 0, 128));
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Rgba::parse("Red").unwrap(), Rgba::RED);
        assert_eq!(Rgba::parse("yellow").unwrap(), Rgba::YELLOW);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Rgba::parse("#12345").is_err());
        assert!(Rgba::parse("#zzzzzz").is_err());
        assert!(Rgba::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn test_hex_roundtrip() {
        let c = Rgba::new(1, 2, 3, 4);
        assert_eq!(Rgba::parse(&c.to_hex()).unwrap(), c);
        assert_eq!(Rgba::RED.to_string(), "#ff0000");
    }

    #[test]
    fn test_with_opacity() {
        assert_eq!(Rgba::RED.with_opacity(0.1).a, 26);
        assert_eq!(Rgba::RED.with_opacity(2.0).a, 255);
        assert_eq!(Rgba::RED.with_opacity(0.0).a, 0);
    }
}
