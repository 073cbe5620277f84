//! Color types.
//!
//! `Rgba8` is the 8-bit, non-premultiplied storage format of the canvas.
//! Colors can be parsed from hex strings (`#ff0000`, `#0fc`, `#00ffcc80`)
//! or from a small set of names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::basics::{uround, CoverType};
use crate::error::Error;

// ============================================================================
// Rgba8 (8-bit per channel)
// ============================================================================

/// RGBA color with `u8` components, non-premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const BLACK: Rgba8 = Rgba8::new_opaque(0, 0, 0);
    pub const WHITE: Rgba8 = Rgba8::new_opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn to_double(a: u8) -> f64 {
        a as f64 / Self::BASE_MASK as f64
    }

    /// Convert a `[0, 1]` value to 8 bits, clamping out-of-range input.
    pub fn from_double(a: f64) -> u8 {
        uround(a.clamp(0.0, 1.0) * Self::BASE_MASK as f64) as u8
    }

    /// Same color, opacity scaled by `alpha` in `[0, 1]`.
    pub fn with_alpha(&self, alpha: f64) -> Self {
        Self {
            a: Self::from_double(Self::to_double(self.a) * alpha),
            ..*self
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == Self::BASE_MASK as u8
    }

    /// Fixed-point multiply, exact over u8: `a * b / 255` with rounding.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Scale an alpha by a coverage value.
    #[inline]
    pub fn mult_cover(a: u8, cover: CoverType) -> u8 {
        Self::multiply(a, cover)
    }

    /// Interpolate `p` toward `q` by `a`.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }

    /// Look up one of the named colors the scenes use.
    pub fn named(name: &str) -> Option<Rgba8> {
        let c = match name.to_ascii_lowercase().as_str() {
            "black" => Rgba8::BLACK,
            "white" => Rgba8::WHITE,
            "red" => Rgba8::new_opaque(255, 0, 0),
            "green" => Rgba8::new_opaque(0, 128, 0),
            "blue" => Rgba8::new_opaque(0, 0, 255),
            "cyan" => Rgba8::new_opaque(0, 255, 255),
            "magenta" => Rgba8::new_opaque(255, 0, 255),
            "yellow" => Rgba8::new_opaque(255, 255, 0),
            "gold" => Rgba8::new_opaque(255, 215, 0),
            "orange" => Rgba8::new_opaque(255, 165, 0),
            "silver" => Rgba8::new_opaque(192, 192, 192),
            "transparent" | "none" => Rgba8::new(0, 0, 0, 0),
            _ => return None,
        };
        Some(c)
    }

    fn parse_hex(hex: &str) -> Option<Rgba8> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        match hex.len() {
            3 => Some(Rgba8::new_opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Some(Rgba8::new_opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

impl FromStr for Rgba8 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix('#') {
            Some(hex) => Self::parse_hex(hex),
            None => Self::named(s),
        };
        parsed.ok_or_else(|| Error::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgba8> for String {
    fn from(c: Rgba8) -> Self {
        c.to_string()
    }
}

/// `#rrggbb`, or `#rrggbbaa` when not opaque.
impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl From<Rgba8> for image::Rgba<u8> {
    fn from(c: Rgba8) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

// ============================================================================
// Tests
// ============================================================================
