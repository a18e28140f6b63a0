//! RGBA colors for interpolated background/text transitions.
//!
//! Colors parse from CSS hex literals (`#rgb`, `#rrggbb`, `#rrggbbaa`) and
//! interpolate per channel in sRGB space, matching what browsers do for
//! inline style transitions.

use std::fmt;
use std::str::FromStr;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::error::ScrollweaveError;

/// An RGBA color with channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba(Vec4);

impl Rgba {
    /// Opaque white.
    pub const WHITE: Rgba = Rgba(Vec4::ONE);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba(Vec4::new(0.0, 0.0, 0.0, 1.0));

    /// Color from channel values in [0, 1]. Out-of-range values are clamped.
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self(Vec4::new(r, g, b, a).clamp(Vec4::ZERO, Vec4::ONE))
    }

    /// Color from 8-bit channels.
    #[must_use]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(Vec4::new(
            f32::from(r),
            f32::from(g),
            f32::from(b),
            f32::from(a),
        ) / 255.0)
    }

    /// Channels quantized to 8 bits.
    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        let v = (self.0 * 255.0).round();
        [v.x as u8, v.y as u8, v.z as u8, v.w as u8]
    }

    /// Channels as floats.
    #[must_use]
    pub fn to_array(self) -> [f32; 4] {
        self.0.to_array()
    }

    /// Per-channel interpolation at `t`.
    ///
    /// `t` is not clamped so overshooting easings carry through; the result
    /// is clamped back into the valid channel range.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let v = self.0.lerp(other.0, t as f32);
        Self(v.clamp(Vec4::ZERO, Vec4::ONE))
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    Some((hex_nibble(pair[0])? << 4) | hex_nibble(pair[1])?)
}

impl FromStr for Rgba {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScrollweaveError::InvalidColor(s.to_owned());
        let digits = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        let bytes = digits.as_bytes();

        let channels: Option<Vec<u8>> = match bytes.len() {
            3 | 4 => bytes
                .iter()
                .map(|&c| hex_nibble(c).map(|n| n * 17))
                .collect(),
            6 | 8 => bytes.chunks(2).map(hex_byte).collect(),
            _ => None,
        };
        let channels = channels.ok_or_else(invalid)?;
        let alpha = channels.get(3).copied().unwrap_or(255);
        Ok(Self::from_rgba8(channels[0], channels[1], channels[2], alpha))
    }
}

impl TryFrom<String> for Rgba {
    type Error = ScrollweaveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}
