use anyhow::Result;
use serde::{Deserialize, Serialize};

/// An entity's color on a 0-255 scale. Alpha is optional; callers often only care about RGB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: Option<u8>,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: Some(a),
        }
    }

    /// Parses 3 or 4 channels on a 0-255 scale. A NaN alpha counts as missing.
    pub fn from_channels(channels: &[f64]) -> Result<Self> {
        if channels.len() != 3 && channels.len() != 4 {
            bail!("A color needs 3 or 4 channels, not {}", channels.len());
        }
        let mut rgb = [0; 3];
        for (out, value) in rgb.iter_mut().zip(channels) {
            *out = channel(*value)?;
        }
        let a = match channels.get(3) {
            Some(value) if !value.is_nan() => Some(channel(*value)?),
            _ => None,
        };
        Ok(Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a,
        })
    }

    /// RGBA bytes, with a missing alpha treated as fully opaque.
    pub fn packed(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a.unwrap_or(255)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<[u8; 3]> for Color {
    fn from(x: [u8; 3]) -> Self {
        Color::rgb(x[0], x[1], x[2])
    }
}

impl From<[u8; 4]> for Color {
    fn from(x: [u8; 4]) -> Self {
        Color::rgba(x[0], x[1], x[2], x[3])
    }
}

fn channel(value: f64) -> Result<u8> {
    if !value.is_finite() || value < 0.0 || value > 255.0 {
        bail!("Color channel {} isn't in [0, 255]", value);
    }
    Ok(value.round() as u8)
}
