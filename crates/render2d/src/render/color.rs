//! Floating point RGBA colour with packed integer conversions

use serde::{Deserialize, Serialize};

/// Colour with each channel in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque red
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Opaque green
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    /// Opaque blue
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Create a colour from channel values
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a colour stored as `0xAARRGGBB`
    pub fn from_argb(value: i32) -> Self {
        let v = value as u32;
        Self::new(
            channel(v >> 16),
            channel(v >> 8),
            channel(v),
            channel(v >> 24),
        )
    }

    /// Pack into `0xAARRGGBB`
    pub fn to_argb(self) -> i32 {
        ((byte(self.a) << 24) | (byte(self.r) << 16) | (byte(self.g) << 8) | byte(self.b)) as i32
    }

    /// Unpack a colour stored as `0xRRGGBBAA`
    pub fn from_rgba(value: u32) -> Self {
        Self::new(
            channel(value >> 24),
            channel(value >> 16),
            channel(value >> 8),
            channel(value),
        )
    }

    /// Pack into `0xRRGGBBAA`
    pub fn to_rgba(self) -> u32 {
        (byte(self.r) << 24) | (byte(self.g) << 16) | (byte(self.b) << 8) | byte(self.a)
    }

    /// Same colour with a different alpha
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Channels as an array, in vertex order
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<Color> for [f32; 4] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

fn channel(bits: u32) -> f32 {
    (bits & 0xFF) as f32 / 255.0
}

fn byte(value: f32) -> u32 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u32
}
