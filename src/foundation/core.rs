use crate::foundation::error::{ParticleError, ParticleResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index in the generated animation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Index of the frame that follows this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ParticleResult<Self> {
        if den == 0 {
            return Err(ParticleError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ParticleError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Duration of one frame in whole milliseconds (rounded, at least 1, saturating at
    /// `u32::MAX`).
    pub fn frame_delay_ms(self) -> u32 {
        ((self.frame_duration_secs() * 1000.0).round() as u32).max(1)
    }
}

impl Default for Fps {
    /// 70 ms per frame.
    fn default() -> Self {
        Self { num: 100, den: 7 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Geometric center of the canvas.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Return `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Build a color from its four channels.
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Scale alpha by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let op = opacity.clamp(0.0, 1.0);
        let a = (f32::from(self.a) * op).round().clamp(0.0, 255.0) as u8;
        Self { a, ..self }
    }
}

impl From<image::Rgba<u8>> for Rgba8 {
    fn from(px: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self { r, g, b, a }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
