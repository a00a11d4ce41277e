use std::path::Path;

use anyhow::Context as _;
use image::imageops::FilterType;

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::ParticleResult;

/// The decoded painting every particle is sampled from, as straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceImage {
    rgba: image::RgbaImage,
}

impl SourceImage {
    /// Wrap pixels the caller already holds. No resizing is applied.
    pub fn from_rgba(rgba: image::RgbaImage) -> Self {
        Self { rgba }
    }

    /// Decode an encoded image (PNG, JPEG, GIF, ...) and fit it within `max_dimension`.
    pub fn decode(bytes: &[u8], max_dimension: u32) -> ParticleResult<Self> {
        let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
        Ok(Self::from_rgba(dyn_img.to_rgba8()).fit_within(max_dimension))
    }

    /// Read and decode an image file, fitting it within `max_dimension`.
    pub fn open(path: &Path, max_dimension: u32) -> ParticleResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        Self::decode(&bytes, max_dimension)
    }

    /// Downscale so the longer side is at most `max_dimension`, keeping the aspect ratio.
    ///
    /// Images already within bounds are returned untouched.
    pub fn fit_within(self, max_dimension: u32) -> Self {
        let (w, h) = self.rgba.dimensions();
        let Some((nw, nh)) = fitted_size(w, h, max_dimension) else {
            return self;
        };
        tracing::debug!(from_w = w, from_h = h, to_w = nw, to_h = nh, "downscaling source");
        Self {
            rgba: image::imageops::resize(&self.rgba, nw, nh, FilterType::Triangle),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Canvas with the same dimensions as the image.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Color at `(x, y)`; `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.rgba.get_pixel_checked(x, y).map(|p| Rgba8::from(*p))
    }

    /// Tightly packed straight-alpha RGBA8 bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.rgba.as_raw()
    }
}

/// Target size for a `w`×`h` image capped at `max` on its longer side, or `None` if it fits.
pub(crate) fn fitted_size(w: u32, h: u32, max: u32) -> Option<(u32, u32)> {
    if w == 0 || h == 0 || max == 0 || (w <= max && h <= max) {
        return None;
    }
    let scale = |short: u32, long: u32| -> u32 {
        let v = u64::from(short) * u64::from(max) / u64::from(long);
        (v as u32).max(1)
    };
    if w > h {
        Some((max, scale(h, w)))
    } else {
        Some((scale(w, h), max))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/particles/source.rs"]
mod tests;
