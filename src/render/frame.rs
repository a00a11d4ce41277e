use crate::foundation::core::Canvas;
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::particles::source::SourceImage;

/// A rendered frame as RGBA8 pixels.
///
/// Particle frames come out of the rasterizer premultiplied; finalize frames are copies of the
/// source and stay straight. The `premultiplied` flag keeps that explicit for the encoders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame of the given size.
    pub fn blank(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba_len()],
            premultiplied: true,
        }
    }

    /// Verbatim copy of the source raster.
    pub fn from_source(source: &SourceImage) -> Self {
        Self {
            width: source.width(),
            height: source.height(),
            data: source.as_raw().to_vec(),
            premultiplied: false,
        }
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        data
    }

    /// Convert into an `image` buffer with straight alpha.
    pub fn to_rgba_image(&self) -> ParticleResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba()).ok_or_else(
            || {
                ParticleError::validation(format!(
                    "frame data size mismatch: {} bytes for {}x{}",
                    self.data.len(),
                    self.width,
                    self.height
                ))
            },
        )
    }

    /// Return `true` when every pixel is fully transparent.
    pub fn is_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}
