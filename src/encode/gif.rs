use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::encode::sink::{FrameSink, SinkConfig, check_frame_size, check_order};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::render::frame::FrameRGBA;

/// Options for [`GifSink`] output.
#[derive(Clone, Debug)]
pub struct GifSinkOpts {
    /// Output GIF file path.
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Quantization speed, 1 (best) to 30 (fastest).
    pub speed: i32,
}

impl GifSinkOpts {
    /// Create options for writing a looping GIF to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            speed: 10,
        }
    }
}

/// Sink that streams frames into an infinitely looping animated GIF.
pub struct GifSink {
    opts: GifSinkOpts,
    encoder: Option<GifEncoder<BufWriter<File>>>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frames_written: u64,
}

impl GifSink {
    /// Create a new GIF sink. Nothing is written until `begin`.
    pub fn new(opts: GifSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            cfg: None,
            last_idx: None,
            frames_written: 0,
        }
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> ParticleResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ParticleError::validation(
                "gif sink width/height must be non-zero",
            ));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(ParticleError::validation(
                "gif sink width/height must fit in u16",
            ));
        }
        if !(1..=30).contains(&self.opts.speed) {
            return Err(ParticleError::validation("gif speed must be in 1..=30"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ParticleError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let file = File::create(&self.opts.out_path)
            .with_context(|| format!("create gif '{}'", self.opts.out_path.display()))?;
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), self.opts.speed);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| ParticleError::encode(format!("failed to set gif loop: {e}")))?;

        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ParticleResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ParticleError::encode("gif sink not started"))?;
        check_order(self.last_idx, idx)?;
        check_frame_size(cfg, frame)?;

        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| ParticleError::encode("gif sink is already finalized"))?;

        let delay = Delay::from_numer_denom_ms(cfg.fps.frame_delay_ms(), 1);
        let gif_frame = Frame::from_parts(frame.to_rgba_image()?, 0, 0, delay);
        encoder
            .encode_frame(gif_frame)
            .map_err(|e| ParticleError::encode(format!("failed to encode gif frame: {e}")))?;

        self.last_idx = Some(idx);
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> ParticleResult<()> {
        if self.cfg.is_none() {
            return Err(ParticleError::encode("gif sink not started"));
        }
        // Dropping the encoder writes the GIF trailer and flushes the file.
        drop(self.encoder.take());
        Ok(())
    }
}

pub(crate) fn ensure_parent_dir(path: &Path) -> ParticleResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
