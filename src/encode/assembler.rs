use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::gif::{GifSink, GifSinkOpts, ensure_parent_dir};
use crate::encode::sink::{FrameSink, SinkConfig, check_frame_size, check_order};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::render::frame::FrameRGBA;

/// Container format of the downloadable asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetFormat {
    /// Looping animated GIF of every frame.
    Gif,
    /// H.264 MP4 of every frame (needs `ffmpeg` on PATH).
    Mp4,
    /// PNG of the first frame only; the rest of the sequence is discarded.
    StillPng,
}

impl AssetFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            AssetFormat::Gif => "gif",
            AssetFormat::Mp4 => "mp4",
            AssetFormat::StillPng => "png",
        }
    }

    /// Whether the asset carries the whole frame sequence.
    pub fn is_animated(self) -> bool {
        !matches!(self, AssetFormat::StillPng)
    }
}

/// Summary of an assembled asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledAsset {
    /// Where the asset was written.
    pub path: PathBuf,
    /// Asset format.
    pub format: AssetFormat,
    /// Frames present in the asset.
    pub frames_encoded: u64,
    /// Frames received but left out of the asset.
    pub frames_discarded: u64,
}

/// Sink that keeps only the first frame and writes it as a PNG on `end`.
pub struct StillFrameSink {
    out_path: PathBuf,
    cfg: Option<SinkConfig>,
    first: Option<FrameRGBA>,
    last_idx: Option<FrameIndex>,
    discarded: u64,
}

impl StillFrameSink {
    /// Create a sink that writes the first frame to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            cfg: None,
            first: None,
            last_idx: None,
            discarded: 0,
        }
    }
}

impl FrameSink for StillFrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> ParticleResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ParticleError::validation(
                "still frame width/height must be non-zero",
            ));
        }
        self.cfg = Some(cfg);
        self.first = None;
        self.last_idx = None;
        self.discarded = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ParticleResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ParticleError::encode("still frame sink not started"))?;
        check_order(self.last_idx, idx)?;
        check_frame_size(cfg, frame)?;
        if self.first.is_none() {
            self.first = Some(frame.clone());
        } else {
            self.discarded += 1;
        }
        self.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> ParticleResult<()> {
        let first = self
            .first
            .as_ref()
            .ok_or_else(|| ParticleError::validation("cannot assemble an empty frame sequence"))?;
        if self.discarded > 0 {
            tracing::warn!(
                discarded = self.discarded,
                "still asset keeps only the first frame"
            );
        }
        write_png(first, &self.out_path)
    }
}

/// Write one frame as a straight-alpha PNG.
pub fn write_png(frame: &FrameRGBA, out_path: &Path) -> ParticleResult<()> {
    ensure_parent_dir(out_path)?;
    let img = frame.to_rgba_image()?;
    img.save_with_format(out_path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", out_path.display()))?;
    Ok(())
}

/// Build the sink that produces `format` at `out_path`.
pub fn sink_for(format: AssetFormat, out_path: &Path) -> Box<dyn FrameSink> {
    match format {
        AssetFormat::Gif => Box::new(GifSink::new(GifSinkOpts::new(out_path))),
        AssetFormat::Mp4 => Box::new(FfmpegSink::new(FfmpegSinkOpts::new(out_path))),
        AssetFormat::StillPng => Box::new(StillFrameSink::new(out_path)),
    }
}

/// Encode an ordered frame sequence into one asset.
#[tracing::instrument(skip(frames), fields(frames = frames.len()))]
pub fn assemble(
    frames: &[FrameRGBA],
    format: AssetFormat,
    fps: Fps,
    out_path: &Path,
) -> ParticleResult<AssembledAsset> {
    let first = frames
        .first()
        .ok_or_else(|| ParticleError::validation("cannot assemble an empty frame sequence"))?;

    let mut sink = sink_for(format, out_path);
    sink.begin(SinkConfig {
        width: first.width,
        height: first.height,
        fps,
    })?;
    for (i, frame) in frames.iter().enumerate() {
        sink.push_frame(FrameIndex(i as u64), frame)?;
    }
    sink.end()?;

    Ok(summarize(format, out_path, frames.len() as u64))
}

/// Describe the asset `format` makes out of `total` received frames.
pub fn summarize(format: AssetFormat, out_path: &Path, total: u64) -> AssembledAsset {
    let frames_encoded = if format.is_animated() {
        total
    } else {
        total.min(1)
    };
    AssembledAsset {
        path: out_path.to_path_buf(),
        format,
        frames_encoded,
        frames_discarded: total - frames_encoded,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/assembler.rs"]
mod tests;
