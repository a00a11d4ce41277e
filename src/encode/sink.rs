use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Playback rate.
    pub fps: Fps,
}

/// Sink contract for consuming frames in playback order.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex` values.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ParticleResult<()>;
    /// Push one frame in playback order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ParticleResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ParticleResult<()>;
}

/// In-memory sink for tests and for assembling assets after the fact.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Consume the sink, keeping only the frames in order.
    pub fn into_frames(self) -> Vec<FrameRGBA> {
        self.frames.into_iter().map(|(_, f)| f).collect()
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ParticleResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ParticleResult<()> {
        check_order(self.frames.last().map(|(i, _)| *i), idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ParticleResult<()> {
        Ok(())
    }
}

pub(crate) fn check_order(last: Option<FrameIndex>, idx: FrameIndex) -> ParticleResult<()> {
    if let Some(last) = last
        && idx.0 <= last.0
    {
        return Err(ParticleError::encode(format!(
            "frame index {} pushed after {}; indices must strictly increase",
            idx.0, last.0
        )));
    }
    Ok(())
}

pub(crate) fn check_frame_size(cfg: &SinkConfig, frame: &FrameRGBA) -> ParticleResult<()> {
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(ParticleError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    if frame.data.len() != frame.canvas().rgba_len() {
        return Err(ParticleError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
