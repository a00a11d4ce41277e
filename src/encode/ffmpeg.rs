use std::io::{Read, Write as _};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::gif::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig, check_frame_size, check_order};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::foundation::math::flatten_to_opaque_rgba8;
use crate::render::frame::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

/// Reject configurations `libx264`/`yuv420p` cannot encode.
pub fn validate_mp4_config(cfg: &SinkConfig) -> ParticleResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(ParticleError::validation("fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(ParticleError::validation(
            "ffmpeg sink width/height must be non-zero",
        ));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(ParticleError::validation(
            "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
        ));
    }
    Ok(())
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ParticleResult<()> {
        validate_mp4_config(&cfg)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ParticleError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(ParticleError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input is opaque RGBA8; alpha is flattened in push_frame.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args([
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            ParticleError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ParticleError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ParticleError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ParticleResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ParticleError::encode("ffmpeg sink not started"))?;
        check_order(self.last_idx, idx)?;
        check_frame_size(cfg, frame)?;

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ParticleError::encode("ffmpeg encoder is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            ParticleError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        self.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> ParticleResult<()> {
        drop(self.stdin.take());

        let Some(child) = self.child.take() else {
            return Err(ParticleError::encode("ffmpeg sink not started"));
        };
        let output = child.wait_with_output().map_err(|e| {
            ParticleError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;

        let stderr = match self.stderr_drain.take() {
            Some(handle) => match handle.join() {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => {
                    return Err(ParticleError::encode(format!(
                        "failed to read ffmpeg stderr: {e}"
                    )));
                }
                Err(_) => {
                    return Err(ParticleError::encode("ffmpeg stderr reader panicked"));
                }
            },
            None => Vec::new(),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(ParticleError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Return `true` when an `ffmpeg` binary can be launched from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
