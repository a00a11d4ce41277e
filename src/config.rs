use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Fps;
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::simulate::phase::PhaseFrames;
use crate::upload::UploadLimits;

/// Environment variable overriding [`GeneratorConfig::seed`].
pub const ENV_SEED: &str = "PARTICLE_PAINTING_SEED";
/// Environment variable overriding [`OutputPaths::upload_dir`].
pub const ENV_UPLOAD_DIR: &str = "PARTICLE_PAINTING_UPLOAD_DIR";
/// Environment variable overriding [`OutputPaths::output_dir`].
pub const ENV_OUTPUT_DIR: &str = "PARTICLE_PAINTING_OUTPUT_DIR";

/// Tunables for the per-frame particle motion.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionParams {
    /// Peak explosion force reached on the last explosion frame.
    pub explosion_force: f64,
    /// Fraction of the explosion velocity integrated into position each frame.
    pub explosion_damping: f64,
    /// Fraction of the remaining distance home covered each return frame.
    pub return_rate: f64,
    /// Per-frame drift amplitude during floating, in pixels.
    pub float_amplitude: f64,
    /// Phase advance per floating frame, in radians.
    pub float_time_scale: f64,
    /// Phase offset per pixel of home coordinate, in radians.
    pub float_spatial_scale: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            explosion_force: 100.0,
            explosion_damping: 0.1,
            return_rate: 0.1,
            float_amplitude: 0.5,
            float_time_scale: 0.1,
            float_spatial_scale: 0.01,
        }
    }
}

/// Where uploads and generated assets live, and how assets are exposed publicly.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputPaths {
    /// Working directory for saved uploads.
    pub upload_dir: PathBuf,
    /// Directory generated animations are written to.
    pub output_dir: PathBuf,
    /// URL prefix under which `output_dir` is served.
    pub public_url_prefix: String,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("public").join("animations"),
            public_url_prefix: "/animations".to_string(),
        }
    }
}

impl OutputPaths {
    /// Map a file name inside `output_dir` to its public URL.
    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_url_prefix.trim_end_matches('/'), file_name)
    }
}

/// Full generator configuration.
///
/// Every field has a default, so a config file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Pixel stride used when sampling the source into particles.
    pub sample_step: u32,
    /// Longest allowed side of the working raster; larger sources are downscaled.
    pub max_dimension: u32,
    /// Frame count of each phase.
    pub phase_frames: PhaseFrames,
    /// Motion tunables.
    pub motion: MotionParams,
    /// Half-open `[min, max)` range of initial particle sizes.
    pub size_range: [f64; 2],
    /// Half-open `[min, max)` range of per-frame rotation speeds, in radians.
    pub rotation_speed_range: [f64; 2],
    /// Seed for particle randomness; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Playback rate of the assembled animation.
    pub fps: Fps,
    /// Upload acceptance limits.
    pub upload: UploadLimits,
    /// Filesystem layout.
    pub paths: OutputPaths,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_step: 2,
            max_dimension: 400,
            phase_frames: PhaseFrames::default(),
            motion: MotionParams::default(),
            size_range: [1.0, 3.0],
            rotation_speed_range: [-0.1, 0.1],
            seed: None,
            fps: Fps::default(),
            upload: UploadLimits::default(),
            paths: OutputPaths::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a JSON config document.
    pub fn from_json_str(s: &str) -> ParticleResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| ParticleError::serde(format!("invalid generator config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_path(path: &Path) -> ParticleResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Return a copy with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Apply `PARTICLE_PAINTING_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> ParticleResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (the environment in production).
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ParticleResult<Self> {
        if let Some(raw) = lookup(ENV_SEED) {
            let seed = raw.trim().parse::<u64>().map_err(|_| {
                ParticleError::validation(format!("{ENV_SEED} must be an unsigned integer"))
            })?;
            self.seed = Some(seed);
        }
        if let Some(dir) = lookup(ENV_UPLOAD_DIR).filter(|v| !v.is_empty()) {
            self.paths.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            self.paths.output_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    /// Check the config for values the generator cannot run with.
    pub fn validate(&self) -> ParticleResult<()> {
        if self.sample_step == 0 {
            return Err(ParticleError::validation("sample_step must be > 0"));
        }
        if self.max_dimension == 0 {
            return Err(ParticleError::validation("max_dimension must be > 0"));
        }
        if self.max_dimension > u32::from(u16::MAX) {
            return Err(ParticleError::validation(format!(
                "max_dimension must be <= {}",
                u16::MAX
            )));
        }
        check_range("size_range", self.size_range)?;
        if self.size_range[0] <= 0.0 {
            return Err(ParticleError::validation("size_range must be positive"));
        }
        check_range("rotation_speed_range", self.rotation_speed_range)?;
        if self.motion.explosion_damping.is_nan() || self.motion.explosion_damping <= 0.0 {
            return Err(ParticleError::validation("explosion_damping must be > 0"));
        }
        let rate = self.motion.return_rate;
        if rate.is_nan() || rate <= 0.0 || rate > 1.0 {
            return Err(ParticleError::validation("return_rate must be in (0, 1]"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        self.upload.validate()?;
        Ok(())
    }
}

fn check_range(name: &str, [lo, hi]: [f64; 2]) -> ParticleResult<()> {
    if !lo.is_finite() || !hi.is_finite() {
        return Err(ParticleError::validation(format!("{name} must be finite")));
    }
    if lo > hi {
        return Err(ParticleError::validation(format!("{name} min must be <= max")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
