//! From a saved upload to a published animation.
//!
//! A [`Pipeline`] owns the generator configuration and one [`AnimationStrategy`]. The native
//! strategy samples and simulates particles in-process; the external strategy hands the upload to
//! a [`ConversionBackend`] and publishes whatever file it produced.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context as _;
use image::AnimationDecoder as _;

use crate::config::{GeneratorConfig, OutputPaths};
use crate::convert::external::ConversionBackend;
use crate::encode::assembler::{AssetFormat, sink_for, summarize};
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::particles::source::SourceImage;
use crate::simulate::simulator::SimulationContext;
use crate::upload::{SavedUpload, UploadRecord, save_upload, unix_millis};

/// Per-request generation options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Asset format to produce.
    pub format: AssetFormat,
    /// Overrides the configured seed when set.
    pub seed: Option<u64>,
    /// Request time, used for file naming.
    pub now: SystemTime,
}

impl GenerationRequest {
    /// Request `format` at the current time.
    pub fn new(format: AssetFormat) -> Self {
        Self {
            format,
            seed: None,
            now: SystemTime::now(),
        }
    }

    /// Fix the seed for this request.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pretend the request arrived at `now`.
    pub fn at(mut self, now: SystemTime) -> Self {
        self.now = now;
        self
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self::new(AssetFormat::Gif)
    }
}

/// A published animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedAsset {
    /// File on disk.
    pub path: PathBuf,
    /// Public URL of `path`.
    pub url: String,
    /// Container format of `path`.
    pub format: AssetFormat,
    /// Frames stored in the asset.
    pub frame_count: u64,
    /// Particles animated, when known.
    pub particle_count: Option<usize>,
}

/// A way of turning a saved upload into a published asset.
pub trait AnimationStrategy {
    /// Produce and publish the asset for `upload`.
    fn generate(
        &self,
        upload: &SavedUpload,
        request: &GenerationRequest,
    ) -> ParticleResult<GeneratedAsset>;
}

/// `animation_<millis>.<ext>`
pub fn output_file_name(format: AssetFormat, now: SystemTime) -> String {
    format!("animation_{}.{}", unix_millis(now), format.extension())
}

/// Sample, simulate and encode in-process.
#[derive(Clone, Debug)]
pub struct NativeSimulation {
    cfg: GeneratorConfig,
}

impl NativeSimulation {
    /// Strategy simulating with `cfg`.
    pub fn new(cfg: GeneratorConfig) -> Self {
        Self { cfg }
    }
}

impl AnimationStrategy for NativeSimulation {
    #[tracing::instrument(skip_all, fields(upload = %upload.path.display(), format = ?request.format))]
    fn generate(
        &self,
        upload: &SavedUpload,
        request: &GenerationRequest,
    ) -> ParticleResult<GeneratedAsset> {
        let mut cfg = self.cfg.clone();
        if let Some(seed) = request.seed {
            cfg = cfg.with_seed(seed);
        }

        let source = SourceImage::open(&upload.path, cfg.max_dimension)?;
        let file_name = output_file_name(request.format, request.now);
        let out_path = cfg.paths.output_dir.join(&file_name);

        let mut ctx = SimulationContext::new(source, &cfg)?;
        let mut sink = sink_for(request.format, &out_path);
        let stats = ctx.run(sink.as_mut())?;
        let assembled = summarize(request.format, &out_path, stats.total_frames());

        tracing::info!(
            path = %out_path.display(),
            frames = assembled.frames_encoded,
            "animation written"
        );
        Ok(GeneratedAsset {
            url: cfg.paths.public_url(&file_name),
            path: out_path,
            format: request.format,
            frame_count: assembled.frames_encoded,
            particle_count: Some(stats.particle_count),
        })
    }
}

/// Delegate to a conversion backend and publish its GIF into the output directory.
#[derive(Clone, Debug)]
pub struct ExternalConversion<B> {
    backend: B,
    paths: OutputPaths,
}

impl<B: ConversionBackend> ExternalConversion<B> {
    /// Publish output of `backend` under `paths`.
    pub fn new(backend: B, paths: OutputPaths) -> Self {
        Self { backend, paths }
    }
}

impl<B: ConversionBackend> AnimationStrategy for ExternalConversion<B> {
    #[tracing::instrument(skip_all, fields(upload = %upload.path.display()))]
    fn generate(
        &self,
        upload: &SavedUpload,
        request: &GenerationRequest,
    ) -> ParticleResult<GeneratedAsset> {
        if request.format != AssetFormat::Gif {
            return Err(ParticleError::validation(format!(
                "external conversion only produces gif, not {:?}",
                request.format
            )));
        }

        let produced = self.backend.convert(&upload.path)?;
        let file_name = output_file_name(AssetFormat::Gif, request.now);
        let dest = self.paths.output_dir.join(&file_name);
        publish(&produced.output_path, &dest)?;

        let frame_count = count_gif_frames(&dest)?;
        tracing::info!(path = %dest.display(), frames = frame_count, "conversion output published");
        Ok(GeneratedAsset {
            url: self.paths.public_url(&file_name),
            path: dest,
            format: AssetFormat::Gif,
            frame_count,
            particle_count: None,
        })
    }
}

fn publish(from: &Path, to: &Path) -> ParticleResult<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    if std::fs::rename(from, to).is_err() {
        std::fs::copy(from, to).with_context(|| {
            format!("copy '{}' to '{}'", from.display(), to.display())
        })?;
    }
    Ok(())
}

fn count_gif_frames(path: &Path) -> ParticleResult<u64> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open gif '{}'", path.display()))?;
    let decoder = image::codecs::gif::GifDecoder::new(std::io::BufReader::new(file)).map_err(|e| {
        ParticleError::conversion(format!("'{}' is not a readable gif: {e}", path.display()))
    })?;
    let mut n = 0u64;
    for frame in decoder.into_frames() {
        frame.map_err(|e| {
            ParticleError::conversion(format!("'{}' has a corrupt frame: {e}", path.display()))
        })?;
        n += 1;
    }
    Ok(n)
}

/// Configured generator: upload limits, storage paths and one strategy.
pub struct Pipeline {
    cfg: GeneratorConfig,
    strategy: Box<dyn AnimationStrategy>,
}

impl Pipeline {
    /// Pipeline running [`NativeSimulation`] with `cfg`.
    pub fn native(cfg: GeneratorConfig) -> ParticleResult<Self> {
        Self::new(cfg.clone(), NativeSimulation::new(cfg))
    }

    /// Pipeline running `strategy`. Fails if `cfg` does not validate.
    pub fn new(
        cfg: GeneratorConfig,
        strategy: impl AnimationStrategy + 'static,
    ) -> ParticleResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            strategy: Box::new(strategy),
        })
    }

    /// Validate, persist and convert one upload.
    ///
    /// Validation runs before anything is written, so a rejected upload leaves no file behind.
    pub fn process(
        &self,
        record: Option<UploadRecord>,
        request: &GenerationRequest,
    ) -> ParticleResult<GeneratedAsset> {
        let record = self.cfg.upload.check(record)?;
        let saved = save_upload(&record, &self.cfg.paths.upload_dir, request.now)?;
        self.strategy.generate(&saved, request)
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline/pipeline.rs"]
mod tests;
