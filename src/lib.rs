//! Turn a painting into a particle explosion and reconstruction animation.
//!
//! The flow for one upload:
//!
//! - Validate and persist the upload ([`UploadLimits`], [`save_upload`])
//! - Sample the image into a [`ParticleField`]
//! - Run the four [`Phase`]s in a [`SimulationContext`], streaming frames into a [`FrameSink`]
//! - Publish the encoded asset ([`Pipeline`], [`api::handle_upload`])
//!
//! Generation can instead be delegated to an external program through [`ExternalScript`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Transport-agnostic request handlers.
pub mod api;
/// Generator configuration and environment overrides.
pub mod config;
pub(crate) mod convert;
/// Frame sinks and asset assembly.
pub mod encode;
pub(crate) mod particles;
/// Upload-to-asset orchestration.
pub mod pipeline;
pub(crate) mod render;
pub(crate) mod simulate;
/// Upload validation and persistence.
pub mod upload;

pub use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{ParticleError, ParticleResult};

pub use crate::api::{ApiResponse, handle_status, handle_upload};
pub use crate::config::{GeneratorConfig, MotionParams, OutputPaths};
pub use crate::convert::external::{ConversionBackend, ConversionOutput, ExternalScript};
pub use crate::encode::assembler::{AssembledAsset, AssetFormat, StillFrameSink, assemble};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::gif::{GifSink, GifSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::particles::field::{Particle, ParticleField, expected_sample_count};
pub use crate::particles::source::SourceImage;
pub use crate::pipeline::{
    AnimationStrategy, ExternalConversion, GeneratedAsset, GenerationRequest, NativeSimulation,
    Pipeline,
};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::raster::ParticleRasterizer;
pub use crate::simulate::phase::{Phase, PhaseFrames};
pub use crate::simulate::simulator::{
    SimulationContext, SimulationStats, render_frame_at, rng_from_seed,
};
pub use crate::upload::{SavedUpload, UploadLimits, UploadRecord, save_upload};
