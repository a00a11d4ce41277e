//! Turning frame sequences into downloadable assets.
//!
//! Sinks consume frames in playback order; the assembler picks a sink per [`AssetFormat`].

/// Asset formats and the assembler.
pub mod assembler;
/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Animated GIF sink.
pub mod gif;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;

pub use assembler::AssetFormat;
