//! Frame encoding and container muxing.

/// H.264 Annex-B byte stream helpers.
pub mod annexb;
/// Encoder/muxer factories.
pub mod backend;
/// Encoder capability and per-frame descriptors.
pub mod encoder;
/// `ffmpeg`-backed H.264 encoder.
pub mod ffmpeg;
/// Tool-free encoder and container for tests.
pub mod memory;
/// Container muxer capability and the MP4 implementation.
pub mod muxer;
