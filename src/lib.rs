//! `countdown-render` turns a countdown timer description into a video.
//!
//! A [`VisualConfig`] (font, colours, background, unit formatting, duration, fps) is rendered
//! frame by frame on the CPU and streamed into an H.264 encoder; encoded chunks are muxed into an
//! in-memory MP4 that can then be saved to disk.
//!
//! # Pipeline overview
//!
//! 1. **Format**: remaining seconds -> display string ([`format_countdown`], [`display_text`])
//! 2. **Render**: `VisualConfig + text -> Surface` ([`FrameRenderer`])
//! 3. **Encode**: frames -> Annex-B chunks ([`VideoEncoder`], `ffmpeg` by default)
//! 4. **Mux**: chunks -> MP4 bytes ([`ContainerMuxer`])
//!
//! [`ExportPipeline`] drives the whole sequence with backpressure, progress reporting and
//! cancellation. Surfaces hold premultiplied RGBA8 end-to-end.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Background image decoding.
pub mod assets;
/// Encoders, muxers and backend factories.
pub mod encode;
/// Export pipeline.
pub mod export;
/// Core value types and errors.
pub mod foundation;
/// Frame rendering.
pub mod render;
/// Countdown configuration model.
pub mod scene;
/// Countdown text formatting.
pub mod text;

pub use crate::assets::image::{BackgroundImage, decode_background, preload_background};
pub use crate::encode::backend::{
    BackendKind, FfmpegMp4Backend, InMemoryBackend, MediaBackend, create_backend,
};
pub use crate::encode::encoder::{EncodedChunk, EncoderConfig, FrameDescriptor, VideoEncoder};
pub use crate::encode::ffmpeg::{FfmpegEncoder, FfmpegEncoderOpts, is_ffmpeg_on_path};
pub use crate::encode::memory::{InMemoryEncoder, InMemoryMuxer};
pub use crate::encode::muxer::{ContainerMuxer, Mp4Muxer};
pub use crate::export::pipeline::{BackpressurePolicy, CancelToken, ExportPipeline, ExportState};
pub use crate::export::plan::{FramePlan, Phase, PlannedFrame, progress_percent};
pub use crate::export::save::{ExportOutput, FsVideoSaver, VideoSaver};
pub use crate::export::scheduler::{HostScheduler, NoopScheduler, ThreadScheduler};
pub use crate::foundation::core::{Bitrate, Canvas, FrameIndex, FrameRate, Rgba8};
pub use crate::foundation::error::{ExportError, ExportResult};
pub use crate::render::fonts::FontBook;
pub use crate::render::frame::{FrameRenderer, render_still};
pub use crate::render::surface::{FrameRGBA, FrameView, Surface};
pub use crate::scene::config::{
    BackgroundFit, BlendMode, Corner, PositionMode, ShadowConfig, VisualConfig,
};
pub use crate::text::format::{
    FormatMode, TimeValue, UnitFormat, UnitPolicy, display_text, format_countdown,
};
