use crate::encode::encoder::{EncoderConfig, VideoEncoder};
use crate::encode::ffmpeg::{FfmpegEncoder, FfmpegEncoderOpts};
use crate::encode::memory::{InMemoryEncoder, InMemoryMuxer};
use crate::encode::muxer::{ContainerMuxer, Mp4Muxer};
use crate::foundation::error::ExportResult;

/// Factory pairing an encoder with a container muxer for one export.
pub trait MediaBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Create a fresh, unconfigured encoder and a muxer ready for `cfg`.
    fn create(
        &self,
        cfg: &EncoderConfig,
    ) -> ExportResult<(Box<dyn VideoEncoder>, Box<dyn ContainerMuxer>)>;
}

/// H.264 through `ffmpeg`, muxed into fast-start MP4 in memory.
#[derive(Clone, Debug, Default)]
pub struct FfmpegMp4Backend {
    /// Encoder process options.
    pub opts: FfmpegEncoderOpts,
}

impl MediaBackend for FfmpegMp4Backend {
    fn name(&self) -> &'static str {
        "ffmpeg-mp4"
    }

    fn create(
        &self,
        cfg: &EncoderConfig,
    ) -> ExportResult<(Box<dyn VideoEncoder>, Box<dyn ContainerMuxer>)> {
        cfg.validate()?;
        let muxer = Mp4Muxer::new(cfg)?;
        Ok((
            Box::new(FfmpegEncoder::new(self.opts.clone())),
            Box::new(muxer),
        ))
    }
}

/// Raw frames in a simple length-prefixed container; no external tools needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct InMemoryBackend;

impl MediaBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    fn create(
        &self,
        _cfg: &EncoderConfig,
    ) -> ExportResult<(Box<dyn VideoEncoder>, Box<dyn ContainerMuxer>)> {
        Ok((Box::new(InMemoryEncoder::new()), Box::new(InMemoryMuxer::new())))
    }
}

/// Selectable backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// [`FfmpegMp4Backend`] with default options.
    #[default]
    FfmpegMp4,
    /// [`InMemoryBackend`].
    InMemory,
}

/// Build the backend for `kind`.
pub fn create_backend(kind: BackendKind) -> Box<dyn MediaBackend> {
    match kind {
        BackendKind::FfmpegMp4 => Box::new(FfmpegMp4Backend::default()),
        BackendKind::InMemory => Box::new(InMemoryBackend),
    }
}
