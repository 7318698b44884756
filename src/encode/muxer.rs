use crate::encode::encoder::{EncodedChunk, EncoderConfig};
use crate::foundation::error::{ExportError, ExportResult};
use muxide::api::{Muxer, MuxerBuilder, VideoCodec};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Container writer capability: append chunks, then finalize into a complete file.
///
/// Chunks are appended in the order received; the muxer neither inspects their order nor
/// deduplicates them. `finalize` consumes the muxer so no chunk can follow it.
pub trait ContainerMuxer: Send {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Append one encoded chunk.
    fn add_chunk(&mut self, chunk: EncodedChunk) -> ExportResult<()>;

    /// Number of chunks appended so far.
    fn chunk_count(&self) -> u64;

    /// Produce the complete, independently playable container bytes.
    fn finalize(self: Box<Self>) -> ExportResult<Vec<u8>>;
}

/// `Write` target shared with the muxer so the bytes can be recovered after it is consumed.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn take(&self) -> ExportResult<Vec<u8>> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| ExportError::muxer_finalize("output buffer lock poisoned"))?;
        Ok(std::mem::take(&mut *guard))
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| std::io::Error::other("output buffer lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Fast-start MP4 muxer writing H.264 into memory.
pub struct Mp4Muxer {
    muxer: Muxer<SharedBuffer>,
    buffer: SharedBuffer,
    chunks: u64,
}

impl Mp4Muxer {
    /// Create a muxer for a single H.264 track matching `cfg`.
    pub fn new(cfg: &EncoderConfig) -> ExportResult<Self> {
        let buffer = SharedBuffer::default();
        let muxer = MuxerBuilder::new(buffer.clone())
            .video(VideoCodec::H264, cfg.width, cfg.height, cfg.fps.as_f64())
            .with_fast_start(true)
            .build()
            .map_err(|e| ExportError::encoder_rejected(format!("mp4 muxer: {e}")))?;
        Ok(Self {
            muxer,
            buffer,
            chunks: 0,
        })
    }
}

impl ContainerMuxer for Mp4Muxer {
    fn name(&self) -> &'static str {
        "mp4"
    }

    fn add_chunk(&mut self, chunk: EncodedChunk) -> ExportResult<()> {
        let pts_secs = chunk.timestamp_us as f64 / 1_000_000.0;
        self.muxer
            .write_video(pts_secs, &chunk.data, chunk.keyframe)
            .map_err(|e| {
                ExportError::muxer(format!("mp4 write_video (frame {}): {e}", chunk.index.0))
            })?;
        self.chunks += 1;
        Ok(())
    }

    fn chunk_count(&self) -> u64 {
        self.chunks
    }

    fn finalize(self: Box<Self>) -> ExportResult<Vec<u8>> {
        let Self { muxer, buffer, .. } = *self;
        let stats = muxer
            .finish_with_stats()
            .map_err(|e| ExportError::muxer_finalize(format!("mp4 finish: {e}")))?;
        tracing::debug!(
            frames = stats.video_frames,
            duration_secs = stats.duration_secs,
            bytes = stats.bytes_written,
            "mp4 finalized"
        );
        buffer.take()
    }
}
