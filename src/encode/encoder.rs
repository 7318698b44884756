use crate::foundation::core::{Bitrate, Canvas, FrameIndex, FrameRate};
use crate::foundation::error::{ExportError, ExportResult};
use crate::render::surface::FrameView;

/// Every `KEYFRAME_INTERVAL`-th frame (counted from export start) is a keyframe.
pub const KEYFRAME_INTERVAL: u64 = 30;

/// Return `true` when frame `idx` must be encoded as a keyframe.
pub fn is_keyframe(idx: FrameIndex) -> bool {
    idx.0 % KEYFRAME_INTERVAL == 0
}

/// Parameters fixed for the lifetime of one encoder session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: FrameRate,
    /// Target bitrate.
    pub bitrate: Bitrate,
}

impl EncoderConfig {
    /// Configuration for frames of `canvas` size.
    pub fn new(canvas: Canvas, fps: FrameRate, bitrate: Bitrate) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            fps,
            bitrate,
        }
    }

    /// Frame size as a canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Reject combinations no H.264 4:2:0 encoder accepts.
    pub fn validate(&self) -> ExportResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ExportError::encoder_rejected(format!(
                "frame size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ExportError::encoder_rejected(format!(
                "frame size must be even for yuv420p H.264, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps.get() == 0 || self.bitrate.bps() == 0 {
            return Err(ExportError::encoder_rejected("fps and bitrate must be > 0"));
        }
        Ok(())
    }
}

/// Per-frame metadata produced by the export loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDescriptor {
    /// 0-based index from export start.
    pub index: FrameIndex,
    /// Presentation timestamp in microseconds (`index * 1_000_000 / fps`).
    pub timestamp_us: u64,
    /// Whether this frame is requested as a keyframe.
    pub keyframe: bool,
}

impl FrameDescriptor {
    /// Descriptor for frame `index` at `fps`.
    pub fn new(index: FrameIndex, fps: FrameRate) -> Self {
        Self {
            index,
            timestamp_us: fps.timestamp_us(index),
            keyframe: is_keyframe(index),
        }
    }
}

/// One encoded frame, handed to the muxer exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Encoded payload (Annex-B for H.264).
    pub data: Vec<u8>,
    /// Frame this chunk encodes.
    pub index: FrameIndex,
    /// Presentation timestamp in microseconds.
    pub timestamp_us: u64,
    /// Whether the payload is independently decodable.
    pub keyframe: bool,
}

/// Sink for chunks emitted by an encoder. Called in submission order.
pub type ChunkOutput = Box<dyn FnMut(EncodedChunk) -> ExportResult<()> + Send>;

/// Minimal capability interface over a (possibly asynchronous) video encoder.
///
/// Ordering contract: `encode` is called with strictly increasing frame indices, and chunks reach
/// the [`ChunkOutput`] in the same order. `encode` returns once the frame is submitted; chunks may
/// arrive later on another thread.
pub trait VideoEncoder: Send {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Start a session. Must be called once before any `encode`.
    fn configure(&mut self, cfg: &EncoderConfig, output: ChunkOutput) -> ExportResult<()>;

    /// Submit one frame.
    fn encode(&mut self, frame: FrameView<'_>, desc: FrameDescriptor) -> ExportResult<()>;

    /// Frames submitted but not yet emitted as chunks.
    fn queue_depth(&self) -> usize;

    /// Block until every submitted frame has been emitted.
    fn flush(&mut self) -> ExportResult<()>;

    /// Release all resources. Idempotent; also used for teardown after a failure.
    fn close(&mut self);
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
