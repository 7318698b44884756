use crate::encode::encoder::{
    ChunkOutput, EncodedChunk, EncoderConfig, FrameDescriptor, VideoEncoder,
};
use crate::encode::muxer::ContainerMuxer;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ExportError, ExportResult};
use crate::render::surface::FrameView;

const MAGIC: &[u8; 8] = b"CDRAWV01";

/// Synchronous encoder for tests and debugging.
///
/// Emits one chunk per frame immediately from `encode`, carrying the raw premultiplied RGBA8
/// pixels, so `queue_depth` is always zero.
#[derive(Default)]
pub struct InMemoryEncoder {
    cfg: Option<EncoderConfig>,
    output: Option<ChunkOutput>,
    last_idx: Option<FrameIndex>,
}

impl InMemoryEncoder {
    /// Create an unconfigured encoder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoEncoder for InMemoryEncoder {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    fn configure(&mut self, cfg: &EncoderConfig, output: ChunkOutput) -> ExportResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ExportError::encoder_rejected("frame size must be non-zero"));
        }
        self.cfg = Some(*cfg);
        self.output = Some(output);
        self.last_idx = None;
        Ok(())
    }

    fn encode(&mut self, frame: FrameView<'_>, desc: FrameDescriptor) -> ExportResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ExportError::encoder("in-memory encoder not configured"))?;
        if let Some(last) = self.last_idx
            && desc.index <= last
        {
            return Err(ExportError::encoder(
                "in-memory encoder received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ExportError::encoder(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.last_idx = Some(desc.index);

        let output = self
            .output
            .as_mut()
            .ok_or_else(|| ExportError::encoder("in-memory encoder is closed"))?;
        output(EncodedChunk {
            data: frame.data.to_vec(),
            index: desc.index,
            timestamp_us: desc.timestamp_us,
            keyframe: desc.keyframe,
        })
    }

    fn queue_depth(&self) -> usize {
        0
    }

    fn flush(&mut self) -> ExportResult<()> {
        Ok(())
    }

    fn close(&mut self) {
        self.output = None;
        self.cfg = None;
    }
}

/// Muxer collecting chunks into a simple length-prefixed container.
///
/// Layout: 8-byte magic, then per chunk `timestamp_us: u64 LE`, `keyframe: u8`,
/// `len: u32 LE`, payload. Use [`InMemoryMuxer::parse`] to read it back.
#[derive(Debug, Default)]
pub struct InMemoryMuxer {
    chunks: Vec<EncodedChunk>,
}

impl InMemoryMuxer {
    /// Create an empty muxer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode bytes produced by [`ContainerMuxer::finalize`] on this muxer.
    pub fn parse(bytes: &[u8]) -> ExportResult<Vec<EncodedChunk>> {
        let body = bytes
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| ExportError::validation("not an in-memory container"))?;

        let mut chunks = Vec::new();
        let mut rest = body;
        while !rest.is_empty() {
            if rest.len() < 13 {
                return Err(ExportError::validation("truncated chunk header"));
            }
            let (ts, tail) = rest.split_at(8);
            let keyframe = tail[0] != 0;
            let (len, tail) = tail[1..].split_at(4);
            let mut ts_bytes = [0u8; 8];
            ts_bytes.copy_from_slice(ts);
            let mut len_bytes = [0u8; 4];
            len_bytes.copy_from_slice(len);
            let len = u32::from_le_bytes(len_bytes) as usize;
            if tail.len() < len {
                return Err(ExportError::validation("truncated chunk payload"));
            }
            let (data, tail) = tail.split_at(len);
            chunks.push(EncodedChunk {
                data: data.to_vec(),
                index: FrameIndex(chunks.len() as u64),
                timestamp_us: u64::from_le_bytes(ts_bytes),
                keyframe,
            });
            rest = tail;
        }
        Ok(chunks)
    }
}

impl ContainerMuxer for InMemoryMuxer {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    fn add_chunk(&mut self, chunk: EncodedChunk) -> ExportResult<()> {
        if chunk.data.len() > u32::MAX as usize {
            return Err(ExportError::muxer("chunk larger than 4 GiB"));
        }
        self.chunks.push(chunk);
        Ok(())
    }

    fn chunk_count(&self) -> u64 {
        self.chunks.len() as u64
    }

    fn finalize(self: Box<Self>) -> ExportResult<Vec<u8>> {
        let payload: usize = self.chunks.iter().map(|c| c.data.len() + 13).sum();
        let mut out = Vec::with_capacity(MAGIC.len() + payload);
        out.extend_from_slice(MAGIC);
        for c in &self.chunks {
            out.extend_from_slice(&c.timestamp_us.to_le_bytes());
            out.push(u8::from(c.keyframe));
            out.extend_from_slice(&(c.data.len() as u32).to_le_bytes());
            out.extend_from_slice(&c.data);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/memory.rs"]
mod tests;
