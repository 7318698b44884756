use crate::encode::annexb::{AccessUnitSplitter, contains_idr, strip_aud};
use crate::encode::encoder::{
    ChunkOutput, EncodedChunk, EncoderConfig, FrameDescriptor, KEYFRAME_INTERVAL, VideoEncoder,
};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ExportError, ExportResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameView;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Options for [`FfmpegEncoder`].
#[derive(Clone, Debug)]
pub struct FfmpegEncoderOpts {
    /// `ffmpeg` executable (looked up on `PATH` when relative).
    pub program: PathBuf,
    /// x264 speed preset.
    pub preset: String,
    /// Background colour used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl Default for FfmpegEncoderOpts {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            preset: "veryfast".to_owned(),
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// State shared between the submitting thread and the stdout reader thread.
#[derive(Default)]
struct Shared {
    submitted: AtomicU64,
    emitted: AtomicU64,
    pending: Mutex<VecDeque<FrameDescriptor>>,
    failure: Mutex<Option<String>>,
}

impl Shared {
    fn fail(&self, msg: String) {
        if let Ok(mut slot) = self.failure.lock()
            && slot.is_none()
        {
            *slot = Some(msg);
        }
    }

    fn failure(&self) -> Option<String> {
        self.failure.lock().ok().and_then(|slot| slot.clone())
    }
}

/// H.264 baseline encoder backed by the system `ffmpeg` (libx264).
///
/// Raw frames are streamed to `ffmpeg` stdin; the Annex-B output is read on a separate thread,
/// split into one access unit per frame and forwarded to the chunk output in submission order.
/// Keyframes are placed by `ffmpeg` on a fixed [`KEYFRAME_INTERVAL`] cadence.
pub struct FfmpegEncoder {
    opts: FfmpegEncoderOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    reader: Option<JoinHandle<()>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    shared: Arc<Shared>,
    scratch: Vec<u8>,
    cfg: Option<EncoderConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegEncoder {
    /// Create an encoder; nothing is spawned until `configure`.
    pub fn new(opts: FfmpegEncoderOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            reader: None,
            stderr_drain: None,
            shared: Arc::new(Shared::default()),
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn runtime_failure(&self) -> Option<ExportError> {
        self.shared.failure().map(ExportError::encoder)
    }

    fn command(&self, cfg: &EncoderConfig) -> Command {
        let mut cmd = Command::new(&self.opts.program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let gop = KEYFRAME_INTERVAL.to_string();
        // Input: opaque RGBA8 (alpha is flattened in `encode`).
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.get().to_string(),
            "-i",
            "pipe:0",
        ]);
        // Output: baseline H.264, no lookahead so each frame is emitted as soon as it is encoded.
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-profile:v",
            "baseline",
            "-preset",
            &self.opts.preset,
            "-tune",
            "zerolatency",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            &cfg.bitrate.bps().to_string(),
            "-g",
            &gop,
            "-keyint_min",
            &gop,
            "-sc_threshold",
            "0",
            "-force_key_frames",
            &format!("expr:eq(mod(n,{gop}),0)"),
            "-bsf:v",
            "h264_metadata=aud=insert",
            "-flush_packets",
            "1",
            "-f",
            "h264",
            "pipe:1",
        ]);
        cmd
    }

    fn join_threads(&mut self) -> ExportResult<Vec<u8>> {
        if let Some(handle) = self.reader.take() {
            handle
                .join()
                .map_err(|_| ExportError::encoder("ffmpeg stdout reader thread panicked"))?;
        }
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ExportError::encoder("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ExportError::encoder(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn name(&self) -> &'static str {
        "ffmpeg-libx264"
    }

    fn configure(&mut self, cfg: &EncoderConfig, output: ChunkOutput) -> ExportResult<()> {
        cfg.validate()?;
        if self.child.is_some() {
            return Err(ExportError::encoder_rejected("ffmpeg encoder already configured"));
        }
        if !is_program_runnable(&self.opts.program) {
            return Err(ExportError::encoder_rejected(format!(
                "'{}' is required for H.264 encoding, but could not be run",
                self.opts.program.display()
            )));
        }

        let mut child = self.command(cfg).spawn().map_err(|e| {
            ExportError::encoder_rejected(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExportError::encoder("failed to open ffmpeg stdin (unexpected)"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExportError::encoder("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExportError::encoder("failed to open ffmpeg stderr (unexpected)"))?;

        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.shared = Arc::new(Shared::default());
        let shared = Arc::clone(&self.shared);
        let reader = std::thread::spawn(move || read_access_units(stdout, output, &shared));

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.get(),
            bps = cfg.bitrate.bps(),
            pid = child.id(),
            "ffmpeg encoder started"
        );

        self.scratch = vec![0u8; cfg.canvas().rgba_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.reader = Some(reader);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(*cfg);
        self.last_idx = None;
        Ok(())
    }

    fn encode(&mut self, frame: FrameView<'_>, desc: FrameDescriptor) -> ExportResult<()> {
        if let Some(err) = self.runtime_failure() {
            return Err(err);
        }
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ExportError::encoder("ffmpeg encoder not configured"))?;
        if let Some(last) = self.last_idx
            && desc.index <= last
        {
            return Err(ExportError::encoder(
                "ffmpeg encoder received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ExportError::encoder(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(ExportError::encoder(
                "frame data size mismatch with width*height*4",
            ));
        }
        self.last_idx = Some(desc.index);

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, frame.data, self.opts.bg_rgba);

        {
            let mut pending = self
                .shared
                .pending
                .lock()
                .map_err(|_| ExportError::encoder("encoder queue lock poisoned"))?;
            pending.push_back(desc);
        }
        self.shared.submitted.fetch_add(1, Ordering::SeqCst);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ExportError::encoder("ffmpeg encoder is already flushed"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            let detail = self
                .shared
                .failure()
                .unwrap_or_else(|| format!("failed to write frame to ffmpeg stdin: {e}"));
            ExportError::encoder(detail)
        })
    }

    fn queue_depth(&self) -> usize {
        let submitted = self.shared.submitted.load(Ordering::SeqCst);
        let emitted = self.shared.emitted.load(Ordering::SeqCst);
        submitted.saturating_sub(emitted) as usize
    }

    fn flush(&mut self) -> ExportResult<()> {
        // EOF on stdin makes ffmpeg drain its pipeline and exit.
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ExportError::encoder("ffmpeg encoder not started"))?;

        let status = child
            .wait()
            .map_err(|e| ExportError::encoder(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = self.join_threads()?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ExportError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        if let Some(err) = self.runtime_failure() {
            return Err(err);
        }

        let submitted = self.shared.submitted.load(Ordering::SeqCst);
        let emitted = self.shared.emitted.load(Ordering::SeqCst);
        if submitted != emitted {
            return Err(ExportError::encoder(format!(
                "ffmpeg emitted {emitted} of {submitted} frames"
            )));
        }
        tracing::debug!(frames = emitted, "ffmpeg encoder flushed");
        self.cfg = None;
        Ok(())
    }

    fn close(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(err) = child.kill() {
                tracing::debug!(error = %err, "ffmpeg already exited");
            }
            let _ = child.wait();
        }
        if let Err(err) = self.join_threads() {
            tracing::warn!(error = %err, "ffmpeg encoder teardown");
        }
        self.cfg = None;
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_access_units(mut stdout: ChildStdout, mut output: ChunkOutput, shared: &Shared) {
    let mut splitter = AccessUnitSplitter::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut forwarding = true;

    loop {
        let n = match stdout.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                shared.fail(format!("ffmpeg stdout read failed: {e}"));
                return;
            }
        };
        for au in splitter.push(&buf[..n]) {
            if forwarding {
                forwarding = emit_access_unit(&au, &mut output, shared);
            }
        }
    }
    if let Some(au) = splitter.finish()
        && forwarding
    {
        emit_access_unit(&au, &mut output, shared);
    }
}

/// Forward one access unit. Returns `false` once forwarding must stop.
fn emit_access_unit(au: &[u8], output: &mut ChunkOutput, shared: &Shared) -> bool {
    let desc = match shared.pending.lock() {
        Ok(mut pending) => pending.pop_front(),
        Err(_) => None,
    };
    let Some(desc) = desc else {
        shared.fail("ffmpeg produced more frames than were submitted".to_owned());
        return false;
    };

    let keyframe = contains_idr(au);
    if keyframe != desc.keyframe {
        tracing::warn!(
            frame = desc.index.0,
            requested = desc.keyframe,
            actual = keyframe,
            "encoder keyframe placement differs from requested cadence"
        );
    }

    let chunk = EncodedChunk {
        data: strip_aud(au),
        index: desc.index,
        timestamp_us: desc.timestamp_us,
        keyframe,
    };
    if let Err(err) = output(chunk) {
        shared.fail(err.to_string());
        return false;
    }
    shared.emitted.fetch_add(1, Ordering::SeqCst);
    true
}

fn flatten_premul_over_bg_to_opaque_rgba8(dst: &mut [u8], src_premul: &[u8], bg_rgba: [u8; 4]) {
    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let r = u16::from(s[0]) + mul_div255_u16(bg_r, inv);
        let g = u16::from(s[1]) + mul_div255_u16(bg_g, inv);
        let b = u16::from(s[2]) + mul_div255_u16(bg_b, inv);

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }
}

fn is_program_runnable(program: &std::path::Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_program_runnable(std::path::Path::new("ffmpeg"))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
