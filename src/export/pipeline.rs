use crate::assets::image::{BackgroundImage, preload_background};
use crate::encode::backend::MediaBackend;
use crate::encode::encoder::{ChunkOutput, EncoderConfig, VideoEncoder};
use crate::encode::muxer::ContainerMuxer;
use crate::export::plan::{FramePlan, progress_percent};
use crate::export::save::ExportOutput;
use crate::export::scheduler::{HostScheduler, ThreadScheduler};
use crate::foundation::core::Canvas;
use crate::foundation::error::{ExportError, ExportResult};
use crate::render::fonts::FontBook;
use crate::render::frame::FrameRenderer;
use crate::render::surface::Surface;
use crate::scene::config::VisualConfig;
use crate::text::format::display_text;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Lifecycle of one export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportState {
    /// No export started yet.
    Idle,
    /// Validating input and constructing the encoder and muxer.
    Configuring,
    /// Rendering and submitting frames.
    Rendering,
    /// Waiting for the encoder to emit every submitted frame.
    Flushing,
    /// Producing the container bytes.
    Finalizing,
    /// Export finished and produced output.
    Completed,
    /// Export aborted on an error.
    Failed,
    /// Export stopped through its [`CancelToken`].
    Cancelled,
}

impl ExportState {
    /// `true` for `Completed`, `Failed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Encoder queue limits applied before every submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackpressurePolicy {
    /// Do not submit while the encoder holds more than this many frames.
    pub max_queue_depth: usize,
    /// Fail after this many consecutive polls without the queue shrinking.
    pub max_stalled_polls: u32,
}

impl Default for BackpressurePolicy {
    fn default() -> Self {
        Self {
            max_queue_depth: 5,
            max_stalled_polls: 1_000,
        }
    }
}

/// Shared flag that stops a running export.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// New, unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type SharedMuxer = Arc<Mutex<Option<Box<dyn ContainerMuxer>>>>;

/// Renders a countdown and encodes it into a single video container.
///
/// A pipeline runs exactly one export, on the calling thread. Frames are submitted in strictly
/// increasing index order; the encoder forwards chunks to the muxer in that same order.
pub struct ExportPipeline {
    backend: Box<dyn MediaBackend>,
    renderer: FrameRenderer,
    scheduler: Box<dyn HostScheduler + Send>,
    backpressure: BackpressurePolicy,
    cancel: CancelToken,
    state: ExportState,
    progress: u8,
}

impl ExportPipeline {
    /// Pipeline encoding through `backend` and drawing text with `fonts`.
    pub fn new(backend: Box<dyn MediaBackend>, fonts: FontBook) -> Self {
        Self {
            backend,
            renderer: FrameRenderer::new(fonts),
            scheduler: Box::new(ThreadScheduler::default()),
            backpressure: BackpressurePolicy::default(),
            cancel: CancelToken::new(),
            state: ExportState::Idle,
            progress: 0,
        }
    }

    /// Replace the cooperative scheduler.
    pub fn with_scheduler(mut self, scheduler: impl HostScheduler + Send + 'static) -> Self {
        self.scheduler = Box::new(scheduler);
        self
    }

    /// Replace the backpressure policy.
    pub fn with_backpressure(mut self, policy: BackpressurePolicy) -> Self {
        self.backpressure = policy;
        self
    }

    /// Use `token` for cancellation.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels exports run by this pipeline.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Last reported progress; reset to 0 when an export fails or is cancelled.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Render `config` at `canvas` size and return the finished container.
    ///
    /// `progress` receives `floor(frames_done * 100 / total_frames)` after every frame.
    ///
    /// A pipeline runs a single export; once it has left [`ExportState::Idle`] further calls fail
    /// with [`ExportError::Validation`] and leave its state untouched.
    #[tracing::instrument(skip_all, fields(width = canvas.width, height = canvas.height))]
    pub fn export(
        &mut self,
        config: &VisualConfig,
        canvas: Canvas,
        progress: &mut dyn FnMut(u8),
    ) -> ExportResult<ExportOutput> {
        if self.state != ExportState::Idle {
            return Err(ExportError::validation(format!(
                "pipeline already used (state {:?})",
                self.state
            )));
        }
        self.progress = 0;
        let started = Instant::now();
        let result = self.run(config, canvas, progress);

        match &result {
            Ok(out) => {
                self.transition(ExportState::Completed);
                tracing::info!(
                    frames = out.frame_count,
                    bytes = out.bytes.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "export completed"
                );
            }
            Err(ExportError::Cancelled) => {
                self.transition(ExportState::Cancelled);
                self.progress = 0;
                tracing::info!("export cancelled");
            }
            Err(err) => {
                self.transition(ExportState::Failed);
                self.progress = 0;
                tracing::error!(error = %err, "export failed");
            }
        }
        result
    }

    fn run(
        &mut self,
        config: &VisualConfig,
        canvas: Canvas,
        progress: &mut dyn FnMut(u8),
    ) -> ExportResult<ExportOutput> {
        self.transition(ExportState::Configuring);
        if canvas.is_empty() {
            return Err(ExportError::target_surface_missing(format!(
                "render target has zero size ({}x{})",
                canvas.width, canvas.height
            )));
        }
        config.validate()?;
        let mut surface = Surface::new(canvas)?;
        let plan = FramePlan::from_config(config)?;
        let enc_cfg = EncoderConfig::new(canvas, plan.fps(), config.bitrate()?);

        let (mut encoder, muxer) = self.backend.create(&enc_cfg)?;
        let muxer: SharedMuxer = Arc::new(Mutex::new(Some(muxer)));
        if let Err(err) = encoder.configure(&enc_cfg, chunk_output(Arc::clone(&muxer))) {
            encoder.close();
            return Err(err);
        }
        let background = preload_background(config);

        tracing::info!(
            backend = self.backend.name(),
            encoder = encoder.name(),
            width = canvas.width,
            height = canvas.height,
            fps = enc_cfg.fps.get(),
            bitrate_bps = enc_cfg.bitrate.bps(),
            total_frames = plan.total_frames(),
            "export started"
        );

        self.transition(ExportState::Rendering);
        let rendered = self.render_frames(
            &plan,
            config,
            background.as_ref(),
            &mut surface,
            encoder.as_mut(),
            progress,
        );
        if let Err(err) = rendered {
            if matches!(err, ExportError::Cancelled)
                && let Err(flush_err) = encoder.flush()
            {
                tracing::debug!(error = %flush_err, "flush after cancel failed");
            }
            encoder.close();
            return Err(err);
        }

        self.transition(ExportState::Flushing);
        let flushed = encoder.flush();
        encoder.close();
        drop(encoder);
        flushed?;

        self.transition(ExportState::Finalizing);
        let muxer = muxer
            .lock()
            .map_err(|_| ExportError::muxer_finalize("muxer lock poisoned"))?
            .take()
            .ok_or_else(|| ExportError::muxer_finalize("muxer already finalized"))?;
        let muxed = muxer.chunk_count();
        if muxed != plan.total_frames() {
            return Err(ExportError::encoder(format!(
                "encoder emitted {muxed} chunks for {} frames",
                plan.total_frames()
            )));
        }
        let bytes = muxer.finalize()?;

        Ok(ExportOutput {
            bytes,
            frame_count: plan.total_frames(),
            duration_secs: plan.duration_secs(),
            width: canvas.width,
            height: canvas.height,
        })
    }

    fn render_frames(
        &mut self,
        plan: &FramePlan,
        config: &VisualConfig,
        background: Option<&BackgroundImage>,
        surface: &mut Surface,
        encoder: &mut dyn VideoEncoder,
        progress: &mut dyn FnMut(u8),
    ) -> ExportResult<()> {
        let total = plan.total_frames();
        for frame in plan.iter() {
            if self.cancel.is_cancelled() {
                return Err(ExportError::Cancelled);
            }
            self.wait_for_encoder(encoder)?;

            let text = display_text(config, frame.remaining_secs);
            self.renderer.render(surface, config, background, &text)?;
            encoder.encode(surface.view(), frame.descriptor)?;

            let done = frame.descriptor.index.0 + 1;
            self.progress = progress_percent(done, total);
            progress(self.progress);
            self.scheduler.after_frame(done);
        }
        Ok(())
    }

    fn wait_for_encoder(&mut self, encoder: &dyn VideoEncoder) -> ExportResult<()> {
        let limit = self.backpressure.max_queue_depth;
        let mut depth = encoder.queue_depth();
        let mut stalled = 0u32;
        while depth > limit {
            if self.cancel.is_cancelled() {
                return Err(ExportError::Cancelled);
            }
            self.scheduler.backoff();
            let next = encoder.queue_depth();
            if next < depth {
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= self.backpressure.max_stalled_polls {
                    tracing::warn!(depth = next, polls = stalled, "encoder queue not draining");
                    return Err(ExportError::encoder(format!(
                        "encoder stalled with {next} frames queued"
                    )));
                }
            }
            depth = next;
        }
        Ok(())
    }

    fn transition(&mut self, next: ExportState) {
        tracing::debug!(from = ?self.state, to = ?next, "export state");
        self.state = next;
    }
}

fn chunk_output(muxer: SharedMuxer) -> ChunkOutput {
    Box::new(move |chunk| {
        let mut guard = muxer
            .lock()
            .map_err(|_| ExportError::muxer("muxer lock poisoned"))?;
        let muxer = guard
            .as_mut()
            .ok_or_else(|| ExportError::muxer("chunk arrived after finalize"))?;
        muxer.add_chunk(chunk)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
