use crate::encode::encoder::FrameDescriptor;
use crate::foundation::core::{FrameIndex, FrameRate};
use crate::foundation::error::ExportResult;
use crate::scene::config::VisualConfig;

/// Which part of the export a frame belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Lead-in frames showing the unchanged initial value.
    Delay,
    /// Frames counting down.
    Countdown,
}

/// One scheduled frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedFrame {
    /// Encoder-facing metadata (global index, timestamp, keyframe flag).
    pub descriptor: FrameDescriptor,
    /// Phase the frame belongs to.
    pub phase: Phase,
    /// 0-based index within `phase`.
    pub phase_index: u64,
    /// Seconds shown on this frame.
    pub remaining_secs: u64,
}

/// Frame schedule for one export: `delay_frames` frames of the initial value, then
/// `countdown_frames` frames counting down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramePlan {
    total_seconds: u64,
    fps: FrameRate,
    delay_frames: u64,
    countdown_frames: u64,
}

impl FramePlan {
    /// Plan `start_delay_seconds` of lead-in followed by a `total_seconds` countdown.
    pub fn new(total_seconds: u32, start_delay_seconds: u32, fps: FrameRate) -> Self {
        Self {
            total_seconds: u64::from(total_seconds),
            fps,
            delay_frames: fps.secs_to_frames(start_delay_seconds),
            countdown_frames: fps.secs_to_frames(total_seconds),
        }
    }

    /// Plan for a validated configuration.
    pub fn from_config(config: &VisualConfig) -> ExportResult<Self> {
        Ok(Self::new(
            config.total_seconds,
            config.start_delay_seconds,
            config.frame_rate()?,
        ))
    }

    /// Frame rate the plan was built for.
    pub fn fps(&self) -> FrameRate {
        self.fps
    }

    /// Frames in the delay phase.
    pub fn delay_frames(&self) -> u64 {
        self.delay_frames
    }

    /// Frames in the countdown phase.
    pub fn countdown_frames(&self) -> u64 {
        self.countdown_frames
    }

    /// Total frames submitted by an export.
    pub fn total_frames(&self) -> u64 {
        self.delay_frames + self.countdown_frames
    }

    /// Output duration, derived only from frame count and fps.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames())
    }

    /// Frame at global index `idx`, or `None` past the end.
    pub fn frame(&self, idx: u64) -> Option<PlannedFrame> {
        if idx >= self.total_frames() {
            return None;
        }
        let (phase, phase_index, remaining_secs) = if idx < self.delay_frames {
            (Phase::Delay, idx, self.total_seconds)
        } else {
            let f = idx - self.delay_frames;
            let elapsed = f / u64::from(self.fps.get());
            (
                Phase::Countdown,
                f,
                self.total_seconds.saturating_sub(elapsed),
            )
        };
        Some(PlannedFrame {
            descriptor: FrameDescriptor::new(FrameIndex(idx), self.fps),
            phase,
            phase_index,
            remaining_secs,
        })
    }

    /// All frames in submission order.
    pub fn iter(&self) -> impl Iterator<Item = PlannedFrame> + '_ {
        (0..self.total_frames()).filter_map(|i| self.frame(i))
    }
}

/// Progress after `done` of `total` frames: `floor(done * 100 / total)`, clamped to 100.
pub fn progress_percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = u128::from(done) * 100 / u128::from(total);
    pct.min(100) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/export/plan.rs"]
mod tests;
