use std::time::Duration;

/// Yield every `YIELD_EVERY` frames.
pub const YIELD_EVERY: u64 = 30;
/// Pause for recovery every `RECOVER_EVERY` frames.
pub const RECOVER_EVERY: u64 = 100;

/// Cooperative scheduling hooks the export loop calls between frames.
///
/// Implementations decide what "yielding" means for their host; none of them affect output.
pub trait HostScheduler {
    /// Hand control back to the host for one tick.
    fn yield_tick(&mut self);

    /// Longer pause to let encoder resources recover.
    fn recovery_pause(&mut self);

    /// Wait once while the encoder queue is over its limit.
    fn backoff(&mut self);

    /// Run the periodic hooks due after `frames_done` submitted frames.
    fn after_frame(&mut self, frames_done: u64) {
        if frames_done.is_multiple_of(YIELD_EVERY) {
            self.yield_tick();
        }
        if frames_done.is_multiple_of(RECOVER_EVERY) {
            self.recovery_pause();
        }
    }
}

/// Scheduler for a dedicated export thread: yields the OS thread and sleeps.
#[derive(Clone, Copy, Debug)]
pub struct ThreadScheduler {
    /// Sleep between backpressure polls.
    pub backoff: Duration,
    /// Sleep for [`HostScheduler::recovery_pause`].
    pub recovery: Duration,
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self {
            backoff: Duration::from_millis(10),
            recovery: Duration::from_millis(50),
        }
    }
}

impl HostScheduler for ThreadScheduler {
    fn yield_tick(&mut self) {
        std::thread::yield_now();
    }

    fn recovery_pause(&mut self) {
        std::thread::sleep(self.recovery);
    }

    fn backoff(&mut self) {
        std::thread::sleep(self.backoff);
    }
}

/// Scheduler that never waits; for headless runs and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopScheduler;

impl HostScheduler for NoopScheduler {
    fn yield_tick(&mut self) {}

    fn recovery_pause(&mut self) {}

    fn backoff(&mut self) {}
}

#[cfg(test)]
#[path = "../../tests/unit/export/scheduler.rs"]
mod tests;
