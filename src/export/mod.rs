//! Export orchestration: frame schedule, cooperative scheduling, the pipeline state machine and
//! saving the result.

/// `ExportPipeline` and its lifecycle.
pub mod pipeline;
/// Delay and countdown frame schedule.
pub mod plan;
/// Saving finished exports.
pub mod save;
/// Cooperative yield hooks.
pub mod scheduler;
