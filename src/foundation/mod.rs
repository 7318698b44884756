//! Shared value types, errors and pixel math.

/// Frame, rate, canvas and colour values.
pub mod core;
/// `ExportError` and `ExportResult`.
pub mod error;
pub(crate) mod math;
