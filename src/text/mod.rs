//! Countdown text formatting.

/// Remaining-time decomposition and per-unit display policy.
pub mod format;
