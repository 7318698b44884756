//! Export settings model.

/// `VisualConfig` and its enums.
pub mod config;
