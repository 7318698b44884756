//! Background image loading.

/// Decode and preload of the optional background image.
pub mod image;
