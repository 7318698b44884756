//! CPU rasterisation of countdown frames.

/// Font database and family fallback.
pub mod fonts;
/// `FrameRenderer`: background, image placement and text layer.
pub mod frame;
/// Background fit and text anchor geometry.
pub mod geometry;
/// Explicit per-frame drawing state.
pub mod state;
/// Reusable raster target and frame buffers.
pub mod surface;
