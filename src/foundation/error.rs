/// Convenience result type used across the renderer and exporter.
pub type ExportResult<T> = Result<T, ExportError>;

/// Top-level error taxonomy used by the render/encode/export APIs.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Invalid user-provided configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The render target is absent or has a zero dimension.
    #[error("render target missing: {0}")]
    TargetSurfaceMissing(String),

    /// The configured background image could not be read or decoded.
    #[error("image decode failed: {0}")]
    ImageDecodeFailed(String),

    /// The encoder refused the requested codec/bitrate/resolution combination.
    #[error("encoder configuration rejected: {0}")]
    EncoderConfigurationRejected(String),

    /// The encoder failed while frames were in flight.
    #[error("encoder error: {0}")]
    EncoderRuntime(String),

    /// The container writer rejected a chunk.
    #[error("muxer error: {0}")]
    Muxer(String),

    /// The container could not be finalized into a complete byte buffer.
    #[error("muxer finalize failed: {0}")]
    MuxerFinalizeFailed(String),

    /// Persisting the finished video failed. The bytes are still valid.
    #[error("file save failed: {0}")]
    FileSaveFailed(String),

    /// Rasterisation of a frame failed.
    #[error("render error: {0}")]
    Render(String),

    /// The export was cancelled before completion.
    #[error("export cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExportError {
    /// Build an [`ExportError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`ExportError::TargetSurfaceMissing`] value.
    pub fn target_surface_missing(msg: impl Into<String>) -> Self {
        Self::TargetSurfaceMissing(msg.into())
    }

    /// Build an [`ExportError::ImageDecodeFailed`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecodeFailed(msg.into())
    }

    /// Build an [`ExportError::EncoderConfigurationRejected`] value.
    pub fn encoder_rejected(msg: impl Into<String>) -> Self {
        Self::EncoderConfigurationRejected(msg.into())
    }

    /// Build an [`ExportError::EncoderRuntime`] value.
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::EncoderRuntime(msg.into())
    }

    /// Build an [`ExportError::Muxer`] value.
    pub fn muxer(msg: impl Into<String>) -> Self {
        Self::Muxer(msg.into())
    }

    /// Build an [`ExportError::MuxerFinalizeFailed`] value.
    pub fn muxer_finalize(msg: impl Into<String>) -> Self {
        Self::MuxerFinalizeFailed(msg.into())
    }

    /// Build an [`ExportError::FileSaveFailed`] value.
    pub fn file_save(msg: impl Into<String>) -> Self {
        Self::FileSaveFailed(msg.into())
    }

    /// Build an [`ExportError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Whether this error aborts the whole export.
    ///
    /// Image decode failures degrade to "no background image" and save failures only affect the
    /// save step; everything else is terminal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ImageDecodeFailed(_) | Self::FileSaveFailed(_))
    }

    /// Single human-readable line suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => format!("Invalid settings: {msg}"),
            Self::TargetSurfaceMissing(_) => {
                "Export failed: the output canvas is not available.".to_owned()
            }
            Self::ImageDecodeFailed(_) => {
                "The background image could not be loaded and was skipped.".to_owned()
            }
            Self::EncoderConfigurationRejected(msg) => {
                format!("Export failed: the video encoder rejected these settings ({msg}).")
            }
            Self::EncoderRuntime(msg) => format!("Export failed: video encoding error ({msg})."),
            Self::Muxer(msg) | Self::MuxerFinalizeFailed(msg) => {
                format!("Export failed: could not write the video container ({msg}).")
            }
            Self::FileSaveFailed(msg) => format!("Saving the video failed: {msg}"),
            Self::Render(msg) => format!("Export failed: could not draw a frame ({msg})."),
            Self::Cancelled => "Export cancelled.".to_owned(),
            Self::Other(err) => format!("Export failed: {err:#}"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
