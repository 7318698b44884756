use crate::foundation::core::Size;
use crate::foundation::error::{ExportError, ExportResult};
use crate::foundation::math::mul_div255_u8;
use crate::scene::config::VisualConfig;
use resvg::tiny_skia;
use std::path::Path;

/// A decoded background image, premultiplied and ready to draw.
#[derive(Clone)]
pub struct BackgroundImage {
    pixmap: tiny_skia::Pixmap,
}

impl std::fmt::Debug for BackgroundImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl BackgroundImage {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Intrinsic size as floating-point extents.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    pub(crate) fn pixmap(&self) -> tiny_skia::PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into a premultiplied background image.
pub fn decode_background(bytes: &[u8]) -> ExportResult<BackgroundImage> {
    let dyn_img = ::image::load_from_memory(bytes)
        .map_err(|e| ExportError::image_decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);

    let size = tiny_skia::IntSize::from_wh(width, height)
        .ok_or_else(|| ExportError::image_decode("image has zero width or height"))?;
    let pixmap = tiny_skia::Pixmap::from_vec(data, size)
        .ok_or_else(|| ExportError::image_decode(format!("image {width}x{height} is too large")))?;
    Ok(BackgroundImage { pixmap })
}

/// Read and decode a background image from disk.
pub fn load_background(path: &Path) -> ExportResult<BackgroundImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        ExportError::image_decode(format!("read image '{}': {e}", path.display()))
    })?;
    decode_background(&bytes)
}

/// Load the background image configured in `config`, if any.
///
/// A missing or undecodable image degrades to "no background image": the failure is logged and
/// `None` is returned.
#[tracing::instrument(skip(config), fields(path))]
pub fn preload_background(config: &VisualConfig) -> Option<BackgroundImage> {
    let path = config.background_image.as_deref()?;
    tracing::Span::current().record("path", tracing::field::display(path.display()));

    match load_background(path) {
        Ok(img) => {
            tracing::debug!(
                width = img.width(),
                height = img.height(),
                "background image decoded"
            );
            Some(img)
        }
        Err(err) => {
            tracing::warn!(error = %err, "background image unavailable, continuing without it");
            None
        }
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
