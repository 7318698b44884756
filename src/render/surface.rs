use crate::foundation::core::Canvas;
use crate::foundation::error::{ExportError, ExportResult};
use resvg::tiny_skia;

/// A rendered frame as RGBA8 pixels.
///
/// Frames produced by the renderer are **premultiplied alpha**; the `premultiplied` flag makes
/// this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data (what image encoders expect).
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 || a == 255 {
                if a == 0 {
                    px[..3].fill(0);
                }
                continue;
            }
            for c in &mut px[..3] {
                let v = (u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a);
                *c = v.min(255) as u8;
            }
        }
        out
    }
}

/// Borrowed view of a surface's current pixels (premultiplied RGBA8).
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub data: &'a [u8],
}

impl FrameView<'_> {
    /// Owned copy of the viewed pixels.
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.data.to_vec(),
            premultiplied: true,
        }
    }
}

/// The single raster target reused for every frame of an export.
///
/// Callers must fully redraw it per frame; nothing is carried over between draws.
pub struct Surface {
    pixmap: tiny_skia::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl Surface {
    /// Allocate a transparent surface of `canvas` size.
    pub fn new(canvas: Canvas) -> ExportResult<Self> {
        if canvas.is_empty() {
            return Err(ExportError::target_surface_missing(format!(
                "canvas has zero dimension ({}x{})",
                canvas.width, canvas.height
            )));
        }
        let pixmap = tiny_skia::Pixmap::new(canvas.width, canvas.height).ok_or_else(|| {
            ExportError::target_surface_missing(format!(
                "failed to allocate {}x{} surface",
                canvas.width, canvas.height
            ))
        })?;
        Ok(Self { pixmap })
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.pixmap.width(), self.pixmap.height())
    }

    /// Borrow the current pixels.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
            data: self.pixmap.data(),
        }
    }

    /// Owned copy of the current pixels.
    pub fn to_frame(&self) -> FrameRGBA {
        self.view().to_frame()
    }

    /// Premultiplied RGBA of one pixel, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let px = self.pixmap.pixel(x, y)?;
        Some([px.red(), px.green(), px.blue(), px.alpha()])
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut tiny_skia::Pixmap {
        &mut self.pixmap
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
