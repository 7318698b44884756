//! Pure layout math for a frame: where the background image lands and where the text anchors.
//!
//! Nothing here touches pixels, so every function is total over validated input.

use crate::foundation::core::{Canvas, Point, Rect, Size};
use crate::scene::config::{BackgroundFit, Corner, PositionMode, VisualConfig};

/// Horizontal text alignment relative to the anchor point (canvas `textAlign`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// Text starts at the anchor.
    Left,
    /// Text is centred on the anchor.
    Center,
    /// Text ends at the anchor.
    Right,
}

/// Vertical text alignment relative to the anchor point (canvas `textBaseline`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Anchor is the top of the em box.
    Top,
    /// Anchor is the middle of the em box.
    Middle,
    /// Anchor is the bottom of the em box.
    Bottom,
}

/// Where and how the countdown text is placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextAnchor {
    /// Anchor point in canvas pixels.
    pub point: Point,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Vertical alignment.
    pub baseline: TextBaseline,
}

/// Destination rectangle of an `image` scaled into `canvas` under `fit`.
///
/// `cover` fills the canvas and may overflow one axis; `contain` fits inside and may letterbox.
/// Either way the image is centred on the overflowing/letterboxed axis and keeps its aspect ratio.
pub fn fit_rect(image: Size, canvas: Canvas, fit: BackgroundFit) -> Rect {
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    if image.width <= 0.0 || image.height <= 0.0 || canvas.is_empty() {
        return Rect::ZERO;
    }

    let img_ratio = image.width / image.height;
    let canvas_ratio = cw / ch;
    let wider = img_ratio > canvas_ratio;

    let fill_height = match fit {
        BackgroundFit::Cover => wider,
        BackgroundFit::Contain => !wider,
    };

    if fill_height {
        let w = ch * img_ratio;
        let x = (cw - w) / 2.0;
        Rect::new(x, 0.0, x + w, ch)
    } else {
        let h = cw / img_ratio;
        let y = (ch - h) / 2.0;
        Rect::new(0.0, y, cw, y + h)
    }
}

/// Text anchor for a position mode.
///
/// In custom mode the offsets are measured inward from the chosen corner and the alignment flips
/// so the text grows away from that corner.
pub fn text_anchor(
    canvas: Canvas,
    mode: PositionMode,
    corner: Corner,
    offset_x: u32,
    offset_y: u32,
) -> TextAnchor {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let ox = f64::from(offset_x);
    let oy = f64::from(offset_y);

    match mode {
        PositionMode::Center => TextAnchor {
            point: Point::new(w / 2.0, h / 2.0),
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        },
        PositionMode::Custom => {
            let (x, align) = match corner {
                Corner::TopLeft | Corner::BottomLeft => (ox, TextAlign::Left),
                Corner::TopRight | Corner::BottomRight => (w - ox, TextAlign::Right),
            };
            let (y, baseline) = match corner {
                Corner::TopLeft | Corner::TopRight => (oy, TextBaseline::Top),
                Corner::BottomLeft | Corner::BottomRight => (h - oy, TextBaseline::Bottom),
            };
            TextAnchor {
                point: Point::new(x, y),
                align,
                baseline,
            }
        }
    }
}

/// [`text_anchor`] for the position settings of `config`.
pub fn text_anchor_for(canvas: Canvas, config: &VisualConfig) -> TextAnchor {
    text_anchor(
        canvas,
        config.position_mode,
        config.corner,
        config.offset_x,
        config.offset_y,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
