use crate::foundation::core::{Canvas, Rgba8, Vec2};
use crate::render::geometry::{TextAnchor, text_anchor_for};
use crate::scene::config::{BlendMode, VisualConfig};
use resvg::tiny_skia;

/// Drop shadow applied to the text draw only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowState {
    /// Shadow colour.
    pub color: Rgba8,
    /// Blur radius in pixels (canvas `shadowBlur`).
    pub blur: f32,
    /// Offset in pixels.
    pub offset: Vec2,
}

impl ShadowState {
    /// Neutral shadow: transparent, no blur, no offset.
    pub fn none() -> Self {
        Self {
            color: Rgba8::transparent(),
            blur: 0.0,
            offset: Vec2::ZERO,
        }
    }

    /// Return `true` when drawing this shadow would leave no mark.
    pub fn is_none(&self) -> bool {
        self.color.is_transparent()
    }
}

/// Complete drawing state for the text of one frame.
///
/// Built fresh from the config for every draw so no shadow or composite setting can leak from one
/// frame into the next.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawState {
    /// Font family with quotes stripped.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Text fill colour.
    pub fill: Rgba8,
    /// Drop shadow, neutral when disabled.
    pub shadow: ShadowState,
    /// Composite operator for the text layer.
    pub composite: tiny_skia::BlendMode,
    /// Text anchor and alignment.
    pub anchor: TextAnchor,
}

impl DrawState {
    /// Text drawing state for `config` on a canvas of `canvas` size.
    pub fn for_text(config: &VisualConfig, canvas: Canvas) -> Self {
        let shadow = if config.shadow.enabled {
            ShadowState {
                color: config.shadow.color,
                blur: config.shadow.blur.max(0.0),
                offset: Vec2::new(
                    f64::from(config.shadow.offset_x),
                    f64::from(config.shadow.offset_y),
                ),
            }
        } else {
            ShadowState::none()
        };

        Self {
            font_family: config.clean_font_family(),
            font_size: config.font_size as f32,
            fill: config.font_color,
            shadow,
            composite: composite_op(config.blend_mode),
            anchor: text_anchor_for(canvas, config),
        }
    }
}

/// The default composite operator (`source-over`).
pub const DEFAULT_COMPOSITE: tiny_skia::BlendMode = tiny_skia::BlendMode::SourceOver;

/// Map a canvas composite operator onto the raster blend mode.
pub fn composite_op(mode: BlendMode) -> tiny_skia::BlendMode {
    use tiny_skia::BlendMode as B;
    match mode {
        BlendMode::None | BlendMode::SourceOver => B::SourceOver,
        BlendMode::SourceIn => B::SourceIn,
        BlendMode::SourceOut => B::SourceOut,
        BlendMode::SourceAtop => B::SourceAtop,
        BlendMode::DestinationOver => B::DestinationOver,
        BlendMode::DestinationIn => B::DestinationIn,
        BlendMode::DestinationOut => B::DestinationOut,
        BlendMode::DestinationAtop => B::DestinationAtop,
        BlendMode::Lighter => B::Plus,
        BlendMode::Copy => B::Source,
        BlendMode::Xor => B::Xor,
        BlendMode::Multiply => B::Multiply,
        BlendMode::Screen => B::Screen,
        BlendMode::Overlay => B::Overlay,
        BlendMode::Darken => B::Darken,
        BlendMode::Lighten => B::Lighten,
        BlendMode::ColorDodge => B::ColorDodge,
        BlendMode::ColorBurn => B::ColorBurn,
        BlendMode::HardLight => B::HardLight,
        BlendMode::SoftLight => B::SoftLight,
        BlendMode::Difference => B::Difference,
        BlendMode::Exclusion => B::Exclusion,
        BlendMode::Hue => B::Hue,
        BlendMode::Saturation => B::Saturation,
        BlendMode::Color => B::Color,
        BlendMode::Luminosity => B::Luminosity,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/state.rs"]
mod tests;
