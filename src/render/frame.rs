use crate::assets::image::{BackgroundImage, preload_background};
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ExportError, ExportResult};
use crate::render::fonts::FontBook;
use crate::render::geometry::{TextAlign, TextBaseline, fit_rect};
use crate::render::state::{DEFAULT_COMPOSITE, DrawState};
use crate::render::surface::{FrameRGBA, Surface};
use crate::scene::config::VisualConfig;
use crate::text::format::display_text;
use resvg::tiny_skia;
use std::fmt::Write as _;

struct TextLayer {
    text: String,
    state: DrawState,
    pixmap: tiny_skia::Pixmap,
}

/// Draws one countdown frame onto a [`Surface`].
///
/// The renderer owns no per-frame state besides a cache of the last rasterised text layer, which
/// is keyed by the display string and the full [`DrawState`]. The surface itself is cleared and
/// redrawn on every call.
pub struct FrameRenderer {
    fonts: FontBook,
    text_layer: Option<TextLayer>,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("fonts", &self.fonts)
            .field(
                "cached_text",
                &self.text_layer.as_ref().map(|l| l.text.as_str()),
            )
            .finish()
    }
}

impl FrameRenderer {
    /// Create a renderer drawing text with `fonts`.
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            text_layer: None,
        }
    }

    /// Fonts used for the text layer.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Draw background, optional image and `text` for `config` onto `surface`.
    pub fn render(
        &mut self,
        surface: &mut Surface,
        config: &VisualConfig,
        background: Option<&BackgroundImage>,
        text: &str,
    ) -> ExportResult<()> {
        let canvas = surface.canvas();
        let pixmap = surface.pixmap_mut();

        draw_background(pixmap, canvas, config, background);

        if text.is_empty() {
            return Ok(());
        }
        let state = DrawState::for_text(config, canvas);
        let layer = self.text_layer(canvas, &state, text)?;

        let paint = tiny_skia::PixmapPaint {
            opacity: 1.0,
            blend_mode: state.composite,
            quality: tiny_skia::FilterQuality::Nearest,
        };
        pixmap.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &paint,
            tiny_skia::Transform::identity(),
            None,
        );
        Ok(())
    }

    fn text_layer(
        &mut self,
        canvas: Canvas,
        state: &DrawState,
        text: &str,
    ) -> ExportResult<&tiny_skia::Pixmap> {
        let stale = match &self.text_layer {
            Some(l) => {
                l.text != text
                    || l.state != *state
                    || l.pixmap.width() != canvas.width
                    || l.pixmap.height() != canvas.height
            }
            None => true,
        };
        if stale {
            let pixmap = rasterize_text(&self.fonts, canvas, state, text)?;
            self.text_layer = Some(TextLayer {
                text: text.to_owned(),
                state: state.clone(),
                pixmap,
            });
        }
        self.text_layer
            .as_ref()
            .map(|l| &l.pixmap)
            .ok_or_else(|| ExportError::render("text layer cache is empty"))
    }
}

fn draw_background(
    pixmap: &mut tiny_skia::Pixmap,
    canvas: Canvas,
    config: &VisualConfig,
    background: Option<&BackgroundImage>,
) {
    // `fill` replaces every pixel, so nothing survives from the previous frame.
    pixmap.fill(to_skia_color(config.background_color));

    let Some(img) = background else {
        return;
    };
    let dst = fit_rect(img.size(), canvas, config.background_fit);
    if dst.is_zero_area() {
        return;
    }
    let sx = (dst.width() / f64::from(img.width())) as f32;
    let sy = (dst.height() / f64::from(img.height())) as f32;
    let xform = tiny_skia::Transform::from_row(sx, 0.0, 0.0, sy, dst.x0 as f32, dst.y0 as f32);

    let paint = tiny_skia::PixmapPaint {
        opacity: 1.0,
        blend_mode: DEFAULT_COMPOSITE,
        quality: tiny_skia::FilterQuality::Bilinear,
    };
    pixmap.draw_pixmap(0, 0, img.pixmap(), &paint, xform, None);
}

fn to_skia_color(c: Rgba8) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rasterize_text(
    fonts: &FontBook,
    canvas: Canvas,
    state: &DrawState,
    text: &str,
) -> ExportResult<tiny_skia::Pixmap> {
    let svg = text_layer_svg(canvas, state, text);
    let opts = fonts.usvg_options();
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| ExportError::render(format!("build text layer: {e}")))?;

    let mut pixmap = tiny_skia::Pixmap::new(canvas.width, canvas.height).ok_or_else(|| {
        ExportError::render(format!(
            "failed to allocate {}x{} text layer",
            canvas.width, canvas.height
        ))
    })?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    tracing::trace!(text, "text layer rasterised");
    Ok(pixmap)
}

/// SVG document holding just the text draw (and its shadow) on a transparent canvas.
pub(crate) fn text_layer_svg(canvas: Canvas, state: &DrawState, text: &str) -> String {
    let (w, h) = (canvas.width, canvas.height);
    let mut svg = String::with_capacity(512);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );

    let shadow = !state.shadow.is_none();
    if shadow {
        let s = &state.shadow;
        // Canvas `shadowBlur` is twice the Gaussian standard deviation.
        let _ = write!(
            svg,
            r#"<defs><filter id="shadow" filterUnits="userSpaceOnUse" x="0" y="0" width="{w}" height="{h}"><feDropShadow dx="{dx}" dy="{dy}" stdDeviation="{sd}" flood-color="{color}" flood-opacity="{opacity}"/></filter></defs>"#,
            dx = s.offset.x,
            dy = s.offset.y,
            sd = s.blur / 2.0,
            color = s.color.hex_rgb(),
            opacity = s.color.opacity(),
        );
    }

    let anchor = match state.anchor.align {
        TextAlign::Left => "start",
        TextAlign::Center => "middle",
        TextAlign::Right => "end",
    };
    let baseline = match state.anchor.baseline {
        TextBaseline::Top => "text-before-edge",
        TextBaseline::Middle => "central",
        TextBaseline::Bottom => "text-after-edge",
    };

    let _ = write!(
        svg,
        r#"<text x="{x}" y="{y}" font-family="'{family}', sans-serif" font-size="{size}" fill="{fill}" fill-opacity="{fill_opacity}" text-anchor="{anchor}" dominant-baseline="{baseline}" xml:space="preserve""#,
        x = state.anchor.point.x,
        y = state.anchor.point.y,
        family = xml_escape(&state.font_family),
        size = state.font_size,
        fill = state.fill.hex_rgb(),
        fill_opacity = state.fill.opacity(),
    );
    if shadow {
        svg.push_str(r#" filter="url(#shadow)""#);
    }
    let _ = write!(svg, ">{}</text></svg>", xml_escape(text));
    svg
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a single still frame showing `remaining_secs`, e.g. for previews and thumbnails.
///
/// Uses the same renderer and formatter as an export, so the still matches the exported video
/// pixel for pixel at that second.
#[tracing::instrument(skip(config, fonts))]
pub fn render_still(
    config: &VisualConfig,
    canvas: Canvas,
    remaining_secs: u64,
    fonts: &FontBook,
) -> ExportResult<FrameRGBA> {
    let mut surface = Surface::new(canvas)?;
    let background = preload_background(config);
    let mut renderer = FrameRenderer::new(fonts.clone());
    let text = display_text(config, remaining_secs);
    renderer.render(&mut surface, config, background.as_ref(), &text)?;
    Ok(surface.to_frame())
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
