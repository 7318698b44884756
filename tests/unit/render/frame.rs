use super::*;
use crate::assets::image::decode_background;
use crate::render::geometry::{TextAnchor, TextAlign, TextBaseline};
use crate::render::state::ShadowState;
use crate::scene::config::{BackgroundFit, BlendMode, ShadowConfig};

fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> BackgroundImage {
    let img = ::image::RgbaImage::from_pixel(w, h, ::image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ::image::ImageFormat::Png).unwrap();
    decode_background(&out.into_inner()).unwrap()
}

fn renderer() -> FrameRenderer {
    FrameRenderer::new(FontBook::empty())
}

fn base_state() -> DrawState {
    DrawState {
        font_family: "Arial".to_owned(),
        font_size: 144.0,
        fill: Rgba8::rgb(0, 0, 0),
        shadow: ShadowState::none(),
        composite: DEFAULT_COMPOSITE,
        anchor: TextAnchor {
            point: crate::foundation::core::Point::new(50.0, 25.0),
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        },
    }
}

#[test]
fn background_colour_fills_every_pixel() {
    let cfg = VisualConfig {
        background_color: Rgba8::rgb(10, 200, 30),
        ..VisualConfig::default()
    };
    let mut surface = Surface::new(Canvas::new(6, 4)).unwrap();
    renderer().render(&mut surface, &cfg, None, "").unwrap();

    for px in surface.view().data.chunks_exact(4) {
        assert_eq!(px, &[10, 200, 30, 255]);
    }
}

#[test]
fn cover_image_covers_whole_canvas() {
    let cfg = VisualConfig {
        background_color: Rgba8::rgb(255, 255, 255),
        background_fit: BackgroundFit::Cover,
        ..VisualConfig::default()
    };
    let img = solid_png(16, 4, [255, 0, 0, 255]);
    let mut surface = Surface::new(Canvas::new(8, 8)).unwrap();
    renderer()
        .render(&mut surface, &cfg, Some(&img), "")
        .unwrap();

    assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(surface.pixel(7, 7), Some([255, 0, 0, 255]));
    assert_eq!(surface.pixel(4, 4), Some([255, 0, 0, 255]));
}

#[test]
fn contain_image_letterboxes_over_background_colour() {
    let cfg = VisualConfig {
        background_color: Rgba8::rgb(255, 255, 255),
        background_fit: BackgroundFit::Contain,
        ..VisualConfig::default()
    };
    // 4:1 image into a square: drawn 16x4 centred, rows 6..10.
    let img = solid_png(16, 4, [255, 0, 0, 255]);
    let mut surface = Surface::new(Canvas::new(16, 16)).unwrap();
    renderer()
        .render(&mut surface, &cfg, Some(&img), "")
        .unwrap();

    assert_eq!(surface.pixel(8, 0), Some([255, 255, 255, 255]));
    assert_eq!(surface.pixel(8, 15), Some([255, 255, 255, 255]));
    assert_eq!(surface.pixel(8, 8), Some([255, 0, 0, 255]));
}

#[test]
fn translucent_image_composites_over_background_colour() {
    let cfg = VisualConfig {
        background_color: Rgba8::rgb(0, 0, 255),
        ..VisualConfig::default()
    };
    let img = solid_png(4, 4, [255, 0, 0, 0]);
    let mut surface = Surface::new(Canvas::new(4, 4)).unwrap();
    renderer()
        .render(&mut surface, &cfg, Some(&img), "")
        .unwrap();
    assert_eq!(surface.pixel(2, 2), Some([0, 0, 255, 255]));
}

#[test]
fn every_frame_is_fully_redrawn() {
    let img = solid_png(4, 4, [255, 0, 0, 255]);
    let cfg = VisualConfig {
        background_color: Rgba8::rgb(0, 255, 0),
        ..VisualConfig::default()
    };
    let mut r = renderer();
    let mut surface = Surface::new(Canvas::new(4, 4)).unwrap();

    r.render(&mut surface, &cfg, Some(&img), "10").unwrap();
    assert_eq!(surface.pixel(1, 1), Some([255, 0, 0, 255]));

    r.render(&mut surface, &cfg, None, "9").unwrap();
    assert_eq!(surface.pixel(1, 1), Some([0, 255, 0, 255]));
}

#[test]
fn composite_operator_does_not_leak_into_next_frame() {
    let mut r = renderer();
    let mut surface = Surface::new(Canvas::new(8, 8)).unwrap();

    // `copy` replaces the destination with the (transparent) text layer everywhere.
    let copy = VisualConfig {
        blend_mode: BlendMode::Copy,
        ..VisualConfig::default()
    };
    r.render(&mut surface, &copy, None, "5").unwrap();
    assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));

    let normal = VisualConfig::default();
    r.render(&mut surface, &normal, None, "4").unwrap();
    assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn text_layer_markup_maps_alignment() {
    let svg = text_layer_svg(Canvas::new(100, 50), &base_state(), "1:05");
    assert!(svg.contains(r#"text-anchor="middle""#), "{svg}");
    assert!(svg.contains(r#"dominant-baseline="central""#), "{svg}");
    assert!(svg.contains(r#"font-size="144""#), "{svg}");
    assert!(svg.contains(">1:05</text>"), "{svg}");
    assert!(!svg.contains("filter"), "{svg}");

    let mut state = base_state();
    state.anchor.align = TextAlign::Right;
    state.anchor.baseline = TextBaseline::Bottom;
    let svg = text_layer_svg(Canvas::new(100, 50), &state, "1");
    assert!(svg.contains(r#"text-anchor="end""#), "{svg}");
    assert!(svg.contains(r#"dominant-baseline="text-after-edge""#), "{svg}");
}

#[test]
fn text_layer_markup_escapes_text_and_family() {
    let mut state = base_state();
    state.font_family = "Fira & <Co>".to_owned();
    let svg = text_layer_svg(Canvas::new(100, 50), &state, "<1&2>");
    assert!(svg.contains("&lt;1&amp;2&gt;</text>"), "{svg}");
    assert!(svg.contains("'Fira &amp; &lt;Co&gt;', sans-serif"), "{svg}");
}

#[test]
fn enabled_shadow_adds_drop_shadow_filter() {
    let cfg = VisualConfig {
        shadow: ShadowConfig {
            enabled: true,
            ..ShadowConfig::default()
        },
        ..VisualConfig::default()
    };
    let state = DrawState::for_text(&cfg, Canvas::new(100, 50));
    let svg = text_layer_svg(Canvas::new(100, 50), &state, "9");
    assert!(svg.contains("<feDropShadow"), "{svg}");
    assert!(svg.contains(r#"stdDeviation="5""#), "{svg}");
    assert!(svg.contains(r#"dx="2""#), "{svg}");
    assert!(svg.contains(r##"flood-color="#000000""##), "{svg}");
    assert!(svg.contains(r#"filter="url(#shadow)""#), "{svg}");
}

#[test]
fn still_frame_has_canvas_size() {
    let cfg = VisualConfig::default();
    let frame = render_still(&cfg, Canvas::new(32, 18), 42, &FontBook::empty()).unwrap();
    assert_eq!((frame.width, frame.height), (32, 18));
    assert_eq!(frame.data.len(), 32 * 18 * 4);
    assert!(frame.premultiplied);
}

#[test]
fn still_frame_rejects_empty_canvas() {
    let err = render_still(
        &VisualConfig::default(),
        Canvas::new(0, 0),
        1,
        &FontBook::empty(),
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::TargetSurfaceMissing(_)));
}
