use super::*;

#[test]
fn frame_rate_rejects_zero() {
    assert!(FrameRate::new(0).is_err());
    assert_eq!(FrameRate::new(12).unwrap().get(), 12);
}

#[test]
fn timestamps_follow_index_times_million_over_fps() {
    let fps = FrameRate::new(12).unwrap();
    assert_eq!(fps.timestamp_us(FrameIndex(0)), 0);
    assert_eq!(fps.timestamp_us(FrameIndex(1)), 83_333);
    assert_eq!(fps.timestamp_us(FrameIndex(12)), 1_000_000);

    let fps = FrameRate::new(30).unwrap();
    assert_eq!(fps.timestamp_us(FrameIndex(45)), 1_500_000);
}

#[test]
fn bitrate_is_megabits() {
    assert_eq!(Bitrate::from_mbps(5).unwrap().bps(), 5_000_000);
    assert!(Bitrate::from_mbps(0).is_err());
}

#[test]
fn canvas_emptiness_and_len() {
    assert!(Canvas::new(0, 10).is_empty());
    assert!(Canvas::new(10, 0).is_empty());
    let c = Canvas::new(4, 2);
    assert!(!c.is_empty());
    assert_eq!(c.rgba_len(), 32);
}

#[test]
fn css_colours_parse() {
    assert_eq!(Rgba8::parse("#fff").unwrap(), Rgba8::rgb(255, 255, 255));
    assert_eq!(Rgba8::parse("#1a2B3c").unwrap(), Rgba8::rgb(0x1a, 0x2b, 0x3c));
    assert_eq!(
        Rgba8::parse("#00000080").unwrap(),
        Rgba8::rgba(0, 0, 0, 0x80)
    );
    assert_eq!(
        Rgba8::parse("rgb(10, 20, 30)").unwrap(),
        Rgba8::rgb(10, 20, 30)
    );
    assert_eq!(
        Rgba8::parse("rgba(0, 0, 0, 0.8)").unwrap(),
        Rgba8::rgba(0, 0, 0, 204)
    );
    assert_eq!(Rgba8::parse("transparent").unwrap(), Rgba8::transparent());

    assert!(Rgba8::parse("#12345").is_err());
    assert!(Rgba8::parse("rgba(1, 2, 3)").is_err());
    assert!(Rgba8::parse("hsl(0, 0%, 0%)").is_err());
}

#[test]
fn css_text_is_canonical() {
    assert_eq!(Rgba8::rgb(255, 0, 16).to_css(), "#ff0010");
    assert_eq!(Rgba8::rgba(0, 0, 0, 204).to_css(), "rgba(0, 0, 0, 0.8)");
    assert_eq!(Rgba8::transparent().to_css(), "rgba(0, 0, 0, 0)");
}

#[test]
fn colour_deserializes_from_string_object_and_array() {
    let c: Rgba8 = serde_json::from_str("\"#ff0000\"").unwrap();
    assert_eq!(c, Rgba8::rgb(255, 0, 0));
    let c: Rgba8 = serde_json::from_str(r#"{"r":1,"g":2,"b":3}"#).unwrap();
    assert_eq!(c, Rgba8::rgb(1, 2, 3));
    let c: Rgba8 = serde_json::from_str("[1,2,3,4]").unwrap();
    assert_eq!(c, Rgba8::rgba(1, 2, 3, 4));
    assert!(serde_json::from_str::<Rgba8>("[1,2]").is_err());
}
