use super::*;

#[test]
fn empty_document_yields_application_defaults() {
    let cfg = VisualConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, VisualConfig::default());
    assert_eq!(cfg.font_family, "Arial");
    assert_eq!(cfg.font_size, 144);
    assert_eq!(cfg.minute_format, UnitFormat::TwoDigits);
    assert_eq!(cfg.fps, 12);
    assert_eq!(cfg.bitrate_mbps, 5);
    assert_eq!(cfg.shadow.color, Rgba8::rgba(0, 0, 0, 204));
    cfg.validate().unwrap();
}

#[test]
fn enum_values_are_kebab_case() {
    let cfg = VisualConfig::from_json_str(
        r#"{
            "format_mode": "pure-number",
            "hour_format": "hide",
            "second_format": "show",
            "blend_mode": "color-dodge",
            "background_fit": "contain",
            "position_mode": "custom",
            "corner": "bottom-right"
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.format_mode, FormatMode::PureNumber);
    assert_eq!(cfg.hour_format, UnitFormat::Hide);
    assert_eq!(cfg.second_format, UnitFormat::Show);
    assert_eq!(cfg.blend_mode, BlendMode::ColorDodge);
    assert_eq!(cfg.background_fit, BackgroundFit::Contain);
    assert_eq!(cfg.position_mode, PositionMode::Custom);
    assert_eq!(cfg.corner, Corner::BottomRight);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = VisualConfig::from_json_str(r#"{"font_sise": 20}"#).unwrap_err();
    assert!(matches!(err, ExportError::Validation(_)));
}

#[test]
fn json_roundtrip_preserves_config() {
    let cfg = VisualConfig {
        font_color: Rgba8::rgba(10, 20, 30, 128),
        blend_mode: BlendMode::Multiply,
        separator: " | ".to_owned(),
        ..VisualConfig::default()
    };
    let text = cfg.to_json_pretty().unwrap();
    assert_eq!(VisualConfig::from_json_str(&text).unwrap(), cfg);
}

#[test]
fn validation_enforces_form_ranges() {
    let ok = VisualConfig::default();

    let bad = [
        VisualConfig {
            font_size: 11,
            ..ok.clone()
        },
        VisualConfig {
            font_size: 501,
            ..ok.clone()
        },
        VisualConfig {
            total_seconds: 0,
            ..ok.clone()
        },
        VisualConfig {
            total_seconds: 86_401,
            ..ok.clone()
        },
        VisualConfig {
            start_delay_seconds: 3_601,
            ..ok.clone()
        },
        VisualConfig {
            separator: "::::".to_owned(),
            ..ok.clone()
        },
        VisualConfig {
            fps: 25,
            ..ok.clone()
        },
        VisualConfig {
            bitrate_mbps: 8,
            ..ok.clone()
        },
        VisualConfig {
            font_family: "\"\"".to_owned(),
            ..ok.clone()
        },
        VisualConfig {
            shadow: ShadowConfig {
                blur: 51.0,
                ..ShadowConfig::default()
            },
            ..ok.clone()
        },
        VisualConfig {
            shadow: ShadowConfig {
                offset_y: -51.0,
                ..ShadowConfig::default()
            },
            ..ok.clone()
        },
    ];

    for cfg in bad {
        assert!(cfg.validate().is_err(), "{cfg:?}");
    }

    let edge = VisualConfig {
        font_size: 500,
        total_seconds: 86_400,
        start_delay_seconds: 3_600,
        separator: "·•·".to_owned(),
        fps: 30,
        bitrate_mbps: 20,
        ..ok
    };
    edge.validate().unwrap();
}

#[test]
fn font_family_quotes_are_stripped() {
    let cfg = VisualConfig {
        font_family: "\"Helvetica Neue\", 'Arial'".to_owned(),
        ..VisualConfig::default()
    };
    assert_eq!(cfg.clean_font_family(), "Helvetica Neue, Arial");
}

#[test]
fn total_frames_covers_delay_and_countdown() {
    let cfg = VisualConfig {
        start_delay_seconds: 3,
        total_seconds: 5,
        fps: 6,
        ..VisualConfig::default()
    };
    assert_eq!(cfg.total_frames(), 48);
}

#[test]
fn from_path_resolves_relative_image_against_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("countdown.json");
    std::fs::write(&path, r#"{"background_image": "bg/sky.png"}"#).unwrap();

    let cfg = VisualConfig::from_path(&path).unwrap();
    assert_eq!(
        cfg.background_image.as_deref(),
        Some(dir.path().join("bg/sky.png").as_path())
    );
}

#[test]
fn from_path_reports_missing_file() {
    let err = VisualConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("open countdown config"));
}
