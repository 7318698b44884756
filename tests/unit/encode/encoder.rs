use super::*;

fn cfg(w: u32, h: u32) -> EncoderConfig {
    EncoderConfig::new(
        Canvas::new(w, h),
        FrameRate::new(30).unwrap(),
        Bitrate::from_mbps(5).unwrap(),
    )
}

#[test]
fn config_validation_catches_bad_sizes() {
    assert!(cfg(1920, 1080).validate().is_ok());
    for (w, h) in [(0, 10), (10, 0), (11, 10), (10, 11)] {
        let err = cfg(w, h).validate().unwrap_err();
        assert!(
            matches!(err, ExportError::EncoderConfigurationRejected(_)),
            "{w}x{h}"
        );
    }
}

#[test]
fn keyframes_every_thirty_frames() {
    let keys: Vec<u64> = (0..100u64)
        .filter(|&i| is_keyframe(FrameIndex(i)))
        .collect();
    assert_eq!(keys, vec![0, 30, 60, 90]);
}

#[test]
fn descriptor_derives_timestamp_and_keyframe() {
    let fps = FrameRate::new(12).unwrap();
    let d = FrameDescriptor::new(FrameIndex(30), fps);
    assert_eq!(d.timestamp_us, 2_500_000);
    assert!(d.keyframe);
    let d = FrameDescriptor::new(FrameIndex(31), fps);
    assert!(!d.keyframe);
}
