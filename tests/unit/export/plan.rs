use super::*;

fn fps(n: u32) -> FrameRate {
    FrameRate::new(n).unwrap()
}

#[test]
fn frame_count_covers_delay_and_countdown() {
    let plan = FramePlan::new(5, 3, fps(12));
    assert_eq!(plan.delay_frames(), 36);
    assert_eq!(plan.countdown_frames(), 60);
    assert_eq!(plan.total_frames(), 96);
    assert_eq!(plan.iter().count(), 96);
    assert!((plan.duration_secs() - 8.0).abs() < 1e-9);
    assert!(plan.frame(96).is_none());
}

#[test]
fn delay_holds_initial_value_then_counts_down() {
    let plan = FramePlan::new(5, 3, fps(1));
    let shown: Vec<u64> = plan.iter().map(|f| f.remaining_secs).collect();
    assert_eq!(shown, vec![5, 5, 5, 5, 4, 3, 2, 1]);

    let phases: Vec<Phase> = plan.iter().map(|f| f.phase).collect();
    assert_eq!(&phases[..3], &[Phase::Delay; 3]);
    assert_eq!(&phases[3..], &[Phase::Countdown; 5]);
    assert_eq!(plan.frame(3).unwrap().phase_index, 0);
}

#[test]
fn countdown_decrements_once_per_second_of_frames() {
    let plan = FramePlan::new(2, 0, fps(6));
    let shown: Vec<u64> = plan.iter().map(|f| f.remaining_secs).collect();
    assert_eq!(shown, vec![2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1]);
}

#[test]
fn keyframes_count_from_export_start_across_phases() {
    let plan = FramePlan::new(4, 2, fps(24));
    let keys: Vec<u64> = plan
        .iter()
        .filter(|f| f.descriptor.keyframe)
        .map(|f| f.descriptor.index.0)
        .collect();
    assert_eq!(keys, vec![0, 30, 60, 90, 120]);
}

#[test]
fn indices_and_timestamps_strictly_increase() {
    let plan = FramePlan::new(3, 1, fps(30));
    let mut prev: Option<PlannedFrame> = None;
    for f in plan.iter() {
        if let Some(p) = prev {
            assert_eq!(f.descriptor.index.0, p.descriptor.index.0 + 1);
            assert!(f.descriptor.timestamp_us > p.descriptor.timestamp_us);
        }
        prev = Some(f);
    }
    assert_eq!(plan.frame(30).unwrap().descriptor.timestamp_us, 1_000_000);
}

#[test]
fn progress_is_floored_and_ends_at_100() {
    assert_eq!(progress_percent(0, 8), 0);
    assert_eq!(progress_percent(1, 8), 12);
    assert_eq!(progress_percent(7, 8), 87);
    assert_eq!(progress_percent(8, 8), 100);
    assert_eq!(progress_percent(299, 300), 99);
    assert_eq!(progress_percent(0, 0), 100);
}

#[test]
fn from_config_uses_config_fps() {
    let cfg = VisualConfig {
        total_seconds: 10,
        start_delay_seconds: 2,
        fps: 6,
        ..VisualConfig::default()
    };
    let plan = FramePlan::from_config(&cfg).unwrap();
    assert_eq!(plan.total_frames(), 72);
    assert_eq!(plan.fps().get(), 6);
}
