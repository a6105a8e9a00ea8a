//! Tests for raw sample preprocessing

use routesync::{
    EngineConfig, Route, RouteRecord, Sample, apply_time_offset, prepare_path, preprocess,
};

fn s(x: f64, y: f64, time: f64) -> Sample {
    Sample::new(x, y, time)
}

#[test]
fn test_empty_and_single_sample() {
    assert!(preprocess(&[], 15.0).is_empty());

    let single = preprocess(&[s(10.0, 20.0, 12_345.0)], 15.0);
    assert_eq!(single, vec![s(10.0, 20.0, 0.0)]);
}

#[test]
fn test_first_and_last_always_kept() {
    // Both samples are within the threshold of each other
    let path = preprocess(&[s(0.0, 0.0, 1_000.0), s(1.0, 1.0, 3_000.0)], 15.0);
    assert_eq!(path, vec![s(0.0, 0.0, 0.0), s(1.0, 1.0, 2_000.0)]);
}

#[test]
fn test_idle_jitter_trimmed_at_both_ends() {
    let raw = vec![
        s(0.0, 0.0, 10_000.0),
        s(2.0, 1.0, 11_000.0),
        s(-3.0, 4.0, 12_000.0),
        s(50.0, 0.0, 13_000.0),
        s(100.0, 0.0, 14_000.0),
        s(151.0, 2.0, 15_000.0),
        s(148.0, -3.0, 16_000.0),
        s(150.0, 0.0, 17_000.0),
    ];
    let path = preprocess(&raw, 15.0);

    assert_eq!(
        path,
        vec![
            s(0.0, 0.0, 0.0),
            s(50.0, 0.0, 3_000.0),
            s(100.0, 0.0, 4_000.0),
            s(150.0, 0.0, 7_000.0),
        ]
    );
}

#[test]
fn test_threshold_is_strict() {
    // Exactly at the threshold: kept
    let raw = vec![s(0.0, 0.0, 0.0), s(15.0, 0.0, 100.0), s(100.0, 0.0, 200.0)];
    assert_eq!(preprocess(&raw, 15.0).len(), 3);

    // Just inside: dropped
    let raw = vec![s(0.0, 0.0, 0.0), s(14.9, 0.0, 100.0), s(100.0, 0.0, 200.0)];
    assert_eq!(preprocess(&raw, 15.0).len(), 2);
}

#[test]
fn test_zero_threshold_keeps_everything() {
    let raw = vec![s(0.0, 0.0, 0.0), s(0.0, 0.0, 100.0), s(0.0, 0.0, 200.0)];
    assert_eq!(preprocess(&raw, 0.0).len(), 3);
}

#[test]
fn test_times_non_decreasing_and_start_at_zero() {
    let raw = vec![
        s(0.0, 0.0, 500.0),
        s(20.0, 0.0, 700.0),
        s(40.0, 0.0, 700.0),
        s(60.0, 0.0, 900.0),
    ];
    let path = preprocess(&raw, 15.0);
    assert_eq!(path[0].time, 0.0);
    assert!(path.windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn test_invalid_and_out_of_order_samples_dropped() {
    let raw = vec![
        s(0.0, 0.0, 0.0),
        s(f64::NAN, 5.0, 100.0),
        s(50.0, 0.0, 200.0),
        s(60.0, 0.0, 150.0),
        s(70.0, f64::INFINITY, 250.0),
        s(100.0, 0.0, 300.0),
    ];
    let path = preprocess(&raw, 15.0);
    assert_eq!(
        path,
        vec![s(0.0, 0.0, 0.0), s(60.0, 0.0, 150.0), s(100.0, 0.0, 300.0)]
    );
}

#[test]
fn test_timestamp_spike_does_not_swallow_the_tail() {
    let raw = vec![
        s(0.0, 0.0, 0.0),
        s(100.0, 0.0, 1_000.0),
        s(200.0, 0.0, 9_000_000.0),
        s(300.0, 0.0, 2_000.0),
        s(400.0, 0.0, 3_000.0),
    ];
    let path = preprocess(&raw, 15.0);

    assert_eq!(
        path,
        vec![
            s(0.0, 0.0, 0.0),
            s(100.0, 0.0, 1_000.0),
            s(300.0, 0.0, 2_000.0),
            s(400.0, 0.0, 3_000.0),
        ]
    );
    // The recorded end survives
    assert_eq!(path.last().unwrap().point(), raw[4].point());
}

#[test]
fn test_early_timestamp_dip_dropped_alone() {
    let raw = vec![
        s(0.0, 0.0, 5_000.0),
        s(100.0, 0.0, 6_000.0),
        s(200.0, 0.0, 10.0),
        s(300.0, 0.0, 7_000.0),
        s(400.0, 0.0, 8_000.0),
    ];
    let times: Vec<f64> = preprocess(&raw, 15.0).iter().map(|p| p.time).collect();
    assert_eq!(times, vec![0.0, 1_000.0, 2_000.0, 3_000.0]);
}

#[test]
fn test_idempotent() {
    let raw = vec![
        s(10.0, 10.0, 2_000.0),
        s(12.0, 9.0, 2_500.0),
        s(40.0, 10.0, 3_000.0),
        s(80.0, 30.0, 3_500.0),
        s(120.0, 60.0, 4_000.0),
        s(121.0, 61.0, 4_500.0),
    ];
    let once = preprocess(&raw, 15.0);
    let twice = preprocess(&once, 15.0);
    assert_eq!(once, twice);
}

#[test]
fn test_time_offset_applied_after_trimming() {
    let mut path = preprocess(&[s(0.0, 0.0, 4_000.0), s(100.0, 0.0, 5_000.0)], 15.0);
    apply_time_offset(&mut path, 2_500.0);
    assert_eq!(path[0].time, 2_500.0);
    assert_eq!(path[1].time, 3_500.0);
}

#[test]
fn test_route_from_record_offsets_after_preprocessing() {
    let record = RouteRecord {
        id: "r1".to_string(),
        map: "Narva".to_string(),
        time_offset_ms: 1_000.0,
        path: Some(vec![
            s(0.0, 0.0, 7_000.0),
            s(1.0, 0.0, 7_500.0),
            s(50.0, 0.0, 8_000.0),
            s(100.0, 0.0, 9_000.0),
        ]),
        ..RouteRecord::default()
    };
    let route = Route::from_record(record, &EngineConfig::default());
    let path = route.path.unwrap();

    assert_eq!(path.len(), 3);
    assert_eq!(path[0].time, 1_000.0);
    assert_eq!(path[1].time, 2_000.0);
    assert_eq!(path[2].time, 3_000.0);
}

#[test]
fn test_route_from_record_without_path() {
    let record = RouteRecord {
        id: "empty".to_string(),
        ..RouteRecord::default()
    };
    let route = Route::from_record(record, &EngineConfig::default());
    assert!(route.path.is_none());
    assert!(!route.has_path());
    assert_eq!(route.duration_ms(), 0.0);
}

#[test]
fn test_prepare_path_offset_does_not_change_trimming() {
    let raw = vec![
        s(0.0, 0.0, 0.0),
        s(10.0, 0.0, 100.0),
        s(60.0, 0.0, 200.0),
        s(120.0, 0.0, 300.0),
    ];
    let plain = prepare_path(&raw, 15.0, 0.0);
    let shifted = prepare_path(&raw, 15.0, 5_000.0);

    assert_eq!(plain.len(), shifted.len());
    for (a, b) in plain.iter().zip(&shifted) {
        assert_eq!(a.point(), b.point());
        assert_eq!(a.time + 5_000.0, b.time);
    }
}
