//! Randomized checks of the interpolation and preprocessing invariants.
//!
//! Seeded so failures are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use routesync::{Sample, WorldPoint, position_at_time, preprocess, time_at_point};

const CASES: usize = 200;

/// Path with strictly increasing x and time, so no two segments overlap.
fn monotone_path(rng: &mut StdRng) -> Vec<Sample> {
    let len = rng.gen_range(2..30);
    let mut x = rng.gen_range(0.0..100.0);
    let mut time = 0.0;
    let mut path = Vec::with_capacity(len);
    for _ in 0..len {
        path.push(Sample::new(x, rng.gen_range(-200.0..200.0), time));
        x += rng.gen_range(1.0..50.0);
        time += rng.gen_range(1..2_000) as f64;
    }
    path
}

fn raw_recording(rng: &mut StdRng) -> Vec<Sample> {
    let len = rng.gen_range(0..60);
    let mut time = rng.gen_range(0.0..10_000.0);
    (0..len)
        .map(|_| {
            // Occasionally go back in time
            time += rng.gen_range(-200.0..1_000.0);
            Sample::new(
                rng.gen_range(0.0..300.0),
                rng.gen_range(0.0..300.0),
                time,
            )
        })
        .collect()
}

#[test]
fn test_round_trip_within_half_millisecond() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..CASES {
        let path = monotone_path(&mut rng);
        let end = path[path.len() - 1].time;
        let t = rng.gen_range(0.0..=end);

        let p = position_at_time(&path, t).unwrap();
        let back = time_at_point(&path, p).unwrap();
        assert!((back - t).abs() <= 0.5 + 1e-6, "t={t} back={back}");
    }
}

#[test]
fn test_path_start_is_exact() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..CASES {
        let path = monotone_path(&mut rng);
        let p = position_at_time(&path, path[0].time).unwrap();
        assert_eq!(p, WorldPoint::new(path[0].x, path[0].y));
    }
}

#[test]
fn test_interpolation_never_produces_nan() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..CASES {
        let path = preprocess(&raw_recording(&mut rng), 15.0);
        let point = WorldPoint::new(rng.gen_range(-50.0..350.0), rng.gen_range(-50.0..350.0));
        if let Some(t) = time_at_point(&path, point) {
            assert!(t.is_finite());
            if let Some(p) = position_at_time(&path, t) {
                assert!(p.x.is_finite() && p.y.is_finite());
            }
        }
    }
}

#[test]
fn test_preprocess_output_is_monotone() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..CASES {
        let path = preprocess(&raw_recording(&mut rng), 15.0);
        if let Some(first) = path.first() {
            assert_eq!(first.time, 0.0);
        }
        assert!(path.windows(2).all(|w| w[0].time <= w[1].time));
    }
}

#[test]
fn test_preprocess_idempotent() {
    let mut rng = StdRng::seed_from_u64(4321);
    for _ in 0..CASES {
        let threshold = rng.gen_range(0.0..40.0);
        let once = preprocess(&raw_recording(&mut rng), threshold);
        let twice = preprocess(&once, threshold);
        assert_eq!(once, twice);
    }
}
