//! Tests for the synthetic dataset generator
#![cfg(feature = "synthetic")]

use routesync::synthetic::SyntheticScenario;
use routesync::{EngineConfig, PrimitiveKind, RecordingSurface, Route, RouteEngine};

#[test]
fn test_generation_is_deterministic() {
    let scenario = SyntheticScenario::default();
    let a = scenario.generate();
    let b = scenario.generate();
    assert_eq!(a.records, b.records);
    assert_eq!(a.records.len(), 10);
    assert_eq!(a.metadata.total_samples, 10 * (200 + 2 * 20));
}

#[test]
fn test_samples_stay_inside_world() {
    let scenario = SyntheticScenario {
        route_count: 20,
        seed: 3,
        ..SyntheticScenario::default()
    };
    for record in scenario.generate().records {
        let path = record.path.unwrap();
        assert!(path.windows(2).all(|w| w[0].time <= w[1].time));
        assert!(path.iter().all(|s| {
            s.x >= 0.0 && s.x <= scenario.world_size && s.y >= 0.0 && s.y <= scenario.world_size
        }));
    }
}

#[test]
fn test_idle_jitter_is_trimmed() {
    let scenario = SyntheticScenario {
        route_count: 5,
        idle_jitter: 5.0,
        ..SyntheticScenario::default()
    };
    let config = EngineConfig::default();
    for record in scenario.generate().records {
        let raw_len = record.path.as_ref().unwrap().len();
        let route = Route::from_record(record, &config);
        let kept = route.path.unwrap().len();
        // At most the first and last idle samples survive
        assert!(kept <= raw_len - 2 * (scenario.idle_samples - 1));
    }
}

#[test]
fn test_engine_draws_synthetic_map() {
    let scenario = SyntheticScenario::default();
    let mut engine = RouteEngine::new(RecordingSurface::new(), EngineConfig::default()).unwrap();
    engine.set_map(&scenario.map, scenario.generate().records);

    assert_eq!(engine.scene().route_count(), scenario.route_count);
    assert!(engine.surface().count(PrimitiveKind::Segment) > 0);
    assert_eq!(engine.categories().len(), 2);
    assert_eq!(engine.vehicles().len(), 3);
}
