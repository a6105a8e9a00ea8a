//! Tests for error module

use routesync::error::{OptionExt, RouteSyncError};
use routesync::{WorldBounds, WorldPoint, world_to_tile};

#[test]
fn test_error_display() {
    let err = RouteSyncError::UnknownRoute {
        id: "route-1".to_string(),
    };
    assert!(err.to_string().contains("route-1"));

    let err = RouteSyncError::DegenerateBounds {
        width: 0.0,
        height: 4096.0,
    };
    assert!(err.to_string().contains("degenerate"));
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    let result = none.ok_or_unknown_route("missing");
    assert!(matches!(
        result,
        Err(RouteSyncError::UnknownRoute { ref id }) if id == "missing"
    ));

    assert_eq!(Some(3).ok_or_unknown_route("present").unwrap(), 3);
}

#[test]
fn test_json_error_converts() {
    let result = routesync::parse_records("not json");
    assert!(matches!(result, Err(RouteSyncError::Json(_))));
}

#[test]
fn test_degenerate_bounds_is_error_not_infinity() {
    let flat = WorldBounds::new(WorldPoint::new(0.0, 0.0), WorldPoint::new(4096.0, 0.0));
    assert!(matches!(
        world_to_tile(&flat, 256.0),
        Err(RouteSyncError::DegenerateBounds { .. })
    ));
}
