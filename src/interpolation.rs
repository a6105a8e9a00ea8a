//! Position/time interpolation over a timestamped polyline.
//!
//! A path is treated as a piecewise-linear curve parameterized by time:
//! - [`position_at_time`] is exact, time is recorded at every vertex
//! - [`time_at_point`] projects an off-curve point onto the nearest segment
//!   and uses distance along that segment as a proxy for elapsed time
//!
//! Neither function ever yields NaN or infinity. "Not comparable" cases
//! (time outside the path's span, fewer than two samples) return `None`.

use crate::geo_utils::{closest_point_on_segment, euclidean_distance};
use crate::{Route, Sample, WorldPoint};

/// Position on `path` at elapsed time `t` (milliseconds).
///
/// Returns `None` if `t` lies outside `[path[0].time, path[last].time]` or
/// the path has fewer than two samples. When `t` falls exactly on a vertex
/// shared by two segments the earlier segment wins.
///
/// A segment with no time span resolves to its start. A segment with no
/// length is a vehicle standing still and yields that position.
pub fn position_at_time(path: &[Sample], t: f64) -> Option<WorldPoint> {
    path.windows(2).find_map(|pair| {
        let (p0, p1) = (&pair[0], &pair[1]);
        if p0.time <= t && t <= p1.time {
            Some(interpolate_segment(p0, p1, t))
        } else {
            None
        }
    })
}

/// Elapsed time (milliseconds, rounded) at the point on `path` closest to
/// `point`.
///
/// Every segment is searched; ties on distance go to the earliest segment.
/// Within the winning segment the time is interpolated by the projected
/// point's distance from the segment start. A zero-length winner resolves
/// to its start time.
///
/// Returns `None` if every segment has zero length, since such a path
/// carries no spatial information to map a point onto.
pub fn time_at_point(path: &[Sample], point: WorldPoint) -> Option<f64> {
    if !(point.x.is_finite() && point.y.is_finite()) {
        return None;
    }
    if path.windows(2).all(|pair| pair[0].point() == pair[1].point()) {
        return None;
    }

    let mut best: Option<(f64, WorldPoint, &Sample, &Sample)> = None;
    for pair in path.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let closest = closest_point_on_segment(point, a.point(), b.point());
        let distance = euclidean_distance(point, closest);
        if best.is_none_or(|(best_distance, ..)| distance < best_distance) {
            best = Some((distance, closest, a, b));
        }
    }

    let (_, closest, a, b) = best?;
    let segment_length = euclidean_distance(a.point(), b.point());
    let fraction = if segment_length > 0.0 {
        euclidean_distance(a.point(), closest) / segment_length
    } else {
        0.0
    };

    Some((a.time + (b.time - a.time) * fraction).round())
}

/// Linear interpolation of position within one segment.
///
/// A segment with no time span resolves to its start.
pub(crate) fn interpolate_segment(p0: &Sample, p1: &Sample, t: f64) -> WorldPoint {
    let span = p1.time - p0.time;
    let fraction = if span > 0.0 { (t - p0.time) / span } else { 0.0 };
    WorldPoint::new(
        p0.x + (p1.x - p0.x) * fraction,
        p0.y + (p1.y - p0.y) * fraction,
    )
}

// ============================================================================
// Cross-route synchronization
// ============================================================================

/// Where a route was at a shared comparison time.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedPosition {
    pub route_id: String,
    pub position: WorldPoint,
}

/// Position of every route at elapsed time `t`.
///
/// Routes without a path, or whose time span does not contain `t`, are
/// omitted.
///
/// # Example
/// ```
/// use routesync::{Route, RouteMetadata, Sample, sync_positions};
///
/// let short = Route::new("short", Some(vec![
///     Sample::new(0.0, 0.0, 0.0),
///     Sample::new(10.0, 0.0, 1_000.0),
/// ]), RouteMetadata::default());
/// let long = Route::new("long", Some(vec![
///     Sample::new(0.0, 0.0, 0.0),
///     Sample::new(0.0, 40.0, 4_000.0),
/// ]), RouteMetadata::default());
///
/// let synced = sync_positions([&short, &long], 2_000.0);
/// assert_eq!(synced.len(), 1);
/// assert_eq!(synced[0].route_id, "long");
/// ```
pub fn sync_positions<'a>(
    routes: impl IntoIterator<Item = &'a Route>,
    t: f64,
) -> Vec<SyncedPosition> {
    routes
        .into_iter()
        .filter_map(|route| {
            let position = position_at_time(route.samples()?, t)?;
            Some(SyncedPosition {
                route_id: route.id.clone(),
                position,
            })
        })
        .collect()
}

// ============================================================================
// Interval ticks
// ============================================================================

/// A marker placed where a route crosses a multiple of the tick interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTick {
    /// Elapsed time of the tick in milliseconds
    pub time: f64,
    pub position: WorldPoint,
}

/// Tick markers for every multiple of `interval_ms` crossed by a segment.
///
/// A segment whose endpoints fall in different interval buckets gets one
/// tick per bucket boundary it crosses; a segment within a single bucket
/// gets none. Non-positive intervals yield no ticks.
pub fn interval_ticks(path: &[Sample], interval_ms: f64) -> Vec<IntervalTick> {
    if !(interval_ms.is_finite() && interval_ms > 0.0) {
        return Vec::new();
    }

    let mut ticks = Vec::new();
    for pair in path.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let bucket_a = (a.time / interval_ms).floor();
        let bucket_b = (b.time / interval_ms).floor();
        if bucket_a == bucket_b {
            continue;
        }

        let crossings = (bucket_b - bucket_a) as u64;
        for i in 1..=crossings {
            let time = interval_ms * (bucket_a + i as f64);
            ticks.push(IntervalTick {
                time,
                position: interpolate_segment(a, b, time),
            });
        }
    }
    ticks
}
