//! Planar geometry helpers over world coordinates.
//!
//! World space is a flat square region, so plain Euclidean distances are
//! used throughout.

use geo::{Coord, Line};

use crate::{Sample, WorldBounds, WorldPoint};

/// Euclidean distance between two world points.
pub fn euclidean_distance(a: WorldPoint, b: WorldPoint) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Closest point to `p` on the segment `a`-`b`.
///
/// The perpendicular projection is clamped to the segment. A zero-length
/// segment projects everything onto `a`.
pub fn closest_point_on_segment(p: WorldPoint, a: WorldPoint, b: WorldPoint) -> WorldPoint {
    let line = Line::new(Coord::from(a), Coord::from(b));
    let ab = line.delta();
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0 {
        return a;
    }
    let ap = Coord::from(p) - line.start;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    WorldPoint::from(line.start + ab * t)
}

/// Distance from `p` to the segment `a`-`b`.
pub fn point_to_segment_distance(p: WorldPoint, a: WorldPoint, b: WorldPoint) -> f64 {
    euclidean_distance(p, closest_point_on_segment(p, a, b))
}

/// Total length of the polyline through the samples.
pub fn path_length(path: &[Sample]) -> f64 {
    path.windows(2)
        .map(|pair| euclidean_distance(pair[0].point(), pair[1].point()))
        .sum()
}

/// Bounding box of the samples, or `None` for an empty path.
pub fn path_bounds(path: &[Sample]) -> Option<WorldBounds> {
    let first = path.first()?;
    let mut min = first.point();
    let mut max = first.point();
    for s in &path[1..] {
        min.x = min.x.min(s.x);
        min.y = min.y.min(s.y);
        max.x = max.x.max(s.x);
        max.y = max.y.max(s.y);
    }
    Some(WorldBounds::new(min, max))
}
