//! Hover hit-testing against drawn routes.
//!
//! Uses an R-tree of route segments so pointer moves do not need a brute
//! force scan over every segment of every route.

use log::debug;
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geo_utils::point_to_segment_distance;
use crate::{Route, WorldPoint};

/// One route segment in the R-tree.
#[derive(Debug, Clone)]
pub struct IndexedSegment {
    pub route_id: String,
    pub segment: usize,
    pub start: WorldPoint,
    pub end: WorldPoint,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.start.x, self.start.y], [self.end.x, self.end.y])
    }
}

impl PointDistance for IndexedSegment {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d = point_to_segment_distance(WorldPoint::new(point[0], point[1]), self.start, self.end);
        d * d
    }
}

/// Spatial index over the segments of the visible routes.
///
/// Rebuilt lazily: mark it dirty whenever the visible set changes.
#[derive(Debug)]
pub struct HitIndex {
    tree: RTree<IndexedSegment>,
    dirty: bool,
}

impl Default for HitIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl HitIndex {
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            dirty: false,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the index from the given routes.
    pub fn rebuild(&mut self, routes: &[&Route]) {
        let segments: Vec<IndexedSegment> = routes
            .iter()
            .filter_map(|route| Some((route, route.samples()?)))
            .flat_map(|(route, path)| {
                path.windows(2).enumerate().map(|(i, pair)| IndexedSegment {
                    route_id: route.id.clone(),
                    segment: i,
                    start: pair[0].point(),
                    end: pair[1].point(),
                })
            })
            .collect();

        debug!(
            "[HitIndex] Indexed {} segments of {} routes",
            segments.len(),
            routes.len()
        );
        self.tree = RTree::bulk_load(segments);
        self.dirty = false;
    }

    /// Rebuild only if marked dirty.
    pub fn ensure_built(&mut self, routes: &[&Route]) {
        if self.dirty {
            self.rebuild(routes);
        }
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.dirty = false;
    }

    /// Ids of routes with a segment within `radius` of `point`, sorted.
    pub fn routes_near(&self, point: WorldPoint, radius: f64) -> Vec<String> {
        let mut ids: Vec<String> = self
            .tree
            .locate_within_distance([point.x, point.y], radius * radius)
            .map(|s| s.route_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// The route whose nearest segment is closest to `point`, if within `radius`.
    pub fn nearest_route(&self, point: WorldPoint, radius: f64) -> Option<&str> {
        let query = [point.x, point.y];
        self.tree
            .nearest_neighbor(&query)
            .filter(|s| s.distance_2(&query) <= radius * radius)
            .map(|s| s.route_id.as_str())
    }

    /// Number of indexed segments.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
