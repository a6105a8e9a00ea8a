//! Incremental scene reconciliation.
//!
//! `SceneState` remembers which primitives are drawn for each route and
//! diffs that against the next visible set, so only routes that appeared,
//! disappeared or changed touch the rendering surface. Comparison markers
//! live in their own layer: moving the comparison time never touches
//! polyline or tick primitives.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use crate::interpolation::{interval_ticks, position_at_time};
use crate::{AffineParams, Palette, Route, TilePoint, WorldPoint};

/// Stroke width of route polylines in pixels.
pub const LINE_WEIGHT: f64 = 6.0;

/// Opaque id of a primitive, issued by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// One edge of a route polyline
    Segment,
    /// Elapsed-time tick marker along a route
    Tick,
    /// Marker showing where a route is at the comparison time
    Comparison,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f64,
}

/// The map-rendering collaborator.
///
/// All points are in world space; the surface maps them to tiles with the
/// transform it received in [`RenderSurface::reset`].
pub trait RenderSurface {
    /// Discard everything and prepare for a new map.
    fn reset(&mut self, map: &str, transform: &AffineParams);

    /// Draw a polyline owned by `route_id`. Clicks on it are expected to be
    /// reported back with the same route id.
    fn add_polyline(
        &mut self,
        route_id: &str,
        points: &[WorldPoint],
        style: &LineStyle,
    ) -> PrimitiveHandle;

    /// Draw a small circle marker with a tooltip.
    fn add_circle_marker(&mut self, at: WorldPoint, tooltip: &str) -> PrimitiveHandle;

    /// Draw a generic marker with a tooltip.
    fn add_marker(&mut self, at: WorldPoint, tooltip: &str) -> PrimitiveHandle;

    fn remove(&mut self, handle: PrimitiveHandle);
}

/// Tooltip text for an elapsed time, e.g. `T=12.5s`.
pub fn time_label(time_ms: f64) -> String {
    format!("T={}s", time_ms / 1000.0)
}

/// Primitive churn caused by one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub added: usize,
    pub removed: usize,
    /// Routes whose geometry was (re)built
    pub routes_built: usize,
    /// Routes whose geometry was removed entirely
    pub routes_cleared: usize,
    /// Comparison markers drawn after the pass
    pub comparison_markers: usize,
}

impl ReconcileStats {
    /// True if the pass did not touch the surface.
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

#[derive(Debug)]
struct RouteEntry {
    revision: u64,
    color: &'static str,
    segments: Vec<PrimitiveHandle>,
    ticks: Vec<PrimitiveHandle>,
}

#[derive(Debug)]
struct ComparisonEntry {
    revision: u64,
    time: f64,
    handle: PrimitiveHandle,
}

/// What is currently drawn, per route id.
#[derive(Debug)]
pub struct SceneState {
    routes: HashMap<String, RouteEntry>,
    comparison: HashMap<String, ComparisonEntry>,
    tick_interval_ms: f64,
}

impl SceneState {
    pub fn new(tick_interval_ms: f64) -> Self {
        Self {
            routes: HashMap::new(),
            comparison: HashMap::new(),
            tick_interval_ms,
        }
    }

    /// Forget all drawn primitives without removing them.
    ///
    /// Used when the surface itself was reset.
    pub fn forget(&mut self) {
        self.routes.clear();
        self.comparison.clear();
    }

    /// Remove every primitive this state knows about.
    pub fn clear<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        for (_, entry) in self.routes.drain() {
            stats.removed += remove_route_entry(entry, surface);
            stats.routes_cleared += 1;
        }
        for (_, entry) in self.comparison.drain() {
            surface.remove(entry.handle);
            stats.removed += 1;
        }
        stats
    }

    /// Number of routes with drawn geometry.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn contains(&self, route_id: &str) -> bool {
        self.routes.contains_key(route_id)
    }

    /// Polyline and tick handles drawn for a route.
    pub fn handles_for(&self, route_id: &str) -> Vec<PrimitiveHandle> {
        self.routes
            .get(route_id)
            .map(|e| e.segments.iter().chain(e.ticks.iter()).copied().collect())
            .unwrap_or_default()
    }

    pub fn comparison_handle(&self, route_id: &str) -> Option<PrimitiveHandle> {
        self.comparison.get(route_id).map(|e| e.handle)
    }

    pub fn comparison_count(&self) -> usize {
        self.comparison.len()
    }

    /// Bring the surface in line with `visible` and `comparison_time`.
    ///
    /// Routes already drawn with the same revision and colour are left
    /// alone. Calling this twice with the same inputs adds and removes
    /// nothing the second time.
    pub fn reconcile<S: RenderSurface + ?Sized>(
        &mut self,
        visible: &[&Route],
        palette: &Palette,
        comparison_time: Option<f64>,
        surface: &mut S,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        let visible_ids: HashSet<&str> = visible.iter().map(|r| r.id.as_str()).collect();

        // Route layer
        let mut stale: Vec<String> = self
            .routes
            .keys()
            .filter(|id| !visible_ids.contains(id.as_str()))
            .cloned()
            .collect();
        stale.sort();
        for id in stale {
            if let Some(entry) = self.routes.remove(&id) {
                stats.removed += remove_route_entry(entry, surface);
                stats.routes_cleared += 1;
            }
        }

        for route in visible {
            let color = palette.line_color(route.color_index, route.highlighted());
            if let Some(entry) = self.routes.get(&route.id)
                && entry.revision == route.revision
                && entry.color == color
            {
                continue;
            }
            if let Some(entry) = self.routes.remove(&route.id) {
                stats.removed += remove_route_entry(entry, surface);
            }
            let entry = self.build_route(route, color, surface);
            stats.added += entry.segments.len() + entry.ticks.len();
            stats.routes_built += 1;
            self.routes.insert(route.id.clone(), entry);
        }

        // Comparison layer
        self.reconcile_comparison(visible, comparison_time, surface, &mut stats);
        stats.comparison_markers = self.comparison.len();

        if !stats.is_noop() {
            debug!(
                "[Scene] +{} -{} primitives, {} routes built, {} cleared, {} comparison markers",
                stats.added,
                stats.removed,
                stats.routes_built,
                stats.routes_cleared,
                stats.comparison_markers
            );
        }
        stats
    }

    fn build_route<S: RenderSurface + ?Sized>(
        &self,
        route: &Route,
        color: &'static str,
        surface: &mut S,
    ) -> RouteEntry {
        let style = LineStyle {
            color,
            weight: LINE_WEIGHT,
        };
        let path = route.samples().unwrap_or_default();

        let segments = path
            .windows(2)
            .map(|pair| surface.add_polyline(&route.id, &[pair[0].point(), pair[1].point()], &style))
            .collect();

        let ticks = interval_ticks(path, self.tick_interval_ms)
            .into_iter()
            .map(|tick| surface.add_circle_marker(tick.position, &time_label(tick.time.round())))
            .collect();

        RouteEntry {
            revision: route.revision,
            color,
            segments,
            ticks,
        }
    }

    fn reconcile_comparison<S: RenderSurface + ?Sized>(
        &mut self,
        visible: &[&Route],
        comparison_time: Option<f64>,
        surface: &mut S,
        stats: &mut ReconcileStats,
    ) {
        let Some(time) = comparison_time else {
            for (_, entry) in self.comparison.drain() {
                surface.remove(entry.handle);
                stats.removed += 1;
            }
            return;
        };

        let mut previous = std::mem::take(&mut self.comparison);
        for route in visible {
            let entry = previous.remove(&route.id);
            let Some(position) = route.samples().and_then(|p| position_at_time(p, time)) else {
                if let Some(entry) = entry {
                    surface.remove(entry.handle);
                    stats.removed += 1;
                }
                continue;
            };

            let entry = match entry {
                Some(entry) if entry.revision == route.revision && entry.time == time => entry,
                stale => {
                    if let Some(stale) = stale {
                        surface.remove(stale.handle);
                        stats.removed += 1;
                    }
                    stats.added += 1;
                    ComparisonEntry {
                        revision: route.revision,
                        time,
                        handle: surface.add_marker(position, &time_label(time)),
                    }
                }
            };
            self.comparison.insert(route.id.clone(), entry);
        }

        // Whatever is left belongs to routes that are no longer visible
        let mut leftover: Vec<(String, ComparisonEntry)> = previous.into_iter().collect();
        leftover.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, entry) in leftover {
            surface.remove(entry.handle);
            stats.removed += 1;
        }
    }
}

fn remove_route_entry<S: RenderSurface + ?Sized>(entry: RouteEntry, surface: &mut S) -> usize {
    let count = entry.segments.len() + entry.ticks.len();
    for handle in entry.segments.into_iter().chain(entry.ticks) {
        surface.remove(handle);
    }
    count
}

// ============================================================================
// Recording surface
// ============================================================================

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    Reset,
    Add(PrimitiveHandle),
    Remove(PrimitiveHandle),
}

/// A primitive held by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPrimitive {
    pub kind: PrimitiveKind,
    pub route_id: Option<String>,
    pub points: Vec<WorldPoint>,
    /// `points` mapped through the surface's transform
    pub tile_points: Vec<TilePoint>,
    pub color: Option<&'static str>,
    pub tooltip: Option<String>,
}

/// In-memory surface that records every call.
///
/// Useful for testing and headless runs, and as a reference
/// implementation of [`RenderSurface`].
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_handle: u64,
    map: Option<String>,
    transform: Option<AffineParams>,
    live: BTreeMap<PrimitiveHandle, RecordedPrimitive>,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map named in the last reset.
    pub fn map(&self) -> Option<&str> {
        self.map.as_deref()
    }

    pub fn transform(&self) -> Option<&AffineParams> {
        self.transform.as_ref()
    }

    pub fn get(&self, handle: PrimitiveHandle) -> Option<&RecordedPrimitive> {
        self.live.get(&handle)
    }

    /// Currently drawn primitives, oldest first.
    pub fn live(&self) -> impl Iterator<Item = (&PrimitiveHandle, &RecordedPrimitive)> {
        self.live.iter()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of live primitives of one kind.
    pub fn count(&self, kind: PrimitiveKind) -> usize {
        self.live.values().filter(|p| p.kind == kind).count()
    }

    /// Every call since creation or the last [`RecordingSurface::clear_ops`].
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn push(
        &mut self,
        kind: PrimitiveKind,
        route_id: Option<&str>,
        points: &[WorldPoint],
        color: Option<&'static str>,
        tooltip: Option<&str>,
    ) -> PrimitiveHandle {
        let handle = PrimitiveHandle(self.next_handle);
        self.next_handle += 1;

        let tile_points = match &self.transform {
            Some(t) => points.iter().map(|p| t.apply(*p)).collect(),
            None => points.iter().map(|p| TilePoint { x: p.x, y: p.y }).collect(),
        };
        self.live.insert(
            handle,
            RecordedPrimitive {
                kind,
                route_id: route_id.map(str::to_string),
                points: points.to_vec(),
                tile_points,
                color,
                tooltip: tooltip.map(str::to_string),
            },
        );
        self.ops.push(SurfaceOp::Add(handle));
        handle
    }
}

impl RenderSurface for RecordingSurface {
    fn reset(&mut self, map: &str, transform: &AffineParams) {
        self.map = Some(map.to_string());
        self.transform = Some(*transform);
        self.live.clear();
        self.ops.push(SurfaceOp::Reset);
    }

    fn add_polyline(
        &mut self,
        route_id: &str,
        points: &[WorldPoint],
        style: &LineStyle,
    ) -> PrimitiveHandle {
        self.push(
            PrimitiveKind::Segment,
            Some(route_id),
            points,
            Some(style.color),
            None,
        )
    }

    fn add_circle_marker(&mut self, at: WorldPoint, tooltip: &str) -> PrimitiveHandle {
        self.push(PrimitiveKind::Tick, None, &[at], None, Some(tooltip))
    }

    fn add_marker(&mut self, at: WorldPoint, tooltip: &str) -> PrimitiveHandle {
        self.push(PrimitiveKind::Comparison, None, &[at], None, Some(tooltip))
    }

    fn remove(&mut self, handle: PrimitiveHandle) {
        self.live.remove(&handle);
        self.ops.push(SurfaceOp::Remove(handle));
    }
}
