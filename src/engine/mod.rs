//! # Route Engine
//!
//! Owns the route set and the scene for one map, and turns record events and
//! UI input into explicit reconcile passes against a rendering surface.
//!
//! ## Architecture
//!
//! The engine is composed of focused modules:
//! - `RouteSet` - Routes, colours, enabled flags and filters
//! - `SceneState` - Incremental diff of drawn primitives
//! - `HitIndex` - R-tree for hover hit-testing
//!
//! Every mutating method except [`RouteEngine::upsert`] ends with exactly
//! one call to [`RouteEngine::reconcile`]; nothing is recomputed implicitly.

pub mod hit_index;
pub mod route_set;
pub mod scene;

pub use hit_index::{HitIndex, IndexedSegment};
pub use route_set::{RouteFilter, RouteSet};
pub use scene::{
    LineStyle, PrimitiveHandle, PrimitiveKind, ReconcileStats, RecordedPrimitive,
    RecordingSurface, RenderSurface, SceneState, SurfaceOp, time_label,
};

use log::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::interpolation::{SyncedPosition, sync_positions, time_at_point};
use crate::{
    AffineParams, EngineConfig, OptionExt, Palette, Result, Route, RouteRecord, WorldPoint,
    world_to_tile,
};

/// A live change to the backing route records.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    Insert(RouteRecord),
    Update(RouteRecord),
    Delete { id: String },
}

/// Notification sent to listeners after the engine state changed.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    MapChanged { map: String },
    RouteUpserted { id: String },
    RouteRemoved { id: String },
    /// Enabled flags, filters or hover highlighting changed
    VisibilityChanged,
    ComparisonTimeChanged { time: Option<f64> },
}

type Listener = Box<dyn FnMut(&EngineEvent)>;

/// Route engine bound to one rendering surface.
pub struct RouteEngine<S: RenderSurface> {
    routes: RouteSet,
    scene: SceneState,
    hits: HitIndex,
    /// Ids and revisions of the visible routes the hit index was marked for
    indexed: Vec<(String, u64)>,
    surface: S,
    palette: Palette,
    transform: AffineParams,
    config: EngineConfig,
    map: Option<String>,
    comparison_time: Option<f64>,
    listeners: Vec<Listener>,
}

impl<S: RenderSurface> RouteEngine<S> {
    /// Create an engine with the default palette.
    pub fn new(surface: S, config: EngineConfig) -> Result<Self> {
        Self::with_palette(surface, config, Palette::default())
    }

    /// Create an engine with a custom palette.
    ///
    /// Fails if the config is invalid, including world bounds with no area.
    pub fn with_palette(surface: S, config: EngineConfig, palette: Palette) -> Result<Self> {
        config.validate()?;
        let transform = world_to_tile(&config.world_bounds(), config.tile_size)?;
        Ok(Self {
            routes: RouteSet::new(palette.len()),
            scene: SceneState::new(config.tick_interval_ms),
            hits: HitIndex::new(),
            indexed: Vec::new(),
            surface,
            palette,
            transform,
            config,
            map: None,
            comparison_time: None,
            listeners: Vec::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn routes(&self) -> &RouteSet {
        &self.routes
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn transform(&self) -> &AffineParams {
        &self.transform
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn hit_index(&self) -> &HitIndex {
        &self.hits
    }

    /// The active map, if one was selected.
    pub fn map(&self) -> Option<&str> {
        self.map.as_deref()
    }

    pub fn comparison_time(&self) -> Option<f64> {
        self.comparison_time
    }

    pub fn visible(&self) -> Vec<&Route> {
        self.routes.visible()
    }

    pub fn categories(&self) -> Vec<String> {
        self.routes.categories()
    }

    pub fn vehicles(&self) -> Vec<String> {
        self.routes.vehicles()
    }

    /// Register a callback for engine notifications.
    pub fn on_event(&mut self, listener: impl FnMut(&EngineEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: EngineEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    // ========================================================================
    // Map and record management
    // ========================================================================

    /// Switch to another map and load its records.
    ///
    /// The route set, scene and comparison time of the previous map are
    /// discarded wholesale and the surface is reset.
    pub fn set_map(&mut self, map: &str, records: Vec<RouteRecord>) -> ReconcileStats {
        self.routes.clear();
        self.scene.forget();
        self.hits.clear();
        self.indexed.clear();
        self.comparison_time = None;
        self.map = Some(map.to_string());
        self.surface.reset(map, &self.transform);

        let records: Vec<RouteRecord> = records
            .into_iter()
            .filter(|r| {
                let same_map = r.map == map;
                if !same_map {
                    warn!(
                        "[Engine] Skipping record '{}' for map '{}' while loading '{}'",
                        r.id, r.map, map
                    );
                }
                same_map
            })
            .collect();

        let routes = build_routes(records, &self.config);
        let loaded = routes.len();
        for route in routes {
            self.routes.upsert(route);
        }
        self.routes.prune_filter();
        info!("[Engine] Loaded {} routes for map '{}'", loaded, map);

        self.emit(EngineEvent::MapChanged {
            map: map.to_string(),
        });
        self.reconcile()
    }

    /// Apply a live record change.
    ///
    /// Records for a map other than the active one are ignored.
    pub fn apply(&mut self, event: RecordEvent) -> ReconcileStats {
        match event {
            RecordEvent::Insert(record) | RecordEvent::Update(record) => {
                if self.map.as_deref() != Some(record.map.as_str()) {
                    warn!(
                        "[Engine] Ignoring record '{}' for inactive map '{}'",
                        record.id, record.map
                    );
                    return ReconcileStats::default();
                }
                let id = record.id.clone();
                self.upsert(Route::from_record(record, &self.config));
                self.emit(EngineEvent::RouteUpserted { id });
            }
            RecordEvent::Delete { id } => {
                if self.routes.remove(&id).is_none() {
                    return ReconcileStats::default();
                }
                self.emit(EngineEvent::RouteRemoved { id });
            }
        }
        self.routes.prune_filter();
        self.reconcile()
    }

    /// Insert or replace a route directly, without reconciling.
    ///
    /// Meant for batching: nothing is drawn until the caller runs
    /// [`RouteEngine::reconcile`].
    pub fn upsert(&mut self, route: Route) -> usize {
        self.routes.upsert(route)
    }

    // ========================================================================
    // UI input
    // ========================================================================

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<ReconcileStats> {
        self.routes.set_enabled(id, enabled)?;
        self.emit(EngineEvent::VisibilityChanged);
        Ok(self.reconcile())
    }

    /// Flip one route's enabled flag.
    pub fn toggle(&mut self, id: &str) -> Result<ReconcileStats> {
        let enabled = self.routes.get(id).ok_or_unknown_route(id)?.enabled;
        self.set_enabled(id, !enabled)
    }

    pub fn enable_all(&mut self) -> ReconcileStats {
        self.routes.enable_all();
        self.emit(EngineEvent::VisibilityChanged);
        self.reconcile()
    }

    pub fn disable_all(&mut self) -> ReconcileStats {
        self.routes.disable_all();
        self.emit(EngineEvent::VisibilityChanged);
        self.reconcile()
    }

    pub fn invert_enabled(&mut self) -> ReconcileStats {
        self.routes.invert_enabled();
        self.emit(EngineEvent::VisibilityChanged);
        self.reconcile()
    }

    pub fn set_filter(&mut self, categories: Vec<String>, vehicles: Vec<String>) -> ReconcileStats {
        self.routes.set_filter(categories, vehicles);
        self.emit(EngineEvent::VisibilityChanged);
        self.reconcile()
    }

    /// Set or clear the comparison time (milliseconds).
    pub fn set_comparison_time(&mut self, time: Option<f64>) -> ReconcileStats {
        let time = time.filter(|t| t.is_finite());
        self.comparison_time = time;
        self.emit(EngineEvent::ComparisonTimeChanged { time });
        self.reconcile()
    }

    /// Handle a click on a route's polyline.
    ///
    /// The clicked point is mapped to an elapsed time on that route, which
    /// becomes the comparison time for every visible route. Returns the
    /// time, or `None` if the route has fewer than two samples or never
    /// moves.
    pub fn select_point(&mut self, route_id: &str, point: WorldPoint) -> Result<Option<f64>> {
        let route = self.routes.get(route_id).ok_or_unknown_route(route_id)?;
        let time = route.samples().and_then(|path| time_at_point(path, point));
        if time.is_some() {
            self.set_comparison_time(time);
        }
        Ok(time)
    }

    /// Positions of all drawn routes at the comparison time.
    pub fn comparison_positions(&self) -> Vec<SyncedPosition> {
        match self.comparison_time {
            Some(time) => sync_positions(self.routes.rendered(), time),
            None => Vec::new(),
        }
    }

    /// Highlight routes under the pointer.
    ///
    /// The hit radius shrinks as the map zooms in. Returns the ids of the
    /// hovered routes.
    pub fn hover(&mut self, point: WorldPoint, zoom: f64) -> Vec<String> {
        let radius = self.config.hover_distance / zoom.max(f64::EPSILON);
        let visible = self.routes.visible();
        self.hits.ensure_built(&visible);
        let hovered = self.hits.routes_near(point, radius);

        let ids: Vec<String> = self.routes.iter().map(|r| r.id.clone()).collect();
        let mut changed = false;
        for id in ids {
            let over = hovered.contains(&id);
            changed |= self.routes.set_element_hovered(&id, over).unwrap_or(false);
        }

        if changed {
            self.emit(EngineEvent::VisibilityChanged);
            self.reconcile();
        }
        hovered
    }

    /// Highlight a route while its list entry is hovered.
    pub fn set_toolbar_hovered(&mut self, id: &str, hovered: bool) -> Result<ReconcileStats> {
        if !self.routes.set_toolbar_hovered(id, hovered)? {
            return Ok(ReconcileStats::default());
        }
        self.emit(EngineEvent::VisibilityChanged);
        Ok(self.reconcile())
    }

    // ========================================================================
    // Reconcile
    // ========================================================================

    /// Diff the rendered routes against what is drawn and update the surface.
    ///
    /// Disabled routes are drawn while highlighted. Hover hit-testing only
    /// covers visible routes, and its index is invalidated only when their
    /// membership or geometry changes.
    pub fn reconcile(&mut self) -> ReconcileStats {
        let rendered = self.routes.rendered();
        let stats = self.scene.reconcile(
            &rendered,
            &self.palette,
            self.comparison_time,
            &mut self.surface,
        );

        let indexed: Vec<(String, u64)> = self
            .routes
            .visible()
            .iter()
            .map(|r| (r.id.clone(), r.revision))
            .collect();
        if indexed != self.indexed {
            self.hits.mark_dirty();
            self.indexed = indexed;
        }
        stats
    }
}

/// Preprocess records into routes.
#[cfg(feature = "parallel")]
fn build_routes(records: Vec<RouteRecord>, config: &EngineConfig) -> Vec<Route> {
    records
        .into_par_iter()
        .map(|record| Route::from_record(record, config))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn build_routes(records: Vec<RouteRecord>, config: &EngineConfig) -> Vec<Route> {
    records
        .into_iter()
        .map(|record| Route::from_record(record, config))
        .collect()
}
