//! # Route Sync
//!
//! Geometry and time-synchronization engine for vehicle routes recorded on a
//! fixed-size game map.
//!
//! This library provides:
//! - World-to-tile coordinate transforms for slippy-map renderers
//! - Path preprocessing (idle trimming, time re-basing, per-route offsets)
//! - Bidirectional interpolation: position at time, time at point
//! - A route set with stable colours and category/vehicle filters
//! - An incremental scene reconciler that only touches what changed
//!
//! ## Features
//!
//! - **`parallel`** - Preprocess bulk map loads with rayon
//! - **`synthetic`** - Seeded synthetic recordings for benchmarks and demos
//! - **`cli`** - Build the `routesync-cli` debugging tool
//!
//! ## Quick Start
//!
//! ```rust
//! use routesync::{Sample, WorldPoint, position_at_time, time_at_point};
//!
//! let path = vec![
//!     Sample::new(0.0, 0.0, 0.0),
//!     Sample::new(100.0, 0.0, 1000.0),
//!     Sample::new(100.0, 100.0, 2000.0),
//! ];
//!
//! let p = position_at_time(&path, 500.0).unwrap();
//! assert_eq!(p, WorldPoint::new(50.0, 0.0));
//!
//! let t = time_at_point(&path, WorldPoint::new(100.0, 50.0));
//! assert_eq!(t, Some(1500.0));
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, RouteSyncError};

// Planar geometry helpers (distances, projection, bounds)
pub mod geo_utils;

// Explicit colour table indexed by a route's colour index
pub mod palette;
pub use palette::{Palette, PaletteEntry};

// World space -> tile pixel space
pub mod transform;
pub use transform::{AffineParams, TilePoint, world_to_tile};

// Raw sample cleanup
pub mod preprocess;
pub use preprocess::{apply_time_offset, prepare_path, preprocess};

// Position <-> time interpolation over a path
pub mod interpolation;
pub use interpolation::{
    IntervalTick, SyncedPosition, interval_ticks, position_at_time, sync_positions, time_at_point,
};

// Route set, scene reconciliation and the engine tying them together
pub mod engine;
pub use engine::{
    EngineEvent, HitIndex, PrimitiveHandle, PrimitiveKind, ReconcileStats, RecordEvent,
    RecordingSurface, RenderSurface, RouteEngine, RouteFilter, RouteSet, SceneState,
};

#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A single recorded sample: world position plus elapsed time in milliseconds.
///
/// # Example
/// ```
/// use routesync::Sample;
/// let s = Sample::new(2048.0, 1024.0, 15_000.0);
/// assert!(s.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    /// Milliseconds, non-decreasing within a path
    #[serde(alias = "t")]
    pub time: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, time: f64) -> Self {
        Self { x, y, time }
    }

    /// Position of the sample without its timestamp.
    pub fn point(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    /// Check that coordinates and time are all finite.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.time.is_finite()
    }
}

/// A point in world space. The y axis grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<WorldPoint> for geo::Coord<f64> {
    fn from(p: WorldPoint) -> Self {
        geo::Coord { x: p.x, y: p.y }
    }
}

impl From<geo::Coord<f64>> for WorldPoint {
    fn from(c: geo::Coord<f64>) -> Self {
        WorldPoint::new(c.x, c.y)
    }
}

/// Rectangular world region given by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl WorldBounds {
    pub fn new(min: WorldPoint, max: WorldPoint) -> Self {
        Self { min, max }
    }

    /// The square region `[0, 0]..[size, size]`.
    pub fn square(size: f64) -> Self {
        Self::new(WorldPoint::new(0.0, 0.0), WorldPoint::new(size, size))
    }

    /// Normalized rectangle (corners may have been given in any order).
    pub fn to_rect(&self) -> geo::Rect<f64> {
        geo::Rect::new(geo::Coord::from(self.min), geo::Coord::from(self.max))
    }
}

/// Descriptive fields of a route that drive filtering and display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetadata {
    pub name: String,
    pub category: String,
    pub vehicle: String,
    pub map: String,
    /// Constant added to every sample time after preprocessing
    #[serde(default)]
    pub time_offset_ms: f64,
}

/// Hover state of a route in the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverState {
    /// The route's entry in the route list is hovered
    pub toolbar_entry: bool,
    /// The route's drawn geometry is hovered on the map
    pub element: bool,
}

impl HoverState {
    pub fn highlighted(&self) -> bool {
        self.toolbar_entry || self.element
    }
}

/// A route held by the route set.
///
/// `path` is `None` until the recording is available. `color_index` is
/// assigned by [`RouteSet::upsert`] on first insertion and never changes.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    pub path: Option<Vec<Sample>>,
    pub color_index: usize,
    pub enabled: bool,
    pub metadata: RouteMetadata,
    pub hover: HoverState,
    /// Bumped by the route set whenever the route is replaced
    pub revision: u64,
}

impl Route {
    /// Create an enabled route with no colour assigned yet.
    pub fn new(id: impl Into<String>, path: Option<Vec<Sample>>, metadata: RouteMetadata) -> Self {
        Self {
            id: id.into(),
            path,
            color_index: 0,
            enabled: true,
            metadata,
            hover: HoverState::default(),
            revision: 0,
        }
    }

    /// Build a route from a backing record.
    ///
    /// The path is preprocessed with `config.trim_threshold` first and the
    /// record's time offset is applied afterwards, so the offset never
    /// influences trimming.
    pub fn from_record(record: RouteRecord, config: &EngineConfig) -> Self {
        let path = record
            .path
            .map(|samples| prepare_path(&samples, config.trim_threshold, record.time_offset_ms));

        Self::new(
            record.id,
            path,
            RouteMetadata {
                name: record.name,
                category: record.category,
                vehicle: record.vehicle,
                map: record.map,
                time_offset_ms: record.time_offset_ms,
            },
        )
    }

    /// The path if it has at least one sample.
    pub fn samples(&self) -> Option<&[Sample]> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }

    /// Check if the route has a drawable path.
    pub fn has_path(&self) -> bool {
        self.samples().is_some()
    }

    pub fn highlighted(&self) -> bool {
        self.hover.highlighted()
    }

    /// Time span covered by the path in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        match self.samples() {
            Some(path) => path[path.len() - 1].time - path[0].time,
            None => 0.0,
        }
    }

    /// Total polyline length in world units.
    pub fn length(&self) -> f64 {
        self.samples().map(geo_utils::path_length).unwrap_or(0.0)
    }
}

/// A raw route record as delivered by the persistence layer.
///
/// # Example
/// ```
/// use routesync::RouteRecord;
/// let json = r#"{
///     "id": "r1", "name": "Main supply route", "category": "logistics",
///     "vehicle": "truck", "map_name": "Narva", "timeOffsetMs": 2000,
///     "path": [{"x": 0, "y": 0, "time": 0}, {"x": 10, "y": 0, "time": 500}]
/// }"#;
/// let record: RouteRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(record.map, "Narva");
/// assert_eq!(record.path.unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: Option<Vec<Sample>>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub vehicle: String,
    #[serde(alias = "map_name", default)]
    pub map: String,
    #[serde(default)]
    pub time_offset_ms: f64,
}

/// Parse a JSON array of route records.
pub fn parse_records(json: &str) -> Result<Vec<RouteRecord>> {
    Ok(serde_json::from_str(json)?)
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for preprocessing, rendering and hit testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side length of the square world region `[0,0]..[N,N]`.
    /// Default: 4096.0
    pub world_size: f64,

    /// Tile size in pixels expected by the tile renderer.
    /// Default: 256.0
    pub tile_size: f64,

    /// Interior samples closer than this to the first or last sample are
    /// dropped as idle jitter.
    /// Default: 15.0 world units
    pub trim_threshold: f64,

    /// Spacing of the elapsed-time tick markers along each route.
    /// Default: 10 000 ms
    pub tick_interval_ms: f64,

    /// Hover radius at zoom 1; the effective radius is `hover_distance / zoom`.
    /// Default: 50.0 world units
    pub hover_distance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_size: 4096.0,
            tile_size: 256.0,
            trim_threshold: 15.0,
            tick_interval_ms: 10_000.0,
            hover_distance: 50.0,
        }
    }
}

impl EngineConfig {
    /// Reject values that would make rendering or trimming meaningless.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("world_size", self.world_size),
            ("tile_size", self.tile_size),
            ("tick_interval_ms", self.tick_interval_ms),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RouteSyncError::InvalidConfig {
                    field,
                    reason: format!("must be a positive finite number, got {value}"),
                });
            }
        }
        let non_negative = [
            ("trim_threshold", self.trim_threshold),
            ("hover_distance", self.hover_distance),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(RouteSyncError::InvalidConfig {
                    field,
                    reason: format!("must be a non-negative finite number, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// World bounds described by `world_size`.
    pub fn world_bounds(&self) -> WorldBounds {
        WorldBounds::square(self.world_size)
    }
}

/// Parse a manually entered comparison time in seconds into milliseconds.
///
/// Blank input clears the comparison time.
///
/// # Example
/// ```
/// use routesync::parse_comparison_seconds;
/// assert_eq!(parse_comparison_seconds("12"), Some(12_000.0));
/// assert_eq!(parse_comparison_seconds("  "), None);
/// assert_eq!(parse_comparison_seconds("abc"), None);
/// ```
pub fn parse_comparison_seconds(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite())
        .map(|s| s * 1000.0)
}
