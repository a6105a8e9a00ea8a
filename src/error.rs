//! Error types for the route sync engine.
//!
//! Geometry lookups that simply have no answer (a time outside a route's
//! span, a point lookup on a one-sample path) return `Option::None` and are
//! not errors. `RouteSyncError` covers caller misuse and bad input data.

use thiserror::Error;

/// Errors raised by the engine and its components.
#[derive(Debug, Error)]
pub enum RouteSyncError {
    /// World bounds with no area cannot be mapped onto tiles.
    #[error("world bounds are degenerate ({width} x {height}); both sides must be non-zero")]
    DegenerateBounds { width: f64, height: f64 },

    #[error("tile size must be positive and finite, got {tile_size}")]
    InvalidTileSize { tile_size: f64 },

    #[error("invalid config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("route '{id}' is not in the route set")]
    UnknownRoute { id: String },

    #[error("malformed route data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RouteSyncError>;

/// Helpers for turning lookups into typed errors.
pub trait OptionExt<T> {
    fn ok_or_unknown_route(self, id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_unknown_route(self, id: &str) -> Result<T> {
        self.ok_or_else(|| RouteSyncError::UnknownRoute { id: id.to_string() })
    }
}
