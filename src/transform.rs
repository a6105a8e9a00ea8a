//! World-to-tile coordinate transform.
//!
//! A tile renderer places the upper-left corner of tile (0, 0) at its origin
//! and expects row-major, top-left coordinates. World space has y growing
//! downward too, so the transform only scales and translates; it never flips
//! an axis.

use serde::{Deserialize, Serialize};

use crate::{Result, RouteSyncError, WorldBounds, WorldPoint};

/// A position in tile pixel space at zoom 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TilePoint {
    pub x: f64,
    pub y: f64,
}

/// Scale and translation with `tile = world * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineParams {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl AffineParams {
    /// Map a world point to tile pixels.
    pub fn apply(&self, p: WorldPoint) -> TilePoint {
        TilePoint {
            x: p.x * self.sx + self.tx,
            y: p.y * self.sy + self.ty,
        }
    }

    /// Map tile pixels back to world space.
    pub fn invert(&self, p: TilePoint) -> WorldPoint {
        WorldPoint::new((p.x - self.tx) / self.sx, (p.y - self.ty) / self.sy)
    }
}

/// Compute the transform that fits `bounds` exactly onto one tile of
/// `tile_size` pixels, with the bounds' upper-left corner at the origin.
///
/// Zero-width or zero-height bounds are a configuration error and fail
/// instead of producing an infinite scale.
///
/// # Example
/// ```
/// use routesync::{WorldBounds, WorldPoint, world_to_tile};
///
/// let params = world_to_tile(&WorldBounds::square(4096.0), 256.0).unwrap();
/// let tile = params.apply(WorldPoint::new(4096.0, 2048.0));
/// assert_eq!((tile.x, tile.y), (256.0, 128.0));
/// ```
pub fn world_to_tile(bounds: &WorldBounds, tile_size: f64) -> Result<AffineParams> {
    if !(tile_size.is_finite() && tile_size > 0.0) {
        return Err(RouteSyncError::InvalidTileSize { tile_size });
    }

    let rect = bounds.to_rect();
    let (width, height) = (rect.width(), rect.height());
    if !(width.is_finite() && height.is_finite()) || width == 0.0 || height == 0.0 {
        return Err(RouteSyncError::DegenerateBounds { width, height });
    }

    let upper_left = rect.min();
    let sx = tile_size / width;
    let sy = tile_size / height;

    Ok(AffineParams {
        sx,
        sy,
        tx: -upper_left.x * sx,
        ty: -upper_left.y * sy,
    })
}
