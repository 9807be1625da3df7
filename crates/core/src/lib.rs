#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod direction;
pub mod geometry;
pub mod random;

use rand::{rngs::StdRng, SeedableRng};

// Re-export commonly used types
pub use direction::Direction;
pub use geometry::GeometryError;

/// Ratio of tile width to tile height.
pub const TILE_RATIO: f64 = 3.0;

/// Horizontal size of one tile in world units.
pub const TILE_SIZE: f64 = 1.5;

/// Height of one elevation step in world units.
pub const TILE_HEIGHT: f64 = TILE_SIZE / TILE_RATIO;

/// The single RNG stream used for one map generation.
pub type MapRng = StdRng;

/// Build the reproducible RNG stream for a map seed.
///
/// Every generation stage draws from the stream returned here, in pipeline
/// order, so the same seed always yields the same map.
pub fn map_rng(seed: u64) -> MapRng {
    StdRng::seed_from_u64(seed)
}
