//! Error type for terrain generation.

use tactica_core::GeometryError;
use thiserror::Error;

/// Failures that abort a map generation call.
///
/// A feature that cannot be placed is not an error; placement reports it as
/// `None` and the map is produced without it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    /// A generator produced degenerate geometry.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// A bounded rejection sampler ran out of attempts.
    #[error("{constraint} could not be satisfied after {attempts} attempts")]
    ConstraintUnsatisfiable {
        /// What was being sampled.
        constraint: &'static str,
        /// Attempts spent before giving up.
        attempts: u32,
    },
    /// A grid was requested with an axis outside `1..=MAX_MAP_AXIS`.
    #[error("map dimensions {size_x}x{size_z} must both lie in 1..={max}", max = crate::MAX_MAP_AXIS)]
    InvalidDimensions {
        /// Requested x size.
        size_x: usize,
        /// Requested z size.
        size_z: usize,
    },
    /// A generation setting is out of range.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidConfig {
        /// Offending field of `GenerationConfig`.
        field: &'static str,
        /// What the value must satisfy.
        reason: &'static str,
    },
}

/// Result alias for terrain generation.
pub type Result<T> = std::result::Result<T, TerrainError>;
