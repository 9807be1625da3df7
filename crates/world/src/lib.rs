//! Procedural terrain for tactical battle maps.
//!
//! [`TacticalMap::generate`] runs the whole pipeline; the stage modules are
//! public so callers and tests can drive a single stage with fixed inputs.

pub mod bumpiness;
pub mod cliff;
mod config;
mod error;
pub mod feature;
pub mod geography;
mod grid;
pub mod islands;
mod map;
pub mod placement;
pub mod validator;
pub mod water;

pub use config::*;
pub use error::*;
pub use feature::{FeatureKind, FeatureStructure, PlacedFeature, TerrainFeatureKind};
pub use geography::{GeographyArchetype, ParseArchetypeError};
pub use grid::*;
pub use map::*;
pub use placement::{FeatureReport, Grounding};
pub use validator::{TerrainValidator, TextureClass, TextureMap, ValidationReport};
