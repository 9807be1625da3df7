//! The full generation pipeline for one tactical map.

use crate::bumpiness::{apply_bumpiness, sample_amplitude};
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::feature::PlacedFeature;
use crate::geography::{self, GeographyArchetype};
use crate::grid::HeightGrid;
use crate::placement::{add_features, FeatureReport};
use crate::validator::{TerrainValidator, TextureMap, ValidationReport};
use crate::water::water_height;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tactica_core::map_rng;
use tactica_core::random::gaussian;
use tracing::info;

/// What to generate. Unset fields are sampled from the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRequest {
    /// Seed of the map's single RNG stream.
    pub seed: u64,
    /// Extent along x.
    pub size_x: Option<usize>,
    /// Extent along z.
    pub size_z: Option<usize>,
    /// Terrain shape.
    pub archetype: Option<GeographyArchetype>,
    /// Run feature placement.
    pub features: bool,
}

impl MapRequest {
    /// Fully random map for `seed`, with features.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            size_x: None,
            size_z: None,
            archetype: None,
            features: true,
        }
    }
}

/// Height statistics of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Relief {
    /// Lowest cell.
    pub min: i32,
    /// Highest cell.
    pub max: i32,
    /// Mean cell height.
    pub mean: f64,
}

/// A generated map and everything derived while building it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalMap {
    /// Seed the map was generated from.
    pub seed: u64,
    /// Terrain shape used.
    pub archetype: GeographyArchetype,
    /// Final heights, including grounding.
    pub grid: HeightGrid,
    /// Lowest point after bumpiness; the water height is derived from it.
    pub lowest_point: i32,
    /// Water surface height.
    pub water_height: i32,
    /// Per-cell texture classes with feature footprints stamped in.
    pub textures: TextureMap,
    /// Placed features in placement order.
    pub features: Vec<PlacedFeature>,
    /// Feature slot accounting.
    pub feature_report: FeatureReport,
    /// Connectivity repair summary.
    pub validation: ValidationReport,
}

fn sample_axis<R: Rng + ?Sized>(config: &GenerationConfig, rng: &mut R) -> usize {
    let size = gaussian(rng, config.map_size_mean, config.map_size_sd).round();
    (size.max(0.0) as usize).max(config.min_map_size.max(1))
}

impl TacticalMap {
    /// Run every stage in order on one RNG stream built from `request.seed`.
    pub fn generate(request: &MapRequest, config: &GenerationConfig) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();
        let mut rng = map_rng(request.seed);

        let size_x = match request.size_x {
            Some(size) => size,
            None => sample_axis(config, &mut rng),
        };
        let size_z = match request.size_z {
            Some(size) => size,
            None => sample_axis(config, &mut rng),
        };
        let archetype = match request.archetype {
            Some(archetype) => archetype,
            None => GeographyArchetype::random(&mut rng),
        };

        let (mut grid, _) = geography::generate(archetype, size_x, size_z, config, &mut rng)?;
        let amplitude = sample_amplitude(config, &mut rng);
        let lowest_point = apply_bumpiness(&mut grid, amplitude, &mut rng);
        let water_height = water_height(lowest_point, config, &mut rng);

        let validator = TerrainValidator::new(water_height, config.max_climb);
        let validation = validator.ensure_connected(&mut grid);

        let (features, feature_report) = if request.features {
            add_features(&mut grid, lowest_point, &validator, config, &mut rng)
        } else {
            (Vec::new(), FeatureReport::default())
        };
        // Classes come from the grounded heights; footprints go on top.
        let mut textures = validator.classify(&grid);
        for feature in &features {
            textures.stamp(feature);
        }

        info!(
            seed = request.seed,
            archetype = %archetype,
            size_x,
            size_z,
            lowest_point,
            water_height,
            features = features.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generated tactical map"
        );

        Ok(Self {
            seed: request.seed,
            archetype,
            grid,
            lowest_point,
            water_height,
            textures,
            features,
            feature_report,
            validation,
        })
    }

    /// Min, max and mean of the final grid.
    pub fn relief(&self) -> Relief {
        Relief {
            min: self.grid.min_height(),
            max: self.grid.max_height(),
            mean: self.grid.mean_height(),
        }
    }
}
