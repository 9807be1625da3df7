//! Tunables for the map generation pipeline.
//!
//! Archetype shape constants live beside their generators; this struct holds
//! the knobs that callers reasonably want to override from a config file.

use crate::error::{Result, TerrainError};
use serde::{Deserialize, Serialize};
use tactica_core::random::SD_CAP;

/// Largest map extent along either axis.
pub const MAX_MAP_AXIS: usize = 1024;

/// Pipeline-level generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Mean of the Gaussian used for an unspecified map axis.
    pub map_size_mean: f64,
    /// Standard deviation of the map axis size.
    pub map_size_sd: f64,
    /// Smallest axis size the default sampler will produce.
    pub min_map_size: usize,
    /// Standard deviation of the bumpiness amplitude.
    pub bumpiness_sd: f64,
    /// Mean water offset above the lowest point, in steps.
    pub water_level_mean: f64,
    /// Standard deviation of the water offset.
    pub water_level_sd: f64,
    /// Mean number of features per tile of average axis length.
    pub features_per_axis_mean: f64,
    /// Standard deviation of the features-per-axis ratio.
    pub features_per_axis_sd: f64,
    /// Attempts per feature slot before the slot is abandoned.
    pub feature_add_timeout: u32,
    /// Random candidate locations tried by a single placement.
    pub placement_attempts: u32,
    /// Lower bound of the island count as a fraction of the average axis.
    pub island_fraction_min: f64,
    /// Upper bound of the island count as a fraction of the average axis.
    pub island_fraction_max: f64,
    /// Required closed-chain spread per island, as a fraction of the average axis.
    pub island_spread_factor: f64,
    /// Rejection-sampling budget for island origins.
    pub island_origin_attempts: u32,
    /// Largest height difference a unit can step across, in steps.
    pub max_climb: i32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            map_size_mean: 16.0,
            map_size_sd: 3.0,
            min_map_size: 4,
            bumpiness_sd: 0.4,
            water_level_mean: -2.0,
            water_level_sd: 2.0,
            features_per_axis_mean: 0.25,
            features_per_axis_sd: 0.1,
            feature_add_timeout: 3,
            placement_attempts: 10,
            island_fraction_min: 0.1,
            island_fraction_max: 0.25,
            island_spread_factor: 0.35,
            island_origin_attempts: 1000,
            // One full tile of height.
            max_climb: 3,
        }
    }
}

fn invalid(field: &'static str, reason: &'static str) -> Result<()> {
    Err(TerrainError::InvalidConfig { field, reason })
}

impl GenerationConfig {
    /// Check that every setting is in range for the samplers.
    pub fn validate(&self) -> Result<()> {
        let reals = [
            ("map_size_mean", self.map_size_mean),
            ("map_size_sd", self.map_size_sd),
            ("bumpiness_sd", self.bumpiness_sd),
            ("water_level_mean", self.water_level_mean),
            ("water_level_sd", self.water_level_sd),
            ("features_per_axis_mean", self.features_per_axis_mean),
            ("features_per_axis_sd", self.features_per_axis_sd),
            ("island_fraction_min", self.island_fraction_min),
            ("island_fraction_max", self.island_fraction_max),
            ("island_spread_factor", self.island_spread_factor),
        ];
        if let Some(&(field, _)) = reals.iter().find(|(_, v)| !v.is_finite()) {
            return invalid(field, "must be a finite number");
        }

        let non_negative = [
            ("map_size_sd", self.map_size_sd),
            ("bumpiness_sd", self.bumpiness_sd),
            ("water_level_sd", self.water_level_sd),
            ("features_per_axis_sd", self.features_per_axis_sd),
            ("island_fraction_min", self.island_fraction_min),
            ("island_spread_factor", self.island_spread_factor),
        ];
        if let Some(&(field, _)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return invalid(field, "must not be negative");
        }

        if self.island_fraction_min > self.island_fraction_max {
            return invalid("island_fraction_min", "must not exceed island_fraction_max");
        }
        if self.max_climb < 0 {
            return invalid("max_climb", "must not be negative");
        }
        if self.min_map_size > MAX_MAP_AXIS {
            return invalid("min_map_size", "must not exceed the largest map axis (1024)");
        }
        if self.map_size_mean + SD_CAP * self.map_size_sd > MAX_MAP_AXIS as f64 {
            return invalid(
                "map_size_mean",
                "mean plus three deviations must not exceed the largest map axis (1024)",
            );
        }
        Ok(())
    }
}
