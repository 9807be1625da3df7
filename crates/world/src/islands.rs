//! Islands generator.
//!
//! Each island grows outward from its origin by breadth-first propagation over
//! a canvas twice the size of the map, so islands whose origins sit near an
//! edge keep their shape. Cells only ever raise the terrain they land on.

use crate::config::GenerationConfig;
use crate::error::{Result, TerrainError};
use crate::grid::{HeightGrid, NEIGHBORS_4};
use glam::IVec2;
use rand::Rng;
use std::collections::VecDeque;
use tactica_core::random::gaussian;
use tracing::debug;

/// Mean peak height of an island, in steps.
pub const ISLAND_PEAK_MEAN: f64 = 7.0;
/// Standard deviation of the peak height.
pub const ISLAND_PEAK_SD: f64 = 1.0;
/// Scale of the per-cell descent away from a peak.
pub const ISLAND_SLOPE_SD: f64 = 1.0;
/// Marks a cell where the island has run out of height.
const HARD_STOP: f64 = -1.0e9;

/// Parameters of the [`crate::GeographyArchetype::Islands`] generator.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandParams {
    /// Island origins in grid coordinates.
    pub origins: Vec<IVec2>,
    /// Peak height for each origin.
    pub peaks: Vec<f64>,
    /// Scale of the random descent per propagation step.
    pub slope_sd: f64,
}

impl IslandParams {
    /// Draw islands for a map of the given size.
    pub fn sample<R: Rng + ?Sized>(
        rng: &mut R,
        size_x: usize,
        size_z: usize,
        config: &GenerationConfig,
    ) -> Result<Self> {
        let avg = (size_x + size_z) as f64 / 2.0;
        let fraction = rng.gen_range(config.island_fraction_min..=config.island_fraction_max);
        let count = ((avg * fraction).round() as usize).max(2);
        let origins = sample_origins(rng, count, size_x, size_z, config)?;
        let peaks = (0..count)
            .map(|_| gaussian(rng, ISLAND_PEAK_MEAN, ISLAND_PEAK_SD))
            .collect();
        Ok(Self {
            origins,
            peaks,
            slope_sd: ISLAND_SLOPE_SD,
        })
    }

    /// Raise every island into `grid`, returning the grid's lowest point.
    pub fn apply<R: Rng + ?Sized>(&self, grid: &mut HeightGrid, rng: &mut R) -> i32 {
        for (origin, &peak) in self.origins.iter().zip(&self.peaks) {
            let raised = self.grow(grid, *origin, peak, rng);
            debug!(x = origin.x, z = origin.y, peak, raised, "grew island");
        }
        grid.min_height()
    }

    /// Propagate one island and return the number of grid cells it raised.
    fn grow<R: Rng + ?Sized>(
        &self,
        grid: &mut HeightGrid,
        origin: IVec2,
        peak: f64,
        rng: &mut R,
    ) -> usize {
        let (size_x, size_z) = (grid.size_x() as i32, grid.size_z() as i32);
        let (canvas_x, canvas_z) = (size_x * 2, size_z * 2);
        let offset = IVec2::new(size_x / 2, size_z / 2);
        let index = |p: IVec2| (p.x * canvas_z + p.y) as usize;

        let mut heights: Vec<Option<f64>> = vec![None; (canvas_x * canvas_z) as usize];
        let mut queued = vec![false; heights.len()];
        let mut queue = VecDeque::new();
        let start = origin + offset;
        queued[index(start)] = true;
        queue.push_back(start);

        let mut raised = 0;
        while let Some(cell) = queue.pop_front() {
            let mut sum = 0.0;
            let mut computed = 0;
            for &(dx, dz) in &NEIGHBORS_4 {
                let n = cell + IVec2::new(dx, dz);
                if n.x < 0 || n.y < 0 || n.x >= canvas_x || n.y >= canvas_z {
                    continue;
                }
                if let Some(h) = heights[index(n)] {
                    sum += h;
                    computed += 1;
                }
            }

            let height = if cell == start {
                peak
            } else {
                let h = sum / computed as f64 - gaussian(rng, 0.0, 1.0).abs() * self.slope_sd;
                if h <= 0.0 {
                    HARD_STOP
                } else {
                    h
                }
            };
            heights[index(cell)] = Some(height);

            let at = cell - offset;
            if height > 0.0
                && grid.contains(at.x, at.y)
                && grid.raise_to(at.x as usize, at.y as usize, height.round() as i32)
            {
                raised += 1;
            }

            for &(dx, dz) in &NEIGHBORS_4 {
                let n = cell + IVec2::new(dx, dz);
                if n.x < 0 || n.y < 0 || n.x >= canvas_x || n.y >= canvas_z {
                    continue;
                }
                if !queued[index(n)] {
                    queued[index(n)] = true;
                    queue.push_back(n);
                }
            }
        }
        raised
    }
}

/// Total length of the closed chain through `points` in order.
fn closed_chain_length(points: &[IVec2]) -> f64 {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.as_dvec2().distance(b.as_dvec2()))
        .sum()
}

/// Rejection-sample `count` origins spread far enough apart.
///
/// The closed chain of consecutive distances must exceed
/// `island_spread_factor * average_axis * count`. A single island has no
/// spread, so `count < 2` can never succeed.
pub fn sample_origins<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    size_x: usize,
    size_z: usize,
    config: &GenerationConfig,
) -> Result<Vec<IVec2>> {
    let attempts = config.island_origin_attempts;
    if count < 2 {
        return Err(TerrainError::ConstraintUnsatisfiable {
            constraint: "island origin spread",
            attempts: 0,
        });
    }
    let avg = (size_x + size_z) as f64 / 2.0;
    let threshold = config.island_spread_factor * avg * count as f64;
    for attempt in 0..attempts {
        let origins: Vec<IVec2> = (0..count)
            .map(|_| {
                IVec2::new(
                    rng.gen_range(0..size_x as i32),
                    rng.gen_range(0..size_z as i32),
                )
            })
            .collect();
        if closed_chain_length(&origins) > threshold {
            debug!(count, attempt, "island origins accepted");
            return Ok(origins);
        }
    }
    Err(TerrainError::ConstraintUnsatisfiable {
        constraint: "island origin spread",
        attempts,
    })
}
