//! Spatially correlated noise over a finished height grid.
//!
//! A single flood fill from a random seed cell visits every cell once. Each
//! cell's perturbation starts from the mean perturbation of its already
//! visited neighbours, so nearby cells drift together instead of jittering
//! independently.

use crate::config::GenerationConfig;
use crate::grid::HeightGrid;
use rand::Rng;
use std::collections::VecDeque;
use tactica_core::random::{gaussian, signed_unit};
use tracing::debug;

/// Draw the noise amplitude for one map.
pub fn sample_amplitude<R: Rng + ?Sized>(config: &GenerationConfig, rng: &mut R) -> f64 {
    gaussian(rng, 0.0, config.bumpiness_sd).abs()
}

/// Perturb `grid` in place and return its new lowest point.
pub fn apply_bumpiness<R: Rng + ?Sized>(grid: &mut HeightGrid, amplitude: f64, rng: &mut R) -> i32 {
    let (size_x, size_z) = (grid.size_x(), grid.size_z());
    let mut perturbation: Vec<Option<f64>> = vec![None; size_x * size_z];
    let mut queued = vec![false; size_x * size_z];
    let index = |x: usize, z: usize| x * size_z + z;

    let seed = (rng.gen_range(0..size_x), rng.gen_range(0..size_z));
    let mut queue = VecDeque::from([seed]);
    queued[index(seed.0, seed.1)] = true;

    while let Some((x, z)) = queue.pop_front() {
        let mut sum = 0.0;
        let mut visited = 0;
        for (nx, nz) in grid.neighbors(x, z) {
            if let Some(p) = perturbation[index(nx, nz)] {
                sum += p;
                visited += 1;
            }
        }
        let base = if visited == 0 { 0.0 } else { sum / visited as f64 };
        let p = base + signed_unit(rng) * amplitude;
        perturbation[index(x, z)] = Some(p);

        if let Some(cell) = grid.get_mut(x, z) {
            *cell += p.round() as i32;
        }

        let next: Vec<_> = grid.neighbors(x, z).collect();
        for (nx, nz) in next {
            if !queued[index(nx, nz)] {
                queued[index(nx, nz)] = true;
                queue.push_back((nx, nz));
            }
        }
    }

    let lowest = grid.min_height();
    debug!(amplitude, seed_x = seed.0, seed_z = seed.1, lowest, "applied bumpiness");
    lowest
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn zero_amplitude_changes_nothing() {
        let mut grid = HeightGrid::new(7, 9).expect("grid");
        grid.fill_with(|x, z| (x * z) as i32 - 10);
        let before = grid.clone();
        let mut rng = StdRng::seed_from_u64(8);
        let lowest = apply_bumpiness(&mut grid, 0.0, &mut rng);
        assert_eq!(grid, before);
        assert_eq!(lowest, -10);
    }

    #[test]
    fn reported_lowest_matches_scan() {
        let mut rng = StdRng::seed_from_u64(9);
        for amplitude in [0.2, 0.4, 1.5, 5.0] {
            let mut grid = HeightGrid::new(6, 11).expect("grid");
            let lowest = apply_bumpiness(&mut grid, amplitude, &mut rng);
            let scanned = grid.iter().map(|(_, _, h)| h).min();
            assert_eq!(Some(lowest), scanned);
        }
    }

    #[test]
    fn large_amplitude_perturbs_the_grid() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut grid = HeightGrid::new(16, 16).expect("grid");
        apply_bumpiness(&mut grid, 5.0, &mut rng);
        assert!(grid.iter().any(|(_, _, h)| h != 0));
    }

    #[test]
    fn amplitude_is_non_negative() {
        let config = GenerationConfig::default();
        let mut rng = StdRng::seed_from_u64(10);
        for _ in 0..100 {
            let a = sample_amplitude(&config, &mut rng);
            assert!(a >= 0.0 && a <= config.bumpiness_sd * 3.0);
        }
    }
}
