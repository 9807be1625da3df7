//! Property-based tests for the islands generator
//!
//! Validates:
//! - islands only ever raise terrain, whatever was there before
//! - every origin ends at least as high as its rounded peak
//! - the reported lowest point is the grid minimum

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use tactica_world::bumpiness::apply_bumpiness;
use tactica_world::islands::IslandParams;
use tactica_world::{GenerationConfig, HeightGrid};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn islands_never_lower_terrain(
        seed in any::<u64>(),
        size_x in 4usize..24,
        size_z in 4usize..24,
        amplitude in 0.0f64..3.0,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = HeightGrid::new(size_x, size_z).unwrap();
        apply_bumpiness(&mut grid, amplitude, &mut rng);
        let before = grid.clone();

        let params = IslandParams::sample(&mut rng, size_x, size_z, &GenerationConfig::default())
            .unwrap();
        let lowest = params.apply(&mut grid, &mut rng);

        for (x, z, h) in before.iter() {
            let after = grid.get(x, z).unwrap();
            prop_assert!(after >= h, "({}, {}) lowered {} -> {}", x, z, h, after);
        }
        for (origin, peak) in params.origins.iter().zip(&params.peaks) {
            let at = grid.get(origin.x as usize, origin.y as usize).unwrap();
            prop_assert!(at >= peak.round() as i32);
        }
        prop_assert_eq!(lowest, grid.min_height());
    }
}
