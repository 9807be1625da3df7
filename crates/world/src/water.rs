//! Water level derived from the final lowest point.

use crate::config::GenerationConfig;
use rand::Rng;
use tactica_core::random::gaussian;

/// `lowest_point + round(offset)`.
pub fn water_height_with_offset(lowest_point: i32, offset: f64) -> i32 {
    lowest_point + offset.round() as i32
}

/// Sample the water height for a grid whose minimum is `lowest_point`.
pub fn water_height<R: Rng + ?Sized>(
    lowest_point: i32,
    config: &GenerationConfig,
    rng: &mut R,
) -> i32 {
    let offset = gaussian(rng, config.water_level_mean, config.water_level_sd);
    water_height_with_offset(lowest_point, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn offset_rounds_half_away_from_zero() {
        assert_eq!(water_height_with_offset(3, 0.5), 4);
        assert_eq!(water_height_with_offset(3, -0.5), 2);
        assert_eq!(water_height_with_offset(-4, -2.2), -6);
    }

    #[test]
    fn sampled_height_stays_within_cap() {
        let config = GenerationConfig::default();
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            let h = water_height(10, &config, &mut rng);
            // mean -2, sd 2, capped at 3 sd.
            assert!((2..=14).contains(&h), "water {h}");
        }
    }
}
