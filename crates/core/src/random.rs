//! Random sampling primitives shared by every generator.
//!
//! All samplers take the caller's RNG explicitly; there is no global stream.

use rand::Rng;
use rand_distr::StandardNormal;

/// Standard deviations at which Gaussian samples are clamped.
pub const SD_CAP: f64 = 3.0;

/// Standard normal sample clamped to `[-SD_CAP, SD_CAP]`.
pub fn capped_gaussian<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let g: f64 = rng.sample(StandardNormal);
    g.clamp(-SD_CAP, SD_CAP)
}

/// `mean + capped_gaussian * sd`.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    mean + capped_gaussian(rng) * sd
}

/// Uniform sample in `[-1, 1)`.
pub fn signed_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    proptest! {
        #[test]
        fn capped_gaussian_stays_within_cap(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..256 {
                let g = capped_gaussian(&mut rng);
                prop_assert!((-SD_CAP..=SD_CAP).contains(&g));
            }
        }
    }

    #[test]
    fn gaussian_mean_is_close() {
        let mut rng = StdRng::seed_from_u64(99);
        let n = 20_000;
        let sum: f64 = (0..n).map(|_| gaussian(&mut rng, 7.0, 1.0)).sum();
        let mean = sum / n as f64;
        assert!((mean - 7.0).abs() < 0.05, "mean {mean}");
    }

    #[test]
    fn signed_unit_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let v = signed_unit(&mut rng);
            assert!((-1.0..1.0).contains(&v));
        }
    }
}
