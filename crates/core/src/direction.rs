//! Cardinal directions on the map grid.
//!
//! `x` grows to the east and `z` grows to the south, matching the
//! `terrain[x][z]` layout of the height grid.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the four grid-aligned facings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Towards negative `z`.
    North = 0,
    /// Towards positive `x`.
    East = 1,
    /// Towards positive `z`.
    South = 2,
    /// Towards negative `x`.
    West = 3,
}

impl Direction {
    /// All directions in clockwise order.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit step `(dx, dz)` for this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// The direction facing the other way.
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Canonical string key used in configs/logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        }
    }

    /// Pick a direction uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// All four directions in a random order.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> [Self; 4] {
        let mut dirs = Self::ALL;
        dirs.shuffle(rng);
        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn opposite_offsets_cancel() {
        for dir in Direction::ALL {
            let (ax, az) = dir.offset();
            let (bx, bz) = dir.opposite().offset();
            assert_eq!((ax + bx, az + bz), (0, 0), "{}", dir.as_str());
        }
    }

    #[test]
    fn shuffled_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut dirs = Direction::shuffled(&mut rng);
        dirs.sort();
        assert_eq!(dirs, Direction::ALL);
    }
}
