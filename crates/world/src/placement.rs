//! Feature placement and grounding.
//!
//! Placement tries cluster attachment first for kinds that cluster, then
//! falls back to uniformly random candidates. An accepted candidate is
//! grounded: the feature sits one step above a randomised percentile of the
//! terrain under its base, and terrain below that level is raised to meet it.

use crate::config::GenerationConfig;
use crate::feature::{FeatureKind, Footprint, PlacedFeature};
use crate::grid::HeightGrid;
use crate::validator::TerrainValidator;
use glam::IVec3;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tactica_core::geometry::lerp;
use tactica_core::random::gaussian;
use tactica_core::Direction;
use tracing::debug;

/// Mean percentile of the footprint heights used as ground level.
pub const GROUND_FEATURE_MEAN: f64 = 0.5;
/// Standard deviation of the ground percentile.
pub const GROUND_FEATURE_SD: f64 = 0.05;
/// Largest gap between clustered buildings, exclusive.
pub const MAX_WALL_GAP: i32 = 4;
/// Smallest gap in front of a building's facing side.
pub const MIN_FRONT_GAP: i32 = 4;
/// Largest gap in front of a building's facing side, exclusive.
pub const MAX_FRONT_GAP: i32 = 8;

/// Outcome of grounding one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grounding {
    /// Chosen ground level.
    pub level: i32,
    /// Lowest sampled base height, if any column was on the grid.
    pub min_sampled: Option<i32>,
    /// Highest sampled base height, if any column was on the grid.
    pub max_sampled: Option<i32>,
    /// Grid cells raised to `level`.
    pub raised_cells: usize,
}

/// Ground level at fractional rank `fraction` of `sorted` heights.
///
/// The rank is clamped to the slice and interpolated between the two
/// bracketing values. Returns `None` for an empty slice.
pub fn pick_ground_level(sorted: &[i32], fraction: f64) -> Option<i32> {
    let last = sorted.len().checked_sub(1)?;
    let idx = (fraction * last as f64).clamp(0.0, last as f64);
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    let level = lerp(sorted[lo] as f64, sorted[hi] as f64, idx - lo as f64);
    Some(level.round() as i32)
}

/// Ground a feature whose origin corner sits at `(x, z)`.
///
/// Falls back to `lowest_point` when no base column lies on the grid.
pub fn ground_feature<R: Rng + ?Sized>(
    grid: &mut HeightGrid,
    kind: &FeatureKind,
    x: i32,
    z: i32,
    lowest_point: i32,
    rng: &mut R,
) -> Grounding {
    let structure = kind.structure();
    let mut heights: Vec<i32> = structure
        .base_layer_columns()
        .into_iter()
        .filter_map(|(cx, cz)| grid.get_signed(x + cx as i32, z + cz as i32))
        .collect();
    heights.sort_unstable();

    let fraction = gaussian(rng, GROUND_FEATURE_MEAN, GROUND_FEATURE_SD);
    let level = pick_ground_level(&heights, fraction).unwrap_or(lowest_point);

    let mut raised_cells = 0;
    for (cx, cz) in structure.occupied_columns() {
        let (gx, gz) = (x + cx as i32, z + cz as i32);
        if grid.contains(gx, gz) && grid.raise_to(gx as usize, gz as usize, level) {
            raised_cells += 1;
        }
    }

    Grounding {
        level,
        min_sampled: heights.first().copied(),
        max_sampled: heights.last().copied(),
        raised_cells,
    }
}

/// Whether a footprint stays within the allowed overhang and clear of others.
///
/// A feature may hang over each grid edge by up to a quarter of its own
/// extent along that axis.
fn fits(footprint: Footprint, grid: &HeightGrid, existing: &[PlacedFeature]) -> bool {
    let width = footprint.max_x - footprint.min_x + 1;
    let depth = footprint.max_z - footprint.min_z + 1;
    let (over_x, over_z) = (width / 4, depth / 4);
    let inside = footprint.min_x >= -over_x
        && footprint.min_z >= -over_z
        && footprint.max_x < grid.size_x() as i32 + over_x
        && footprint.max_z < grid.size_z() as i32 + over_z;
    inside && existing.iter().all(|f| !f.footprint().intersects(footprint))
}

/// Try to attach `kind` beside an existing feature of the same clustering kind.
///
/// Returns the resized kind and its origin corner.
pub fn cluster_candidate<R: Rng + ?Sized>(
    kind: &FeatureKind,
    grid: &HeightGrid,
    existing: &[PlacedFeature],
    rng: &mut R,
) -> Option<(FeatureKind, i32, i32)> {
    let FeatureKind::Building(params) = kind else {
        return None;
    };
    let mut anchors: Vec<&PlacedFeature> = existing
        .iter()
        .filter(|f| f.kind.tag() == kind.tag())
        .collect();
    anchors.shuffle(rng);

    for anchor in anchors {
        let size = anchor.structure.size();
        let resized = FeatureKind::Building(params.with_footprint(size.x, size.z));
        let ex = anchor.footprint();
        let (sx, sz) = (size.x as i32, size.z as i32);

        for dir in Direction::shuffled(rng) {
            let gap = if dir == anchor.facing {
                rng.gen_range(MIN_FRONT_GAP..MAX_FRONT_GAP)
            } else {
                rng.gen_range(0..MAX_WALL_GAP)
            };
            let (x, z) = match dir {
                Direction::East => (ex.max_x + 1 + gap, ex.min_z),
                Direction::West => (ex.min_x - gap - sx, ex.min_z),
                Direction::South => (ex.min_x, ex.max_z + 1 + gap),
                Direction::North => (ex.min_x, ex.min_z - gap - sz),
            };
            if fits(Footprint::at(x, z, size), grid, existing) {
                return Some((resized, x, z));
            }
        }
    }
    None
}

/// Draw one random origin corner, or `None` if the feature cannot fit at all.
fn random_candidate<R: Rng + ?Sized>(
    kind: &FeatureKind,
    grid: &HeightGrid,
    rng: &mut R,
) -> Option<(i32, i32)> {
    let size = kind.structure().size();
    let (sx, sz) = (size.x as i32, size.z as i32);
    let x_range = -(sx / 4)..=grid.size_x() as i32 - sx + sx / 4;
    let z_range = -(sz / 4)..=grid.size_z() as i32 - sz + sz / 4;
    if x_range.is_empty() || z_range.is_empty() {
        return None;
    }
    Some((rng.gen_range(x_range), rng.gen_range(z_range)))
}

/// Place `kind` and report how it was grounded.
pub fn place_with_grounding<R: Rng + ?Sized>(
    kind: FeatureKind,
    grid: &mut HeightGrid,
    lowest_point: i32,
    existing: &[PlacedFeature],
    rng: &mut R,
    max_attempts: u32,
) -> Option<(PlacedFeature, Grounding)> {
    let mut accepted = None;
    if kind.tag().clusters() {
        accepted = cluster_candidate(&kind, grid, existing, rng);
    }
    if accepted.is_none() {
        let size = kind.structure().size();
        for attempt in 0..max_attempts {
            let Some((x, z)) = random_candidate(&kind, grid, rng) else {
                break;
            };
            if fits(Footprint::at(x, z, size), grid, existing) {
                debug!(kind = %kind.tag(), attempt, x, z, "random candidate accepted");
                accepted = Some((kind, x, z));
                break;
            }
        }
    }

    let (kind, x, z) = accepted?;
    let grounding = ground_feature(grid, &kind, x, z, lowest_point, rng);
    let feature = PlacedFeature {
        kind,
        origin: IVec3::new(x, grounding.level + 1, z),
        facing: kind.facing(),
        structure: kind.structure(),
    };
    Some((feature, grounding))
}

/// Place `kind` on the grid, or `None` if every candidate was rejected.
pub fn place<R: Rng + ?Sized>(
    kind: FeatureKind,
    grid: &mut HeightGrid,
    lowest_point: i32,
    existing: &[PlacedFeature],
    rng: &mut R,
    max_attempts: u32,
) -> Option<PlacedFeature> {
    place_with_grounding(kind, grid, lowest_point, existing, rng, max_attempts).map(|(f, _)| f)
}

/// Summary of one [`add_features`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureReport {
    /// Slots drawn for this map.
    pub requested: usize,
    /// Features committed.
    pub placed: usize,
    /// Attempts spent on each slot.
    pub attempts_per_slot: Vec<u32>,
    /// Placements undone because grounding cut off dry cells.
    pub split_rejections: usize,
}

/// Number of feature slots for a map with the given average axis.
pub fn requested_features<R: Rng + ?Sized>(
    average_axis: f64,
    config: &GenerationConfig,
    rng: &mut R,
) -> usize {
    let ratio = gaussian(rng, config.features_per_axis_mean, config.features_per_axis_sd);
    (average_axis * ratio).round().max(0.0) as usize
}

/// Populate the grid with features.
///
/// Each slot gets up to `feature_add_timeout` attempts, each with a freshly
/// drawn kind, and stops at the first placement. Abandoned slots add nothing.
/// When the grid starts out connected under `validator`, a placement whose
/// grounding would cut off dry cells is undone and counts as a failed attempt.
pub fn add_features<R: Rng + ?Sized>(
    grid: &mut HeightGrid,
    lowest_point: i32,
    validator: &TerrainValidator,
    config: &GenerationConfig,
    rng: &mut R,
) -> (Vec<PlacedFeature>, FeatureReport) {
    let requested = requested_features(grid.average_axis(), config, rng);
    let keep_connected = validator.is_connected(grid);
    let mut features: Vec<PlacedFeature> = Vec::with_capacity(requested);
    let mut attempts_per_slot = Vec::with_capacity(requested);
    let mut split_rejections = 0;

    for slot in 0..requested {
        let mut attempts = 0;
        while attempts < config.feature_add_timeout {
            attempts += 1;
            let kind = FeatureKind::random(rng);
            let before = keep_connected.then(|| grid.clone());
            let Some(feature) =
                place(kind, grid, lowest_point, &features, rng, config.placement_attempts)
            else {
                continue;
            };
            if let Some(before) = before {
                if !validator.is_connected(grid) {
                    debug!(slot, attempts, kind = %kind.tag(), "grounding split the map, undone");
                    *grid = before;
                    split_rejections += 1;
                    continue;
                }
            }
            debug!(slot, attempts, kind = %feature.kind.tag(), "placed feature");
            features.push(feature);
            break;
        }
        attempts_per_slot.push(attempts);
    }

    let report = FeatureReport {
        requested,
        placed: features.len(),
        attempts_per_slot,
        split_rejections,
    };
    debug!(
        requested,
        placed = report.placed,
        split_rejections,
        "added features"
    );
    (features, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bumpiness::apply_bumpiness;
    use crate::feature::{BuildingParams, ColumnParams};
    use rand::{rngs::StdRng, SeedableRng};

    fn building(size_x: u32, size_z: u32, facing: Direction) -> FeatureKind {
        FeatureKind::Building(BuildingParams {
            size_x,
            size_z,
            storeys: 1,
            facing,
        })
    }

    #[test]
    fn ground_level_interpolates_sorted_heights() {
        assert_eq!(pick_ground_level(&[], 0.5), None);
        assert_eq!(pick_ground_level(&[4], 0.9), Some(4));
        assert_eq!(pick_ground_level(&[1, 2, 3, 4, 5], 0.5), Some(3));
        assert_eq!(pick_ground_level(&[0, 10], 0.5), Some(5));
        assert_eq!(pick_ground_level(&[0, 10], 0.62), Some(6));
        assert_eq!(pick_ground_level(&[0, 10], 2.0), Some(10));
        assert_eq!(pick_ground_level(&[0, 10], -1.0), Some(0));
    }

    #[test]
    fn grounding_raises_only_below_level() {
        let mut grid = HeightGrid::new(8, 8).expect("grid");
        grid.fill_with(|x, z| (x + z) as i32);
        let before = grid.clone();
        let mut rng = StdRng::seed_from_u64(41);
        let kind = building(4, 4, Direction::North);
        let g = ground_feature(&mut grid, &kind, 2, 2, 0, &mut rng);

        assert_eq!(g.min_sampled, Some(4));
        assert_eq!(g.max_sampled, Some(10));
        assert!((4..=10).contains(&g.level));
        for x in 2..6 {
            for z in 2..6 {
                let h = grid.get(x, z).expect("cell");
                let old = before.get(x, z).expect("cell");
                assert_eq!(h, old.max(g.level));
            }
        }
        assert_eq!(grid.get(0, 0), Some(0));
    }

    #[test]
    fn grounding_off_grid_uses_lowest_point() {
        let mut grid = HeightGrid::new(4, 4).expect("grid");
        let mut rng = StdRng::seed_from_u64(42);
        let kind = FeatureKind::Column(ColumnParams {
            radius: 0,
            height: 3,
        });
        let g = ground_feature(&mut grid, &kind, 20, 20, -7, &mut rng);
        assert_eq!(g.level, -7);
        assert_eq!(g.min_sampled, None);
        assert_eq!(g.raised_cells, 0);
    }

    #[test]
    fn placed_on_flat_ground_sits_one_step_up() {
        let mut grid = HeightGrid::new(16, 16).expect("grid");
        let mut rng = StdRng::seed_from_u64(43);
        let feature = place(building(4, 4, Direction::South), &mut grid, 0, &[], &mut rng, 10)
            .expect("placed");
        assert_eq!(feature.origin.y, 1);
        let fp = feature.footprint();
        assert!(fp.min_x >= -1 && fp.max_x <= 16);
        assert!(fp.min_z >= -1 && fp.max_z <= 16);
    }

    #[test]
    fn oversized_feature_is_rejected() {
        let mut grid = HeightGrid::new(4, 4).expect("grid");
        let mut rng = StdRng::seed_from_u64(44);
        let placed = place(building(12, 12, Direction::North), &mut grid, 0, &[], &mut rng, 10);
        assert!(placed.is_none());
        assert!(grid.iter().all(|(_, _, h)| h == 0));
    }

    #[test]
    fn cluster_attaches_with_matching_size_and_gap() {
        let grid = HeightGrid::new(48, 48).expect("grid");
        let mut rng = StdRng::seed_from_u64(45);
        for facing in Direction::ALL {
            let anchor_kind = building(5, 4, facing);
            let anchor = PlacedFeature {
                kind: anchor_kind,
                origin: IVec3::new(20, 1, 20),
                facing,
                structure: anchor_kind.structure(),
            };
            let ex = anchor.footprint();
            let existing = [anchor];
            let (kind, x, z) =
                cluster_candidate(&building(3, 7, Direction::West), &grid, &existing, &mut rng)
                    .expect("attached");
            let size = kind.structure().size();
            assert_eq!((size.x, size.z), (5, 4));

            let fp = Footprint::at(x, z, size);
            assert!(!fp.intersects(ex));
            let (gap, side) = if fp.min_x > ex.max_x {
                (fp.min_x - ex.max_x - 1, Direction::East)
            } else if fp.max_x < ex.min_x {
                (ex.min_x - fp.max_x - 1, Direction::West)
            } else if fp.min_z > ex.max_z {
                (fp.min_z - ex.max_z - 1, Direction::South)
            } else {
                (ex.min_z - fp.max_z - 1, Direction::North)
            };
            if side == facing {
                assert!((MIN_FRONT_GAP..MAX_FRONT_GAP).contains(&gap), "front gap {gap}");
            } else {
                assert!((0..MAX_WALL_GAP).contains(&gap), "wall gap {gap}");
            }
        }
    }

    #[test]
    fn columns_never_cluster() {
        let grid = HeightGrid::new(16, 16).expect("grid");
        let mut rng = StdRng::seed_from_u64(46);
        let column = FeatureKind::Column(ColumnParams {
            radius: 1,
            height: 4,
        });
        let anchor = PlacedFeature {
            kind: column,
            origin: IVec3::new(5, 1, 5),
            facing: Direction::North,
            structure: column.structure(),
        };
        assert!(cluster_candidate(&column, &grid, &[anchor], &mut rng).is_none());
    }

    #[test]
    fn add_features_respects_timeout_and_disjointness() {
        let config = GenerationConfig::default();
        let mut rng = StdRng::seed_from_u64(47);
        for _ in 0..30 {
            let mut grid = HeightGrid::new(20, 20).expect("grid");
            let (features, report) =
                add_features(&mut grid, 0, &TerrainValidator::new(-1, 3), &config, &mut rng);
            assert_eq!(report.placed, features.len());
            assert_eq!(report.attempts_per_slot.len(), report.requested);
            assert!(report
                .attempts_per_slot
                .iter()
                .all(|&a| (1..=config.feature_add_timeout).contains(&a)));
            for (i, a) in features.iter().enumerate() {
                for b in &features[i + 1..] {
                    assert!(!a.overlaps(b));
                }
            }
        }
    }

    #[test]
    fn grounding_never_cuts_off_dry_cells() {
        let config = GenerationConfig {
            features_per_axis_mean: 0.6,
            ..GenerationConfig::default()
        };
        let validator = TerrainValidator::new(-100, 1);
        let mut rng = StdRng::seed_from_u64(91);
        for _ in 0..40 {
            let mut grid = HeightGrid::new(12, 12).expect("grid");
            let lowest = apply_bumpiness(&mut grid, 2.5, &mut rng);
            validator.ensure_connected(&mut grid);
            assert!(validator.is_connected(&grid));

            let (features, report) = add_features(&mut grid, lowest, &validator, &config, &mut rng);
            assert!(validator.is_connected(&grid));
            assert_eq!(report.placed, features.len());
        }
    }
}
