//! Discrete structures placed on top of the terrain.
//!
//! A feature is described by a parameter struct per kind. The parameters
//! build a [`FeatureStructure`], a voxel set relative to the feature's origin
//! corner, from which footprint, base and surface are derived.

use glam::{IVec3, UVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tactica_core::random::gaussian;
use tactica_core::{Direction, TILE_HEIGHT};

/// Smallest building footprint along either axis.
pub const BUILDING_MIN_DIMENSION: f64 = 3.0;
/// Mean building footprint along either axis.
pub const BUILDING_SIZE_MEAN: f64 = 5.0;
/// Standard deviation of the building footprint.
pub const BUILDING_SIZE_SD: f64 = 1.0;
/// Scale of the extra storeys drawn for a building.
pub const BUILDING_HEIGHT_SD: f64 = 0.25;
/// Largest column radius.
pub const COLUMN_MAX_RADIUS: u32 = 2;
/// Column height range in steps.
pub const COLUMN_HEIGHT_RANGE: std::ops::RangeInclusive<u32> = 2..=8;

/// Steps in one storey: three world units.
pub fn one_storey_steps() -> u32 {
    (3.0 / TILE_HEIGHT).round() as u32
}

/// Tag of every placeable feature kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainFeatureKind {
    /// A walled, roofed block.
    Building,
    /// A solid vertical pillar.
    Column,
}

impl TerrainFeatureKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 2] = [Self::Building, Self::Column];

    /// Pick a kind uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Whether new features of this kind try to attach beside existing ones.
    pub const fn clusters(self) -> bool {
        matches!(self, Self::Building)
    }

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Column => "column",
        }
    }
}

impl fmt::Display for TerrainFeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voxel offsets of one feature plus the measurements derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStructure {
    voxels: Vec<UVec3>,
    size: UVec3,
    surface: Vec<Option<u32>>,
    base: Vec<Option<u32>>,
    highest_point: u32,
}

impl FeatureStructure {
    /// Build from voxel offsets. Duplicates are merged.
    pub fn from_voxels(voxels: impl IntoIterator<Item = UVec3>) -> Self {
        let mut voxels: Vec<UVec3> = voxels.into_iter().collect();
        voxels.sort_by_key(|v| (v.x, v.z, v.y));
        voxels.dedup();

        let size = voxels
            .iter()
            .fold(UVec3::ZERO, |acc, v| acc.max(*v + UVec3::ONE));
        let columns = (size.x * size.z) as usize;
        let mut surface = vec![None; columns];
        let mut base = vec![None; columns];
        for v in &voxels {
            let i = (v.x * size.z + v.z) as usize;
            surface[i] = Some(surface[i].map_or(v.y, |s: u32| s.max(v.y)));
            base[i] = Some(base[i].map_or(v.y, |b: u32| b.min(v.y)));
        }
        let highest_point = voxels.iter().map(|v| v.y).max().unwrap_or(0);

        Self {
            voxels,
            size,
            surface,
            base,
            highest_point,
        }
    }

    /// Occupied offsets, sorted.
    pub fn voxels(&self) -> &[UVec3] {
        &self.voxels
    }

    /// Bounding box extent: the largest offset plus one on each axis.
    pub fn size(&self) -> UVec3 {
        self.size
    }

    /// Highest occupied y in column `(x, z)`.
    pub fn surface(&self, x: u32, z: u32) -> Option<u32> {
        self.column_index(x, z).and_then(|i| self.surface[i])
    }

    /// Lowest occupied y in column `(x, z)`.
    pub fn base(&self, x: u32, z: u32) -> Option<u32> {
        self.column_index(x, z).and_then(|i| self.base[i])
    }

    /// Highest occupied y anywhere in the structure.
    pub fn highest_point(&self) -> u32 {
        self.highest_point
    }

    fn column_index(&self, x: u32, z: u32) -> Option<usize> {
        (x < self.size.x && z < self.size.z).then(|| (x * self.size.z + z) as usize)
    }

    /// Columns holding at least one voxel, as `(x, z)` offsets.
    pub fn occupied_columns(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let size_z = self.size.z;
        self.base
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_some())
            .map(move |(i, _)| (i as u32 / size_z, i as u32 % size_z))
    }

    /// Columns whose base sits on the structure's lowest layer.
    pub fn base_layer_columns(&self) -> Vec<(u32, u32)> {
        let lowest = self.base.iter().flatten().copied().min();
        match lowest {
            Some(lowest) => self
                .occupied_columns()
                .filter(|&(x, z)| self.base(x, z) == Some(lowest))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Parameters of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingParams {
    /// Footprint along x, in tiles.
    pub size_x: u32,
    /// Footprint along z, in tiles.
    pub size_z: u32,
    /// Number of storeys, at least one.
    pub storeys: u32,
    /// Side the entrance faces.
    pub facing: Direction,
}

impl BuildingParams {
    /// Draw a building.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let size_x = sample_side(rng);
        let size_z = sample_side(rng);
        let storeys = (1.0 + gaussian(rng, 0.0, 1.0).abs() * BUILDING_HEIGHT_SD).round() as u32;
        let facing = Direction::random(rng);
        Self {
            size_x,
            size_z,
            storeys,
            facing,
        }
    }

    /// Same building resized to another footprint.
    pub fn with_footprint(self, size_x: u32, size_z: u32) -> Self {
        Self {
            size_x,
            size_z,
            ..self
        }
    }

    /// Height in steps, floor to roof inclusive.
    pub fn height(&self) -> u32 {
        one_storey_steps() * self.storeys.max(1)
    }

    /// Floor, perimeter walls and roof.
    pub fn structure(&self) -> FeatureStructure {
        let (sx, sz, h) = (self.size_x.max(1), self.size_z.max(1), self.height());
        let mut voxels = Vec::new();
        for x in 0..sx {
            for z in 0..sz {
                let wall = x == 0 || z == 0 || x == sx - 1 || z == sz - 1;
                for y in 0..h {
                    if y == 0 || y == h - 1 || wall {
                        voxels.push(UVec3::new(x, y, z));
                    }
                }
            }
        }
        FeatureStructure::from_voxels(voxels)
    }
}

fn sample_side<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    gaussian(rng, BUILDING_SIZE_MEAN, BUILDING_SIZE_SD)
        .max(BUILDING_MIN_DIMENSION)
        .round() as u32
}

/// Parameters of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnParams {
    /// Disc radius in tiles; zero is a single-tile pillar.
    pub radius: u32,
    /// Height in steps.
    pub height: u32,
}

impl ColumnParams {
    /// Draw a column.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            radius: rng.gen_range(0..=COLUMN_MAX_RADIUS),
            height: rng.gen_range(COLUMN_HEIGHT_RANGE),
        }
    }

    /// A stack of discs centred in a `2r + 1` square.
    pub fn structure(&self) -> FeatureStructure {
        let r = self.radius as i32;
        let mut voxels = Vec::new();
        for dx in -r..=r {
            for dz in -r..=r {
                if dx * dx + dz * dz > r * r {
                    continue;
                }
                for y in 0..self.height.max(1) {
                    voxels.push(UVec3::new((dx + r) as u32, y, (dz + r) as u32));
                }
            }
        }
        FeatureStructure::from_voxels(voxels)
    }
}

/// A feature kind together with its sampled parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    /// See [`BuildingParams`].
    Building(BuildingParams),
    /// See [`ColumnParams`].
    Column(ColumnParams),
}

impl FeatureKind {
    /// Draw parameters for `kind`.
    pub fn sample<R: Rng + ?Sized>(kind: TerrainFeatureKind, rng: &mut R) -> Self {
        match kind {
            TerrainFeatureKind::Building => Self::Building(BuildingParams::sample(rng)),
            TerrainFeatureKind::Column => Self::Column(ColumnParams::sample(rng)),
        }
    }

    /// Pick a kind uniformly at random and draw its parameters.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let kind = TerrainFeatureKind::random(rng);
        Self::sample(kind, rng)
    }

    /// The kind tag.
    pub fn tag(&self) -> TerrainFeatureKind {
        match self {
            Self::Building(_) => TerrainFeatureKind::Building,
            Self::Column(_) => TerrainFeatureKind::Column,
        }
    }

    /// Voxel structure for these parameters.
    pub fn structure(&self) -> FeatureStructure {
        match self {
            Self::Building(b) => b.structure(),
            Self::Column(c) => c.structure(),
        }
    }

    /// Facing of the placed feature. Columns have no front and face north.
    pub fn facing(&self) -> Direction {
        match self {
            Self::Building(b) => b.facing,
            Self::Column(_) => Direction::North,
        }
    }
}

/// Inclusive rectangle covered by a feature on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    /// Lowest x covered.
    pub min_x: i32,
    /// Lowest z covered.
    pub min_z: i32,
    /// Highest x covered.
    pub max_x: i32,
    /// Highest z covered.
    pub max_z: i32,
}

impl Footprint {
    /// Rectangle of `size` starting at `(x, z)`.
    pub fn at(x: i32, z: i32, size: UVec3) -> Self {
        Self {
            min_x: x,
            min_z: z,
            max_x: x + size.x as i32 - 1,
            max_z: z + size.z as i32 - 1,
        }
    }

    /// Whether two rectangles share any cell.
    pub fn intersects(self, other: Footprint) -> bool {
        ranges_intersect(self.min_x, self.max_x, other.min_x, other.max_x)
            && ranges_intersect(self.min_z, self.max_z, other.min_z, other.max_z)
    }

    /// Whether `(x, z)` is inside the rectangle.
    pub fn contains(self, x: i32, z: i32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_z..=self.max_z).contains(&z)
    }
}

fn ranges_intersect(a_min: i32, a_max: i32, b_min: i32, b_max: i32) -> bool {
    a_min <= b_max && b_min <= a_max
}

/// A feature committed to the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedFeature {
    /// Kind and parameters.
    pub kind: FeatureKind,
    /// Grid position of the structure's origin corner; `y` is the lowest voxel layer.
    pub origin: IVec3,
    /// Front side.
    pub facing: Direction,
    /// Voxel structure.
    pub structure: FeatureStructure,
}

impl PlacedFeature {
    /// Bounding rectangle on the grid.
    pub fn footprint(&self) -> Footprint {
        Footprint::at(self.origin.x, self.origin.z, self.structure.size())
    }

    /// Whether the bounding rectangles of two features overlap.
    pub fn overlaps(&self, other: &PlacedFeature) -> bool {
        self.footprint().intersects(other.footprint())
    }

    /// Grid cells under occupied columns.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.structure
            .occupied_columns()
            .map(|(x, z)| (self.origin.x + x as i32, self.origin.z + z as i32))
    }
}
