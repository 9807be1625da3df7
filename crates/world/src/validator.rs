//! Texture classification and connectivity repair.
//!
//! Movement between 4-neighbours is legal when the height difference is at
//! most `max_climb`. Submerged cells can be waded through but need not be
//! reachable themselves. After repair every dry cell can reach every other
//! dry cell.

use crate::feature::{PlacedFeature, TerrainFeatureKind};
use crate::grid::HeightGrid;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Surface class of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureClass {
    /// At or below the water height.
    Submerged,
    /// Dry, with a submerged neighbour.
    Waterside,
    /// Ordinary walkable ground.
    Standard,
    /// Dry rock too steep to climb on at least one side.
    SolidNatural,
    /// Under a building.
    Building,
    /// Under a column.
    Column,
}

impl TextureClass {
    /// One-character code for debug output.
    pub const fn symbol(self) -> char {
        match self {
            Self::Submerged => '~',
            Self::Waterside => ',',
            Self::Standard => '.',
            Self::SolidNatural => '^',
            Self::Building => '#',
            Self::Column => 'o',
        }
    }
}

/// Per-cell texture classes laid out like the [`HeightGrid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureMap {
    size_x: usize,
    size_z: usize,
    classes: Vec<TextureClass>,
}

impl TextureMap {
    /// Class of `(x, z)`, or `None` outside the map.
    pub fn get(&self, x: usize, z: usize) -> Option<TextureClass> {
        (x < self.size_x && z < self.size_z).then(|| self.classes[x * self.size_z + z])
    }

    fn set(&mut self, x: usize, z: usize, class: TextureClass) {
        if x < self.size_x && z < self.size_z {
            self.classes[x * self.size_z + z] = class;
        }
    }

    /// Number of cells with `class`.
    pub fn count(&self, class: TextureClass) -> usize {
        self.classes.iter().filter(|&&c| c == class).count()
    }

    /// Mark the on-grid cells under a feature's occupied columns.
    pub fn stamp(&mut self, feature: &PlacedFeature) {
        let class = match feature.kind.tag() {
            TerrainFeatureKind::Building => TextureClass::Building,
            TerrainFeatureKind::Column => TextureClass::Column,
        };
        for (x, z) in feature.occupied_cells() {
            if x >= 0 && z >= 0 {
                self.set(x as usize, z as usize, class);
            }
        }
    }
}

/// What a validation pass found and changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Components holding dry cells before repair.
    pub initial_components: usize,
    /// Cells whose height was changed.
    pub cells_adjusted: usize,
    /// Sum of absolute height changes, in steps.
    pub total_adjustment: i64,
}

/// Classifies and repairs a height grid against a water height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainValidator {
    water_height: i32,
    max_climb: i32,
}

impl TerrainValidator {
    /// Validator for the given water height and climb limit.
    pub fn new(water_height: i32, max_climb: i32) -> Self {
        Self {
            water_height,
            max_climb: max_climb.max(0),
        }
    }

    fn submerged(&self, height: i32) -> bool {
        height <= self.water_height
    }

    /// Assign a texture class to every cell.
    pub fn classify(&self, grid: &HeightGrid) -> TextureMap {
        let mut classes = Vec::with_capacity(grid.size_x() * grid.size_z());
        for (x, z, h) in grid.iter() {
            let class = if self.submerged(h) {
                TextureClass::Submerged
            } else {
                let mut waterside = false;
                let mut steepest = 0;
                for (nx, nz) in grid.neighbors(x, z) {
                    let n = grid.get(nx, nz).unwrap_or(h);
                    waterside |= self.submerged(n);
                    steepest = steepest.max((n - h).abs());
                }
                if waterside {
                    TextureClass::Waterside
                } else if steepest > self.max_climb {
                    TextureClass::SolidNatural
                } else {
                    TextureClass::Standard
                }
            };
            classes.push(class);
        }
        TextureMap {
            size_x: grid.size_x(),
            size_z: grid.size_z(),
            classes,
        }
    }

    /// Component label of every cell under the climb rule.
    fn components(&self, grid: &HeightGrid) -> (Vec<usize>, usize) {
        let size_z = grid.size_z();
        let mut labels = vec![usize::MAX; grid.size_x() * size_z];
        let mut count = 0;
        let mut queue = VecDeque::new();
        for (x, z, _) in grid.iter() {
            if labels[x * size_z + z] != usize::MAX {
                continue;
            }
            labels[x * size_z + z] = count;
            queue.push_back((x, z));
            while let Some((cx, cz)) = queue.pop_front() {
                let h = grid.get(cx, cz).unwrap_or_default();
                for (nx, nz) in grid.neighbors(cx, cz) {
                    let i = nx * size_z + nz;
                    let n = grid.get(nx, nz).unwrap_or_default();
                    if labels[i] == usize::MAX && (n - h).abs() <= self.max_climb {
                        labels[i] = count;
                        queue.push_back((nx, nz));
                    }
                }
            }
            count += 1;
        }
        (labels, count)
    }

    /// Dry cell count per component label.
    fn dry_counts(&self, grid: &HeightGrid, labels: &[usize], count: usize) -> Vec<usize> {
        let mut dry = vec![0; count];
        for (x, z, h) in grid.iter() {
            if !self.submerged(h) {
                dry[labels[x * grid.size_z() + z]] += 1;
            }
        }
        dry
    }

    /// Whether every dry cell can reach every other dry cell.
    pub fn is_connected(&self, grid: &HeightGrid) -> bool {
        let (labels, count) = self.components(grid);
        let dry = self.dry_counts(grid, &labels, count);
        dry.iter().filter(|&&n| n > 0).count() <= 1
    }

    /// Join stray dry regions to the main region.
    ///
    /// The main region is the component with the most dry cells. Each round
    /// moves the single cell across the cheapest boundary edge of the main
    /// region to exactly `max_climb` from its neighbour; the main region only
    /// grows, so the loop ends within one round per cell.
    ///
    /// Edges into components holding dry cells are taken first. A component
    /// that is entirely submerged is only moved when it separates the main
    /// region from every remaining dry stray.
    pub fn ensure_connected(&self, grid: &mut HeightGrid) -> ValidationReport {
        let size_z = grid.size_z();
        let (labels, count) = self.components(grid);
        let dry = self.dry_counts(grid, &labels, count);
        let initial_components = dry.iter().filter(|&&n| n > 0).count();
        let mut report = ValidationReport {
            initial_components,
            ..ValidationReport::default()
        };
        if initial_components <= 1 {
            return report;
        }

        let main_label = (0..count).max_by_key(|&l| (dry[l], std::cmp::Reverse(l))).unwrap_or(0);
        let anchor = labels.iter().position(|&l| l == main_label).unwrap_or(0);
        let anchor = (anchor / size_z, anchor % size_z);

        for _ in 0..grid.size_x() * size_z {
            let (labels, count) = self.components(grid);
            let dry = self.dry_counts(grid, &labels, count);
            let main = labels[anchor.0 * size_z + anchor.1];
            if (0..count).all(|l| l == main || dry[l] == 0) {
                break;
            }

            // Cheapest edge from a stray cell into the main region, dry strays first.
            let mut best: Option<((bool, i32), (usize, usize), i32)> = None;
            for (x, z, h) in grid.iter() {
                let label = labels[x * size_z + z];
                if label == main {
                    continue;
                }
                for (nx, nz) in grid.neighbors(x, z) {
                    if labels[nx * size_z + nz] != main {
                        continue;
                    }
                    let n = grid.get(nx, nz).unwrap_or(h);
                    let excess = (h - n).abs() - self.max_climb;
                    let target = if h > n { n + self.max_climb } else { n - self.max_climb };
                    let cost = (dry[label] == 0, excess);
                    if best.map_or(true, |(c, _, _)| cost < c) {
                        best = Some((cost, (x, z), target));
                    }
                }
            }
            let Some(((_, excess), (x, z), target)) = best else {
                break;
            };
            grid.set(x, z, target);
            report.cells_adjusted += 1;
            report.total_adjustment += i64::from(excess);
            debug!(x, z, target, excess, "joined stray region");
        }
        debug!(
            water_height = self.water_height,
            components = report.initial_components,
            adjusted = report.cells_adjusted,
            "repaired connectivity"
        );
        report
    }
}
