//! Dense height grid for one tactical map.
//!
//! Each cell holds the elevation of one map column in integer steps, where a
//! step is [`tactica_core::TILE_HEIGHT`] world units. The grid's dimensions are
//! fixed at construction; generation stages mutate cells in place.

use crate::error::{Result, TerrainError};
use crate::config::MAX_MAP_AXIS;
use serde::{Deserialize, Serialize};

/// 4-neighbour offsets in a fixed expansion order.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Height field of a tactical map.
///
/// Indexed as `(x, z)`; storage is x-major so that a column of constant `x`
/// is contiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightGrid {
    size_x: usize,
    size_z: usize,
    cells: Vec<i32>,
}

impl HeightGrid {
    /// Create a flat grid with every cell at height 0.
    ///
    /// Each axis must lie in `1..=MAX_MAP_AXIS`.
    pub fn new(size_x: usize, size_z: usize) -> Result<Self> {
        let axis = 1..=MAX_MAP_AXIS;
        if !axis.contains(&size_x) || !axis.contains(&size_z) {
            return Err(TerrainError::InvalidDimensions { size_x, size_z });
        }
        Ok(Self {
            size_x,
            size_z,
            cells: vec![0; size_x * size_z],
        })
    }

    /// Extent along x.
    pub fn size_x(&self) -> usize {
        self.size_x
    }

    /// Extent along z.
    pub fn size_z(&self) -> usize {
        self.size_z
    }

    /// `(size_x + size_z) / 2` as a real number.
    pub fn average_axis(&self) -> f64 {
        (self.size_x + self.size_z) as f64 / 2.0
    }

    /// Whether signed coordinates fall inside the grid.
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.size_x && (z as usize) < self.size_z
    }

    fn index(&self, x: usize, z: usize) -> Option<usize> {
        (x < self.size_x && z < self.size_z).then(|| x * self.size_z + z)
    }

    /// Height at `(x, z)`, or `None` outside the grid.
    pub fn get(&self, x: usize, z: usize) -> Option<i32> {
        self.index(x, z).map(|i| self.cells[i])
    }

    /// Height at signed coordinates, or `None` outside the grid.
    pub fn get_signed(&self, x: i32, z: i32) -> Option<i32> {
        if !self.contains(x, z) {
            return None;
        }
        self.get(x as usize, z as usize)
    }

    /// Mutable access to a cell, or `None` outside the grid.
    pub fn get_mut(&mut self, x: usize, z: usize) -> Option<&mut i32> {
        self.index(x, z).map(|i| &mut self.cells[i])
    }

    /// Overwrite a cell. Returns `false` if the coordinates are outside the grid.
    pub fn set(&mut self, x: usize, z: usize, height: i32) -> bool {
        match self.get_mut(x, z) {
            Some(cell) => {
                *cell = height;
                true
            }
            None => false,
        }
    }

    /// Raise a cell to `level` if it currently sits below it.
    ///
    /// Never lowers terrain. Returns `true` if the cell changed.
    pub fn raise_to(&mut self, x: usize, z: usize, level: i32) -> bool {
        match self.get_mut(x, z) {
            Some(cell) if *cell < level => {
                *cell = level;
                true
            }
            _ => false,
        }
    }

    /// Fill every cell from a per-cell function, visiting x-major.
    pub fn fill_with(&mut self, mut height_at: impl FnMut(usize, usize) -> i32) {
        for x in 0..self.size_x {
            for z in 0..self.size_z {
                let i = x * self.size_z + z;
                self.cells[i] = height_at(x, z);
            }
        }
    }

    /// Fill every cell from a fallible per-cell function, visiting x-major.
    pub fn try_fill_with<E>(
        &mut self,
        mut height_at: impl FnMut(usize, usize) -> std::result::Result<i32, E>,
    ) -> std::result::Result<(), E> {
        for x in 0..self.size_x {
            for z in 0..self.size_z {
                let i = x * self.size_z + z;
                self.cells[i] = height_at(x, z)?;
            }
        }
        Ok(())
    }

    /// In-grid 4-neighbours of `(x, z)` in [`NEIGHBORS_4`] order.
    pub fn neighbors(&self, x: usize, z: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        NEIGHBORS_4.iter().filter_map(move |&(dx, dz)| {
            let nx = x as i32 + dx;
            let nz = z as i32 + dz;
            self.contains(nx, nz).then_some((nx as usize, nz as usize))
        })
    }

    /// Iterate over all cells as `(x, z, height)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        let size_z = self.size_z;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &h)| (i / size_z, i % size_z, h))
    }

    /// Minimum height present in the grid.
    pub fn min_height(&self) -> i32 {
        self.cells.iter().copied().min().unwrap_or(0)
    }

    /// Maximum height present in the grid.
    pub fn max_height(&self) -> i32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Mean height across all cells.
    pub fn mean_height(&self) -> f64 {
        let sum: i64 = self.cells.iter().map(|&h| h as i64).sum();
        sum as f64 / self.cells.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_grid_is_rejected() {
        assert_eq!(
            HeightGrid::new(0, 4),
            Err(TerrainError::InvalidDimensions {
                size_x: 0,
                size_z: 4
            })
        );
        assert!(HeightGrid::new(MAX_MAP_AXIS + 1, 4).is_err());
        assert!(HeightGrid::new(MAX_MAP_AXIS, 1).is_ok());
    }

    #[test]
    fn accessors_are_bounds_checked() {
        let mut grid = HeightGrid::new(3, 2).expect("grid");
        assert!(grid.set(2, 1, 5));
        assert!(!grid.set(3, 0, 5));
        assert_eq!(grid.get(2, 1), Some(5));
        assert_eq!(grid.get(2, 2), None);
        assert_eq!(grid.get_signed(-1, 0), None);
        assert_eq!(grid.get_signed(2, 1), Some(5));
    }

    #[test]
    fn raise_to_never_lowers() {
        let mut grid = HeightGrid::new(2, 2).expect("grid");
        grid.set(0, 0, 4);
        assert!(!grid.raise_to(0, 0, 2));
        assert_eq!(grid.get(0, 0), Some(4));
        assert!(grid.raise_to(1, 1, 2));
        assert_eq!(grid.get(1, 1), Some(2));
    }

    #[test]
    fn corner_has_two_neighbors() {
        let grid = HeightGrid::new(4, 4).expect("grid");
        assert_eq!(grid.neighbors(0, 0).count(), 2);
        assert_eq!(grid.neighbors(1, 0).count(), 3);
        assert_eq!(grid.neighbors(1, 1).count(), 4);
    }

    #[test]
    fn min_max_mean_match_scan() {
        let mut grid = HeightGrid::new(3, 3).expect("grid");
        grid.fill_with(|x, z| x as i32 - z as i32);

        let mut found_min = i32::MAX;
        let mut found_max = i32::MIN;
        for (_, _, h) in grid.iter() {
            found_min = found_min.min(h);
            found_max = found_max.max(h);
        }
        assert_eq!(grid.min_height(), found_min);
        assert_eq!(grid.max_height(), found_max);
        assert!(grid.mean_height().abs() < 1e-9);
    }

    #[test]
    fn iter_matches_get() {
        let mut grid = HeightGrid::new(3, 5).expect("grid");
        grid.try_fill_with(|x, z| Ok::<_, ()>((x * 10 + z) as i32))
            .expect("fill");
        for (x, z, h) in grid.iter() {
            assert_eq!(grid.get(x, z), Some(h));
        }
    }
}
