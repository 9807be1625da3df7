//! Cliff and canyon generators.
//!
//! Both split the map with jittered lines parallel to one axis. On each side
//! of a line the height follows a gentle slope, except near the line where a
//! near-vertical face takes over: the face term is used wherever its magnitude
//! is smaller than the slope term.

use crate::geography::{to_steps, SlopeProfile};
use crate::grid::HeightGrid;
use rand::Rng;
use std::f64::consts::PI;
use tactica_core::random::gaussian;

/// Mean plateau slope on either side of a cliff.
const CLIFF_SLOPE_MEAN: f64 = PI / 12.0;
const CLIFF_SLOPE_SD: f64 = PI / 36.0;
/// Mean steepness of a cliff face.
const FACE_ANGLE_MEAN: f64 = 4.0 * PI / 9.0;
const FACE_ANGLE_SD: f64 = PI / 36.0;
/// Steepest face allowed; keeps `tan` finite.
const FACE_ANGLE_MAX: f64 = 89.0 * PI / 180.0;
/// Per-row jitter of the face angle.
const FACE_JITTER_SD: f64 = PI / 72.0;
/// Height of the step at the cliff line, in steps.
const CLIFF_HEIGHT_MEAN: f64 = 6.0;
const CLIFF_HEIGHT_SD: f64 = 2.0;
const CLIFF_HEIGHT_MIN: f64 = 2.0;
/// Offset of the split line from the map centre, as a fraction of the axis.
const LINE_OFFSET_SD: f64 = 0.1;
/// Per-row wobble of a split line, in tiles.
const LINE_JITTER_SD: f64 = 0.5;
/// Canyon floor half-width as a fraction of the crossing axis.
const CANYON_HALF_WIDTH_MEAN: f64 = 0.15;
const CANYON_HALF_WIDTH_SD: f64 = 0.05;
const CANYON_HALF_WIDTH_MIN: f64 = 1.5;

/// Which grid axis the split lines run along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// Lines run along x; distance is measured in z.
    X,
    /// Lines run along z; distance is measured in x.
    Z,
}

impl SplitAxis {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::X
        } else {
            Self::Z
        }
    }

    /// `(rows, across)`: the extent along the line and across it.
    fn extents(self, size_x: usize, size_z: usize) -> (usize, usize) {
        match self {
            Self::X => (size_x, size_z),
            Self::Z => (size_z, size_x),
        }
    }

    /// `(row, across)` coordinates of a cell.
    fn split(self, x: usize, z: usize) -> (usize, f64) {
        match self {
            Self::X => (x, z as f64),
            Self::Z => (z, x as f64),
        }
    }
}

/// Shape of the terrain on one side of a split line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CliffSide {
    /// Plateau slope moving away from the line.
    pub profile: SlopeProfile,
    /// Steepness of the face at the line, in radians.
    pub face_angle: f64,
    /// Height of the step at the line, in steps.
    pub step: f64,
    /// Terrain goes up moving away from the line.
    pub rises: bool,
}

impl CliffSide {
    fn sample<R: Rng + ?Sized>(rng: &mut R, rises: bool, with_step: bool) -> Self {
        let mut profile = SlopeProfile::sample(rng, CLIFF_SLOPE_MEAN, CLIFF_SLOPE_SD);
        profile.angle = profile.angle.abs();
        let face_angle = gaussian(rng, FACE_ANGLE_MEAN, FACE_ANGLE_SD).min(FACE_ANGLE_MAX);
        let step = if with_step {
            gaussian(rng, CLIFF_HEIGHT_MEAN, CLIFF_HEIGHT_SD).max(CLIFF_HEIGHT_MIN)
        } else {
            0.0
        };
        Self {
            profile,
            face_angle,
            step,
            rises,
        }
    }

    /// Height at distance `s >= 0` from the line, with the row's face jitter.
    pub fn height_at(&self, s: f64, jitter: f64) -> f64 {
        let sign = if self.rises { 1.0 } else { -1.0 };
        let slope = sign * (self.step + self.profile.height_at(s));
        let face_angle = (self.face_angle + jitter).min(FACE_ANGLE_MAX);
        let face = sign * face_angle.tan() * s;
        if face.abs() < slope.abs() {
            face
        } else {
            slope
        }
    }
}

/// Line position per row: a common offset plus independent jitter.
fn sample_line<R: Rng + ?Sized>(rng: &mut R, rows: usize, center: f64, across: usize) -> Vec<f64> {
    let base = center + gaussian(rng, 0.0, LINE_OFFSET_SD * across as f64);
    (0..rows)
        .map(|_| base + gaussian(rng, 0.0, LINE_JITTER_SD))
        .collect()
}

fn sample_jitter<R: Rng + ?Sized>(rng: &mut R, rows: usize) -> Vec<f64> {
    (0..rows).map(|_| gaussian(rng, 0.0, FACE_JITTER_SD)).collect()
}

/// Parameters of the [`crate::GeographyArchetype::Cliff`] generator.
#[derive(Debug, Clone, PartialEq)]
pub struct CliffParams {
    /// Axis the split line runs along.
    pub axis: SplitAxis,
    /// Split line position for each row.
    pub line: Vec<f64>,
    /// Face angle jitter for each row.
    pub face_jitter: Vec<f64>,
    /// Side at or beyond the line.
    pub positive: CliffSide,
    /// Side before the line.
    pub negative: CliffSide,
}

impl CliffParams {
    /// Draw a cliff for a map of the given size.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, size_x: usize, size_z: usize) -> Self {
        let axis = SplitAxis::random(rng);
        let (rows, across) = axis.extents(size_x, size_z);
        let line = sample_line(rng, rows, (across / 2) as f64, across);
        let face_jitter = sample_jitter(rng, rows);
        let high_positive = rng.gen_bool(0.5);
        let high = CliffSide::sample(rng, true, true);
        let low = CliffSide::sample(rng, false, false);
        let (positive, negative) = if high_positive { (high, low) } else { (low, high) };
        Self {
            axis,
            line,
            face_jitter,
            positive,
            negative,
        }
    }

    /// Render the cliff into `grid`, returning the lowest height written.
    pub fn apply(&self, grid: &mut HeightGrid) -> i32 {
        grid.fill_with(|x, z| {
            let (row, across) = self.axis.split(x, z);
            let s = across - self.line[row];
            let jitter = self.face_jitter[row];
            let height = if s >= 0.0 {
                self.positive.height_at(s, jitter)
            } else {
                self.negative.height_at(-s, jitter)
            };
            to_steps(height)
        });
        grid.min_height()
    }
}

/// Parameters of the [`crate::GeographyArchetype::Canyon`] generator.
#[derive(Debug, Clone, PartialEq)]
pub struct CanyonParams {
    /// Axis the split lines run along.
    pub axis: SplitAxis,
    /// Lower bounding line position for each row.
    pub lower_line: Vec<f64>,
    /// Upper bounding line position for each row.
    pub upper_line: Vec<f64>,
    /// Face angle jitter for each row.
    pub face_jitter: Vec<f64>,
    /// Wall below the lower line.
    pub lower: CliffSide,
    /// Wall beyond the upper line.
    pub upper: CliffSide,
}

impl CanyonParams {
    /// Draw a canyon for a map of the given size.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, size_x: usize, size_z: usize) -> Self {
        let axis = SplitAxis::random(rng);
        let (rows, across) = axis.extents(size_x, size_z);
        let center = sample_line(rng, rows, (across / 2) as f64, across);
        let half_width = gaussian(
            rng,
            CANYON_HALF_WIDTH_MEAN * across as f64,
            CANYON_HALF_WIDTH_SD * across as f64,
        )
        .max(CANYON_HALF_WIDTH_MIN);
        let lower_line = center.iter().map(|c| c - half_width).collect();
        let upper_line = center.iter().map(|c| c + half_width).collect();
        let face_jitter = sample_jitter(rng, rows);
        let lower = CliffSide::sample(rng, true, true);
        let upper = CliffSide::sample(rng, true, true);
        Self {
            axis,
            lower_line,
            upper_line,
            face_jitter,
            lower,
            upper,
        }
    }

    /// Render the canyon into `grid`, returning the lowest height written.
    pub fn apply(&self, grid: &mut HeightGrid) -> i32 {
        grid.fill_with(|x, z| {
            let (row, across) = self.axis.split(x, z);
            let jitter = self.face_jitter[row];
            let height = if across < self.lower_line[row] {
                self.lower.height_at(self.lower_line[row] - across, jitter)
            } else if across > self.upper_line[row] {
                self.upper.height_at(across - self.upper_line[row], jitter)
            } else {
                0.0
            };
            to_steps(height)
        });
        grid.min_height()
    }
}
