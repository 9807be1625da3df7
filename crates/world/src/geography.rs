//! Archetype-specific raw height generation.
//!
//! Every archetype is split into a parameter struct sampled from the RNG and a
//! pure `apply` that renders those parameters into a [`HeightGrid`]. The split
//! lets tests drive a generator with fixed parameters.

use crate::cliff::{CanyonParams, CliffParams};
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::grid::HeightGrid;
use crate::islands::IslandParams;
use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, PI, TAU};
use std::fmt;
use std::str::FromStr;
use tactica_core::geometry::{self, heading, lerp};
use tactica_core::random::gaussian;
use tactica_core::TILE_RATIO;
use thiserror::Error;
use tracing::debug;

/// Mean slope angle in radians.
pub const SLOPE_MEAN: f64 = FRAC_PI_4;
/// Standard deviation of the slope angle.
pub const SLOPE_SD: f64 = PI / 24.0;
/// Standard deviation of the curvature exponent around 1.
pub const SLOPE_CURVE_EXP_SD: f64 = 0.005;
/// Standard deviation of the slope roll angle.
pub const SLOPE_ROLL_SD: f64 = PI / 18.0;
/// Scale of the random slope-origin offset, per tile of map axis.
pub const ORIGIN_BUFFER: f64 = 250.0;

/// Mean valley half-width as a fraction of half the average axis.
pub const VALLEY_SIZE_MEAN: f64 = 0.3;
/// Standard deviation of the valley half-width fraction.
pub const VALLEY_SIZE_SD: f64 = 0.25;
/// Largest heading change between consecutive valley waypoints.
pub const VALLEY_CURVE_MAX: f64 = PI / 6.0;
/// Fewest waypoints on a valley or ridge path.
pub const VALLEY_POINTS_MIN: usize = 2;
/// Most waypoints on a valley or ridge path.
pub const VALLEY_POINTS_MAX: usize = 6;
/// Path length relative to the longer map axis.
const VALLEY_SPAN: f64 = 1.5;

/// The closed set of terrain shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeographyArchetype {
    /// Flat ground at height 0.
    Plain,
    /// A single curved incline with optional roll.
    Slope,
    /// Raised terrain on both sides of a winding low path.
    Valley,
    /// Lowered terrain on both sides of a winding high path.
    Ridge,
    /// Peaks rising out of flat ground.
    Islands,
    /// A near-vertical step between a high and a low side.
    Cliff,
    /// A low band walled in by two cliffs.
    Canyon,
}

impl GeographyArchetype {
    /// All archetypes in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Plain,
        Self::Slope,
        Self::Valley,
        Self::Ridge,
        Self::Islands,
        Self::Cliff,
        Self::Canyon,
    ];

    /// Pick an archetype uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Canonical string key used in configs/logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Slope => "slope",
            Self::Valley => "valley",
            Self::Ridge => "ridge",
            Self::Islands => "islands",
            Self::Cliff => "cliff",
            Self::Canyon => "canyon",
        }
    }
}

impl fmt::Display for GeographyArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown archetype name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown geography archetype `{0}`")]
pub struct ParseArchetypeError(String);

impl FromStr for GeographyArchetype {
    type Err = ParseArchetypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == key)
            .ok_or_else(|| ParseArchetypeError(s.to_string()))
    }
}

/// Angle and curvature of one slope profile.
///
/// At distance `d` the effective angle is `angle * curvature^d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeProfile {
    /// Base angle in radians.
    pub angle: f64,
    /// Exponential curvature, 1 for a straight incline.
    pub curvature: f64,
}

impl SlopeProfile {
    /// Draw a profile around the given mean angle.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> Self {
        Self {
            angle: gaussian(rng, mean, sd),
            curvature: 1.0 + gaussian(rng, 0.0, SLOPE_CURVE_EXP_SD).abs(),
        }
    }

    /// Height in steps at distance `d` along this profile.
    pub fn height_at(self, d: f64) -> f64 {
        let curve_angle = self.angle * self.curvature.powf(d);
        curve_angle.tan() * d / TILE_RATIO
    }

    /// Component-wise interpolation between two profiles.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            angle: lerp(self.angle, other.angle, t),
            curvature: lerp(self.curvature, other.curvature, t),
        }
    }
}

/// Convert a real height to whole steps.
pub(crate) fn to_steps(height: f64) -> i32 {
    height.round() as i32
}

/// Parameters of the [`GeographyArchetype::Slope`] generator.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeParams {
    /// Base incline.
    pub profile: SlopeProfile,
    /// Point the slope radiates from.
    pub origin: DVec2,
    /// Distance subtracted from every cell's distance to `origin`.
    pub buffer_length: f64,
    /// Sideways tilt in radians.
    pub roll_angle: f64,
    /// Direction of the line through `origin` the roll is measured from.
    pub roll_dir: DVec2,
    /// Height grows with distance from the origin when set.
    pub decreasing: bool,
}

impl SlopeParams {
    /// Draw slope parameters for a map of the given size.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, size_x: usize, size_z: usize) -> Self {
        let profile = SlopeProfile {
            angle: gaussian(rng, SLOPE_MEAN, SLOPE_SD),
            curvature: gaussian(rng, 1.0, SLOPE_CURVE_EXP_SD),
        };
        let direction = rng.gen::<f64>() * TAU;
        let decreasing = rng.gen_bool(0.5);

        let offset = DVec2::new(
            rng.gen::<f64>() * ORIGIN_BUFFER * size_x as f64,
            rng.gen::<f64>() * ORIGIN_BUFFER * size_z as f64,
        );
        let center = map_center(size_x, size_z);
        let origin = geometry::rotate_around(center + offset, center, direction);

        let roll_target = DVec2::new(
            rng.gen::<f64>() * size_x as f64,
            rng.gen::<f64>() * size_z as f64,
        );
        let roll_angle = gaussian(rng, 0.0, SLOPE_ROLL_SD);

        Self {
            profile,
            origin,
            buffer_length: offset.length(),
            roll_angle,
            roll_dir: roll_target - origin,
            decreasing,
        }
    }

    /// Render the slope into `grid`, returning the lowest height written.
    pub fn apply(&self, grid: &mut HeightGrid) -> Result<i32> {
        let sign = if self.decreasing { 1.0 } else { -1.0 };
        let roll = self.roll_angle.tan() / TILE_RATIO;
        grid.try_fill_with(|x, z| -> Result<i32> {
            let p = DVec2::new(x as f64, z as f64);
            let d = geometry::distance(self.origin, p) - self.buffer_length;
            let height = sign * self.profile.height_at(d);
            let from_line = geometry::point_line_dist(p, self.origin, self.roll_dir)?;
            Ok(to_steps(height + roll * from_line))
        })?;
        Ok(grid.min_height())
    }
}

/// One control point of a valley or ridge path.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// Position in grid space.
    pub position: DVec2,
    /// Flat half-width around the path at this point.
    pub half_width: f64,
    /// Profile used on the segment arriving at this point.
    pub entry: SlopeProfile,
    /// Profile used on the segment leaving this point.
    pub exit: SlopeProfile,
}

/// Parameters of the valley and ridge generators.
#[derive(Debug, Clone, PartialEq)]
pub struct ValleyParams {
    /// Path control points, at least two.
    pub waypoints: Vec<Waypoint>,
    /// Lower the sides instead of raising them.
    pub ridge: bool,
}

impl ValleyParams {
    /// Draw a winding path through the middle of the map.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, size_x: usize, size_z: usize, ridge: bool) -> Self {
        let count = rng.gen_range(VALLEY_POINTS_MIN..=VALLEY_POINTS_MAX);
        let step = size_x.max(size_z) as f64 * VALLEY_SPAN / (count - 1) as f64;
        let half_axis = (size_x + size_z) as f64 / 4.0;

        let mut direction = rng.gen::<f64>() * TAU;
        let mut position = DVec2::ZERO;
        let mut waypoints = Vec::with_capacity(count);
        for i in 0..count {
            if i > 0 {
                direction += (rng.gen::<f64>() - 0.5) * VALLEY_CURVE_MAX * 2.0;
                position += heading(direction) * step;
            }
            let half_width = gaussian(rng, VALLEY_SIZE_MEAN, VALLEY_SIZE_SD).max(0.0) * half_axis;
            let entry = SlopeProfile::sample(rng, SLOPE_MEAN, SLOPE_SD);
            let exit = SlopeProfile::sample(rng, SLOPE_MEAN, SLOPE_SD);
            waypoints.push(Waypoint {
                position,
                half_width,
                entry,
                exit,
            });
        }

        // Centre the walk on the map.
        let mean = waypoints.iter().map(|w| w.position).sum::<DVec2>() / count as f64;
        let shift = map_center(size_x, size_z) - mean;
        for w in &mut waypoints {
            w.position += shift;
        }

        Self { waypoints, ridge }
    }

    /// Index `i` of the segment `(i, i + 1)` whose endpoints are jointly closest to `p`.
    ///
    /// Uses the sum of distances to both endpoints rather than a true
    /// point-to-segment projection.
    pub fn nearest_segment(&self, p: DVec2) -> usize {
        let mut best = 0;
        let mut best_sum = f64::INFINITY;
        for (i, pair) in self.waypoints.windows(2).enumerate() {
            let sum = p.distance(pair[0].position) + p.distance(pair[1].position);
            if sum < best_sum {
                best_sum = sum;
                best = i;
            }
        }
        best
    }

    /// Render the path into `grid`, returning the lowest height written.
    pub fn apply(&self, grid: &mut HeightGrid) -> Result<i32> {
        let sign = if self.ridge { -1.0 } else { 1.0 };
        grid.try_fill_with(|x, z| -> Result<i32> {
            let p = DVec2::new(x as f64, z as f64);
            let i = self.nearest_segment(p);
            let (a, b) = (&self.waypoints[i], &self.waypoints[i + 1]);
            let dir = b.position - a.position;

            let u = geometry::point_line_intersect(p, a.position, dir)?;
            let dist = geometry::signed_dist_at(p, a.position, dir, u);
            let t = u.clamp(0.0, 1.0);

            let width = lerp(a.half_width, b.half_width, t);
            let excess = dist.abs() - width;
            if excess <= 0.0 {
                return Ok(0);
            }
            let profile = a.exit.lerp(b.entry, t);
            Ok(to_steps(sign * profile.height_at(excess)))
        })?;
        Ok(grid.min_height())
    }
}

/// Sampled parameters for any archetype.
#[derive(Debug, Clone, PartialEq)]
pub enum GeographyParams {
    /// Flat ground.
    Plain,
    /// See [`SlopeParams`].
    Slope(SlopeParams),
    /// See [`ValleyParams`].
    Valley(ValleyParams),
    /// See [`ValleyParams`]; sides are lowered.
    Ridge(ValleyParams),
    /// See [`IslandParams`].
    Islands(IslandParams),
    /// See [`CliffParams`].
    Cliff(CliffParams),
    /// See [`CanyonParams`].
    Canyon(CanyonParams),
}

impl GeographyParams {
    /// Draw parameters for `archetype` on a map of the given size.
    pub fn sample<R: Rng + ?Sized>(
        archetype: GeographyArchetype,
        size_x: usize,
        size_z: usize,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<Self> {
        Ok(match archetype {
            GeographyArchetype::Plain => Self::Plain,
            GeographyArchetype::Slope => Self::Slope(SlopeParams::sample(rng, size_x, size_z)),
            GeographyArchetype::Valley => {
                Self::Valley(ValleyParams::sample(rng, size_x, size_z, false))
            }
            GeographyArchetype::Ridge => {
                Self::Ridge(ValleyParams::sample(rng, size_x, size_z, true))
            }
            GeographyArchetype::Islands => {
                Self::Islands(IslandParams::sample(rng, size_x, size_z, config)?)
            }
            GeographyArchetype::Cliff => Self::Cliff(CliffParams::sample(rng, size_x, size_z)),
            GeographyArchetype::Canyon => Self::Canyon(CanyonParams::sample(rng, size_x, size_z)),
        })
    }

    /// The archetype these parameters belong to.
    pub fn archetype(&self) -> GeographyArchetype {
        match self {
            Self::Plain => GeographyArchetype::Plain,
            Self::Slope(_) => GeographyArchetype::Slope,
            Self::Valley(_) => GeographyArchetype::Valley,
            Self::Ridge(_) => GeographyArchetype::Ridge,
            Self::Islands(_) => GeographyArchetype::Islands,
            Self::Cliff(_) => GeographyArchetype::Cliff,
            Self::Canyon(_) => GeographyArchetype::Canyon,
        }
    }

    /// Render into `grid`, returning the lowest point.
    ///
    /// Islands draw their per-cell descent from `rng` while rendering; every
    /// other archetype is fully determined by its parameters.
    pub fn apply<R: Rng + ?Sized>(&self, grid: &mut HeightGrid, rng: &mut R) -> Result<i32> {
        match self {
            Self::Plain => {
                grid.fill_with(|_, _| 0);
                Ok(0)
            }
            Self::Slope(p) => p.apply(grid),
            Self::Valley(p) | Self::Ridge(p) => p.apply(grid),
            Self::Islands(p) => Ok(p.apply(grid, rng)),
            Self::Cliff(p) => Ok(p.apply(grid)),
            Self::Canyon(p) => Ok(p.apply(grid)),
        }
    }
}

/// Produce the raw height grid for `archetype` and its lowest point.
pub fn generate<R: Rng + ?Sized>(
    archetype: GeographyArchetype,
    size_x: usize,
    size_z: usize,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<(HeightGrid, i32)> {
    let mut grid = HeightGrid::new(size_x, size_z)?;
    let params = GeographyParams::sample(archetype, size_x, size_z, config, rng)?;
    let lowest_point = params.apply(&mut grid, rng)?;
    debug!(
        archetype = %archetype,
        size_x,
        size_z,
        lowest_point,
        highest_point = grid.max_height(),
        "generated geography"
    );
    Ok((grid, lowest_point))
}

/// Centre of the map using integer halving of each axis.
pub(crate) fn map_center(size_x: usize, size_z: usize) -> DVec2 {
    DVec2::new((size_x / 2) as f64, (size_z / 2) as f64)
}
