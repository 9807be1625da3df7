//! Planar geometry helpers used by the terrain generators.
//!
//! Points and directions are [`DVec2`] values in grid space, where `x` is the
//! map's x axis and `y` stands in for the map's z axis.

use glam::DVec2;
use thiserror::Error;

/// Errors raised by degenerate geometric input.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// A line was described by a zero-length direction vector.
    #[error("line through ({origin_x}, {origin_y}) has no direction")]
    DegenerateLine {
        /// Line origin x.
        origin_x: f64,
        /// Line origin y.
        origin_y: f64,
    },
}

/// Euclidean distance between two points.
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Parameter `u` of the point on `origin + u * dir` closest to `point`.
///
/// `u == 0` is the origin and `u == 1` is `origin + dir`.
pub fn point_line_intersect(point: DVec2, origin: DVec2, dir: DVec2) -> Result<f64, GeometryError> {
    let len_sq = dir.length_squared();
    if len_sq == 0.0 {
        return Err(GeometryError::DegenerateLine {
            origin_x: origin.x,
            origin_y: origin.y,
        });
    }
    Ok((point - origin).dot(dir) / len_sq)
}

/// Signed distance from `point` to the infinite line `origin + u * dir`.
///
/// The sign tells the side: negative when the point lies to the right of the
/// direction of travel.
pub fn point_line_dist(point: DVec2, origin: DVec2, dir: DVec2) -> Result<f64, GeometryError> {
    let u = point_line_intersect(point, origin, dir)?;
    Ok(signed_dist_at(point, origin, dir, u))
}

/// As [`point_line_dist`], reusing a previously computed intersect parameter.
pub fn signed_dist_at(point: DVec2, origin: DVec2, dir: DVec2, u: f64) -> f64 {
    let foot = origin + dir * u;
    let dist = point.distance(foot);
    let side = (point.x - origin.x) * dir.y - (point.y - origin.y) * dir.x;
    if side < 0.0 {
        -dist
    } else {
        dist
    }
}

/// Rotate `point` by `angle` radians around `center`.
pub fn rotate_around(point: DVec2, center: DVec2, angle: f64) -> DVec2 {
    center + DVec2::from_angle(angle).rotate(point - center)
}

/// Unit vector pointing along `angle` radians.
pub fn heading(angle: f64) -> DVec2 {
    DVec2::from_angle(angle)
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    #[test]
    fn intersect_projects_onto_line() {
        let u = point_line_intersect(DVec2::new(3.0, 5.0), DVec2::ZERO, DVec2::new(2.0, 0.0))
            .expect("valid line");
        assert!((u - 1.5).abs() < EPS);
    }

    #[test]
    fn signed_distance_reports_side() {
        let origin = DVec2::ZERO;
        let dir = DVec2::new(1.0, 0.0);
        let above = point_line_dist(DVec2::new(4.0, 2.0), origin, dir).expect("valid line");
        let below = point_line_dist(DVec2::new(4.0, -2.0), origin, dir).expect("valid line");
        assert!((above + 2.0).abs() < EPS, "got {above}");
        assert!((below - 2.0).abs() < EPS, "got {below}");
    }

    #[test]
    fn zero_direction_is_rejected() {
        let err = point_line_dist(DVec2::ONE, DVec2::new(1.0, 2.0), DVec2::ZERO).unwrap_err();
        assert_eq!(
            err,
            GeometryError::DegenerateLine {
                origin_x: 1.0,
                origin_y: 2.0
            }
        );
        assert!(err.to_string().contains("no direction"));
    }

    #[test]
    fn rotate_quarter_turn() {
        let p = rotate_around(DVec2::new(2.0, 1.0), DVec2::new(1.0, 1.0), FRAC_PI_2);
        assert!((p - DVec2::new(1.0, 2.0)).length() < EPS, "got {p:?}");
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.25), 3.0);
    }
}
