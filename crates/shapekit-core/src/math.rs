//! Geometric helper functions shared by the toolpath generators.

use serde::{Deserialize, Serialize};

/// Represents a 2D point with X and Y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point with the given X and Y coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Rotates a point around another point by the given angle in degrees.
///
/// Degenerate (non-finite) input degrades to the origin instead of
/// propagating NaN into the emitted path.
pub fn rotate_point(p: Point, center: Point, angle_deg: f64) -> Point {
    let sin = (angle_deg * std::f64::consts::PI / 180.0).sin();
    let cos = (angle_deg * std::f64::consts::PI / 180.0).cos();
    let x = center.x + (p.x - center.x) * cos - (p.y - center.y) * sin;
    let y = center.y + (p.x - center.x) * sin + (p.y - center.y) * cos;
    if !x.is_finite() || !y.is_finite() {
        return Point::new(0.0, 0.0);
    }
    Point::new(x, y)
}

/// Calculates the angle in degrees of an arc with the given length and radius.
///
/// A zero radius yields 0 rather than dividing by zero.
pub fn arc_angle(length: f64, radius: f64) -> f64 {
    if radius == 0.0 {
        return 0.0;
    }
    (length * 180.0) / (std::f64::consts::PI * radius)
}

/// Calculates the arc length for the given angle in degrees and radius.
pub fn arc_length(angle_deg: f64, radius: f64) -> f64 {
    (std::f64::consts::PI * radius * angle_deg) / 180.0
}

/// Calculates the point on the line from `p0` through `p1` at distance `d`
/// from `p0`.
///
/// Undefined for `p0 == p1` (there is no direction to walk along).
pub fn point_on_line(p0: Point, p1: Point, d: f64) -> Point {
    let vx = p1.x - p0.x;
    let vy = p1.y - p0.y;
    let len = (vx * vx + vy * vy).sqrt();
    Point::new(p0.x + vx / len * d, p0.y + vy / len * d)
}

/// Samples the parametric ellipse with half-axes `a` and `b` at the given
/// angle in degrees. Unrotated and centered on the origin.
pub fn ellipse_point(a: f64, b: f64, angle_deg: f64) -> Point {
    let t = angle_deg * 2.0 * std::f64::consts::PI / 360.0;
    Point::new(a * t.cos(), b * t.sin())
}
