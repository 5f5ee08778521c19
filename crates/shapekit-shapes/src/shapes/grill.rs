//! Ventilation grill drilling.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;
use shapekit_core::math::Point;

use crate::params::{build_postamble, build_preamble, ShapeParameters};

use super::{parameter_error, NcShape};

/// Boundary shape of the grill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrillShape {
    Rectangle,
    Circle,
    Ellipse,
}

impl Default for GrillShape {
    fn default() -> Self {
        GrillShape::Rectangle
    }
}

/// Drills a grid of holes filtered by a boundary shape.
///
/// The grid is pitched at tool diameter plus hole distance and centered
/// on the origin; points outside the rectangle/circle/ellipse boundary
/// are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grill {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Width, or diameter for a circle
    pub w: f64,
    /// Height; ignored for a circle
    pub h: f64,
    /// Boundary shape
    pub shape: GrillShape,
    /// Distance between holes
    pub dist: f64,
    /// Peck instead of plunging linearly
    pub peck: bool,
}

impl Grill {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            w: 80.0,
            h: 40.0,
            shape: GrillShape::Rectangle,
            dist: 2.0,
            peck: false,
        }
    }

    /// The drill points inside the boundary.
    pub fn points(&self) -> Vec<Point> {
        let dxy = self.params.td + self.dist;
        let nx = self.w / 2.0 / dxy;
        let ny = if self.shape == GrillShape::Circle {
            nx
        } else {
            self.h / 2.0 / dxy
        };

        let mut plist = Vec::new();
        let x_lo = (-nx).trunc() as i64;
        let x_hi = (nx + 1.0).trunc() as i64;
        let y_lo = (-ny).trunc() as i64;
        let y_hi = (ny + 1.0).trunc() as i64;
        for x in x_lo..x_hi {
            for y in y_lo..y_hi {
                plist.push(Point::new(x as f64 * dxy, y as f64 * dxy));
            }
        }

        match self.shape {
            GrillShape::Rectangle => plist,
            GrillShape::Circle => {
                let r2 = (self.w / 2.0) * (self.w / 2.0);
                plist
                    .into_iter()
                    .filter(|p| p.x * p.x + p.y * p.y < r2)
                    .collect()
            }
            GrillShape::Ellipse => {
                let ax = (self.w / 2.0) * (self.w / 2.0);
                let ay = (self.h / 2.0) * (self.h / 2.0);
                plist
                    .into_iter()
                    .filter(|p| p.x * p.x / ax + p.y * p.y / ay < 1.0)
                    .collect()
            }
        }
    }
}

impl NcShape for Grill {
    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn set_object_name(&mut self, name: String) {
        self.object_name = name;
    }

    fn parameters(&self) -> Option<&ShapeParameters> {
        Some(&self.params)
    }

    fn parameters_mut(&mut self) -> Option<&mut ShapeParameters> {
        Some(&mut self.params)
    }

    fn parameters_ok(&self) -> bool {
        self.params.base_parameters_ok()
    }

    fn update(&self) -> Vec<GCodeOp> {
        if !self.parameters_ok() {
            return parameter_error();
        }
        let p = &self.params;

        let mut ol = build_preamble(p);
        ol.push(
            GCodeOp::rapid()
                .x(0.0)
                .y(0.0)
                .cmt("Rapid move to start point"),
        );
        for pt in self.points() {
            ol.push(GCodeOp::rapid().z(p.zsh));
            ol.push(GCodeOp::rapid().x(pt.x).y(pt.y));
            ol.push(GCodeOp::rapid().z(p.z0 + p.zsh0));
            if self.peck {
                ol.push(
                    GCodeOp::drill()
                        .x(pt.x)
                        .y(pt.y)
                        .z(p.z1)
                        .r(0.0)
                        .q(p.zi)
                        .f(p.frz),
                );
            } else {
                ol.push(GCodeOp::linear().z(p.z1).f(p.frz));
            }
        }
        ol.extend(build_postamble(p));
        ol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grill() -> Grill {
        let params = ShapeParameters {
            z0: 0.0,
            z1: -2.0,
            zi: 1.0,
            td: 3.0,
            ..Default::default()
        };
        let mut g = Grill::new(params);
        g.object_name = "Grill_1".to_string();
        g.w = 20.0;
        g.h = 10.0;
        g.dist = 2.0;
        g
    }

    #[test]
    fn test_rectangle_keeps_full_grid() {
        let g = grill();
        // Pitch 5; nx = 2, ny = 1: x in -2..=2, y in -1..=1.
        let pts = g.points();
        assert_eq!(pts.len(), 15);
        assert!(pts.contains(&Point::new(-10.0, -5.0)));
        assert!(pts.contains(&Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_circle_filters_corners() {
        let mut g = grill();
        g.shape = GrillShape::Circle;
        let pts = g.points();
        // ny follows nx; radius 10 strictly: corner points at
        // (+-10, +-10) and edge points at +-10 are dropped.
        assert!(pts.contains(&Point::new(0.0, 0.0)));
        assert!(pts.contains(&Point::new(5.0, 5.0)));
        assert!(!pts.contains(&Point::new(10.0, 0.0)));
        assert!(!pts.contains(&Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_ellipse_membership_is_strict() {
        let mut g = grill();
        g.shape = GrillShape::Ellipse;
        let pts = g.points();
        // (10, 0) and (0, 5) sit exactly on the ellipse: excluded.
        assert!(!pts.contains(&Point::new(10.0, 0.0)));
        assert!(!pts.contains(&Point::new(0.0, 5.0)));
        assert!(pts.contains(&Point::new(5.0, 0.0)));
    }

    #[test]
    fn test_hole_cycle_per_point() {
        let g = grill();
        let ops = g.update();
        let n = g.points().len();
        let plunges = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::Linear { z: Some(_), .. }))
            .count();
        assert_eq!(plunges, n);
    }

    #[test]
    fn test_peck_uses_drill_cycle() {
        let mut g = grill();
        g.peck = true;
        let ops = g.update();
        let n = g.points().len();
        let cycles = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::DrillCycle { .. }))
            .count();
        assert_eq!(cycles, n);
    }
}
