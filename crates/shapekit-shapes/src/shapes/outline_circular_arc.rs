//! Circular-arc band outline.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::{ArcDirection, GCodeOp};
use shapekit_core::math::{arc_angle, rotate_point, Point};

use crate::params::{build_postamble, build_preamble, Contour, ShapeParameters};

use super::{parameter_error, NcShape};

/// Outlines an angular band between two radii and two angles.
///
/// Each z pass walks the outer arc counter-clockwise and the inner arc
/// back clockwise, the endpoints pulled in by the tool-radius lead angle
/// depending on the contour mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineCircularArc {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Inner radius
    pub ri: f64,
    /// Outer radius
    pub ro: f64,
    /// Start angle, degrees
    pub a0: f64,
    /// End angle, degrees
    pub a1: f64,
    /// Cutter compensation mode
    pub contour: Contour,
}

impl OutlineCircularArc {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            ri: 25.0,
            ro: 50.0,
            a0: 0.0,
            a1: 90.0,
            contour: Contour::Exact,
        }
    }

    /// One boundary lap: trimmed outer arc out, trimmed inner arc back.
    fn band_lap(&self, ri: f64, ro: f64) -> Vec<GCodeOp> {
        let p = &self.params;
        let mut ol = Vec::new();

        let a = arc_angle(p.td / 2.0, ro);
        let origin = Point::new(0.0, 0.0);
        let (p0, p1) = match self.contour {
            Contour::Inside => (
                rotate_point(Point::new(ro, 0.0), origin, self.a0 + a),
                rotate_point(Point::new(ro, 0.0), origin, self.a1 - a),
            ),
            Contour::Exact => (
                rotate_point(Point::new(ro, 0.0), origin, self.a0),
                rotate_point(Point::new(ro, 0.0), origin, self.a1),
            ),
            Contour::Outside => (
                rotate_point(Point::new(ro, 0.0), origin, self.a0 - a),
                rotate_point(Point::new(ro, 0.0), origin, self.a1 + a),
            ),
        };
        ol.push(GCodeOp::linear().x(p0.x).y(p0.y).f(p.frtd));
        ol.push(
            GCodeOp::arc(ArcDirection::Ccw)
                .x(p1.x)
                .y(p1.y)
                .i(-p0.x)
                .j(-p0.y),
        );

        if ri != 0.0 {
            let a = arc_angle(p.td / 2.0, ri);
            let (p0, p1) = match self.contour {
                Contour::Inside => (
                    rotate_point(Point::new(ri, 0.0), origin, self.a1 - a),
                    rotate_point(Point::new(ri, 0.0), origin, self.a0 + a),
                ),
                Contour::Exact => (
                    rotate_point(Point::new(ri, 0.0), origin, self.a1),
                    rotate_point(Point::new(ri, 0.0), origin, self.a0),
                ),
                Contour::Outside => (
                    rotate_point(Point::new(ri, 0.0), origin, self.a1 + a),
                    rotate_point(Point::new(ri, 0.0), origin, self.a0 - a),
                ),
            };
            ol.push(GCodeOp::linear().x(p0.x).y(p0.y).f(p.frtd));
            ol.push(
                GCodeOp::arc(ArcDirection::Cw)
                    .x(p1.x)
                    .y(p1.y)
                    .i(-p0.x)
                    .j(-p0.y),
            );
        }
        ol
    }
}

impl NcShape for OutlineCircularArc {
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

        let (mut ri, ro) = match self.contour {
            Contour::Inside => (self.ri + p.td / 2.0, self.ro - p.td / 2.0),
            Contour::Exact => (self.ri, self.ro),
            Contour::Outside => (self.ri - p.td / 2.0, self.ro + p.td / 2.0),
        };
        // A zero inner radius means a pie slice, not a band.
        if self.ri == 0.0 {
            ri = 0.0;
        }

        let a = arc_angle(p.td / 2.0, ro);
        let origin = Point::new(0.0, 0.0);
        let start = match self.contour {
            Contour::Inside => rotate_point(Point::new(ro, 0.0), origin, self.a0 + a),
            Contour::Exact => rotate_point(Point::new(ro, 0.0), origin, self.a0),
            Contour::Outside => rotate_point(Point::new(ro, 0.0), origin, self.a0 - a),
        };

        let mut ol = build_preamble(p);
        ol.push(
            GCodeOp::rapid()
                .x(start.x)
                .y(start.y)
                .cmt("Rapid move to start point"),
        );
        ol.push(
            GCodeOp::rapid()
                .z(p.z0 + p.zsh0)
                .cmt("Rapid down to workpiece"),
        );

        let mut z = p.z0;
        while z > p.z1 {
            z -= p.zi;
            if z < p.z1 {
                z = p.z1;
            }
            ol.push(GCodeOp::linear().z(z).f(p.frtd));
            ol.extend(self.band_lap(ri, ro));
            ol.push(GCodeOp::linear().x(start.x).y(start.y));
        }

        // Lead out one increment up, still on the path.
        ol.push(GCodeOp::linear().x(start.x).y(start.y).z(z + p.zi));
        ol.extend(build_postamble(p));
        ol
    }
}
