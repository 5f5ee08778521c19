//! Circle outline with optional bridge tabs.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::{ArcDirection, GCodeOp};
use shapekit_core::math::{arc_angle, rotate_point, Point};

use crate::params::{build_postamble, build_preamble, Contour, ShapeParameters};

use super::{parameter_error, NcShape};

/// Outlines a circle centered on the origin.
///
/// Each z pass is a single helical arc; bridges cut four symmetric
/// angular gaps. Without bridges a constant-depth finish arc completes
/// the circle left helical by the descent passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineCircle {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Radius
    pub r: f64,
    /// Machining direction: conventional or climb cutting
    pub climb: bool,
    /// Cutter compensation mode
    pub contour: Contour,
    /// Leave four bridges
    pub bridges: bool,
    /// Height of the bridges
    pub bridge_height: f64,
    /// Width of the bridges
    pub bridge_width: f64,
}

impl OutlineCircle {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            r: 10.0,
            climb: true,
            contour: Contour::Exact,
            bridges: true,
            bridge_height: 1.0,
            bridge_width: 1.0,
        }
    }
}

impl NcShape for OutlineCircle {
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
            && self.r > 0.0
            && self.bridge_height > 0.0
            && self.bridge_width > 0.0
    }

    fn update(&self) -> Vec<GCodeOp> {
        if !self.parameters_ok() {
            return parameter_error();
        }
        let p = &self.params;

        let r = match self.contour {
            Contour::Inside => self.r - p.td / 2.0,
            Contour::Exact => self.r,
            Contour::Outside => self.r + p.td / 2.0,
        };
        // Half-angle of one bridge gap, tool width included.
        let phi = arc_angle(p.td + self.bridge_width, r) / 2.0;
        let ze = if self.bridges {
            p.z1 + self.bridge_height
        } else {
            p.z1
        };

        // Direction and gap angles; the gap walk runs with the cut.
        let inside = self.contour == Contour::Inside;
        let (dir, deg): (ArcDirection, [f64; 9]) = if (inside && self.climb)
            || (!inside && !self.climb)
        {
            (
                ArcDirection::Ccw,
                [
                    0.0,
                    phi,
                    90.0 - phi,
                    90.0 + phi,
                    180.0 - phi,
                    180.0 + phi,
                    270.0 - phi,
                    270.0 + phi,
                    360.0 - phi,
                ],
            )
        } else {
            (
                ArcDirection::Cw,
                [
                    0.0,
                    360.0 - phi,
                    270.0 + phi,
                    270.0 - phi,
                    180.0 + phi,
                    180.0 - phi,
                    90.0 + phi,
                    90.0 - phi,
                    phi,
                ],
            )
        };

        let bl: Vec<Point> = deg
            .iter()
            .map(|&d| rotate_point(Point::new(r, 0.0), Point::new(0.0, 0.0), d))
            .collect();

        let mut ol = build_preamble(p);
        ol.push(
            GCodeOp::rapid()
                .x(r)
                .y(0.0)
                .cmt("Rapid move to start point"),
        );
        if self.bridges && self.bridge_height > p.z1.abs() {
            ol.push(
                GCodeOp::rapid()
                    .z(p.z1 + self.bridge_height)
                    .cmt("Rapid down to workpiece"),
            );
        } else {
            ol.push(
                GCodeOp::rapid()
                    .z(p.z0 + p.zsh0)
                    .cmt("Rapid down to workpiece"),
            );
        }

        let mut z = p.z0;
        while z > ze {
            z -= p.zi;
            if z < ze {
                z = ze;
            }
            ol.push(GCodeOp::arc(dir).z(z).i(-r).j(0.0).f(p.frtd));
        }

        if self.bridges {
            while z > p.z1 {
                z -= p.zi;
                if z < p.z1 {
                    z = p.z1;
                }
                for i in [0usize, 2, 4, 6] {
                    ol.push(
                        GCodeOp::arc(dir)
                            .x(bl[i + 1].x)
                            .y(bl[i + 1].y)
                            .i(-bl[i].x)
                            .j(-bl[i].y)
                            .f(p.frtd),
                    );
                    ol.push(GCodeOp::linear().z(z));
                    ol.push(
                        GCodeOp::arc(dir)
                            .x(bl[i + 2].x)
                            .y(bl[i + 2].y)
                            .i(-bl[i + 1].x)
                            .j(-bl[i + 1].y)
                            .f(p.frtd),
                    );
                    ol.push(GCodeOp::linear().z(ze));
                }
                ol.push(
                    GCodeOp::arc(dir)
                        .x(bl[0].x)
                        .y(bl[0].y)
                        .i(-bl[8].x)
                        .j(-bl[8].y)
                        .f(p.frtd),
                );
            }
        } else {
            // Constant-depth finish pass: the descent arcs are helical,
            // so the full circle only exists after this lap.
            ol.push(GCodeOp::arc(dir).i(-r).j(0.0).f(p.frtd));
        }

        ol.extend(build_postamble(p));
        ol
    }
}
