//! Rectangular drill matrix.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;
use shapekit_core::math::Point;

use crate::params::{build_postamble, build_preamble, ShapeParameters};

use super::{parameter_error, NcShape};

/// Drills a row-major nx by ny grid of holes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillMatrix {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Hole pitch x
    pub dx: f64,
    /// Hole pitch y
    pub dy: f64,
    /// Number of holes per row
    pub nx: u32,
    /// Number of rows
    pub ny: u32,
    /// Peck instead of plunging linearly
    pub peck: bool,
    /// Center the grid on the origin
    pub center: bool,
}

impl DrillMatrix {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            dx: 2.54 * 4.0,
            dy: 2.54 * 4.0,
            nx: 5,
            ny: 2,
            peck: false,
            center: true,
        }
    }

    /// The drill points in row-major order.
    pub fn points(&self) -> Vec<Point> {
        let (ox, oy) = if self.center {
            (
                ((self.nx - 1) as f64 * self.dx) / 2.0,
                ((self.ny - 1) as f64 * self.dy) / 2.0,
            )
        } else {
            (0.0, 0.0)
        };
        let mut plist = Vec::new();
        for y in 0..self.ny {
            for x in 0..self.nx {
                plist.push(Point::new(
                    x as f64 * self.dx - ox,
                    y as f64 * self.dy - oy,
                ));
            }
        }
        plist
    }
}

impl NcShape for DrillMatrix {
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
        self.params.base_parameters_ok() && self.nx > 0 && self.ny > 0
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
