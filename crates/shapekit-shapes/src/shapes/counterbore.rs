//! Counterbore: stacked circular pockets for a screw head and shaft.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::{ArcDirection, GCodeOp};

use crate::params::{build_postamble, build_preamble, ShapeParameters};
use crate::pocketing::pocket_circle;

use super::{parameter_error, NcShape};

/// Mills a counterbore at the origin: the head seat pocket down to the
/// sink depth, then the through hole to the end depth, both cleared with
/// the shared ring-spiral routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counterbore {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Through hole diameter
    pub d: f64,
    /// Head sinkhole diameter
    pub d1: f64,
    /// Sinkhole depth
    pub sink_depth: f64,
    /// Washer height added to the sink depth
    pub washer_height: f64,
}

impl Counterbore {
    pub fn new(mut params: ShapeParameters) -> Self {
        // A counterbore is a through feature; default deeper than the
        // generic table.
        params.z1 = -10.0;
        Self {
            object_name: String::new(),
            params,
            d: 1.0,
            d1: 1.0,
            sink_depth: 1.0,
            washer_height: 0.0,
        }
    }
}

impl NcShape for Counterbore {
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
            && self.d >= self.params.td
            && self.d1 >= self.params.td
            && self.params.z1.abs() >= self.sink_depth + self.washer_height
    }

    fn update(&self) -> Vec<GCodeOp> {
        if !self.parameters_ok() {
            return parameter_error();
        }
        let p = &self.params;

        let seat_z = -(self.sink_depth + self.washer_height);
        let ri = p.td * p.so / 100.0;
        let dr = ri;

        let mut ol = build_preamble(p);
        ol.push(
            GCodeOp::rapid()
                .x(0.0)
                .y(0.0)
                .cmt("Rapid move to start point"),
        );
        ol.push(
            GCodeOp::rapid()
                .z(p.z0 + p.zsh0)
                .cmt("Rapid down to workpiece"),
        );
        ol.push(GCodeOp::linear().z(p.z0));

        // Head seat.
        let ra = self.d1 / 2.0 - p.td / 2.0;
        ol.push(GCodeOp::modal(61.0));
        ol.extend(pocket_circle(
            ArcDirection::Ccw,
            p.z0,
            seat_z,
            p.zi,
            ri,
            ra,
            dr,
            p.frtd,
            p.frso,
        ));

        // Through hole.
        let ra = self.d / 2.0 - p.td / 2.0;
        ol.push(GCodeOp::modal(61.0));
        ol.extend(pocket_circle(
            ArcDirection::Ccw,
            seat_z,
            p.z1,
            p.zi,
            ri,
            ra,
            dr,
            p.frtd,
            p.frso,
        ));

        ol.push(GCodeOp::linear().x(0.0).y(0.0).f(p.frtd));
        ol.push(GCodeOp::modal(61.0));
        ol.extend(build_postamble(p));
        ol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cbore() -> Counterbore {
        let params = ShapeParameters {
            z0: 0.0,
            zi: 1.0,
            td: 3.0,
            so: 50.0,
            ..Default::default()
        };
        let mut c = Counterbore::new(params);
        c.object_name = "Counterbore_1".to_string();
        c.d = 5.0;
        c.d1 = 9.0;
        c.sink_depth = 4.0;
        c.washer_height = 1.0;
        c
    }

    #[test]
    fn test_two_stacked_pockets() {
        let c = cbore();
        let ops = c.update();
        // Head seat descends to -(sink + washer) = -5, through hole to z1.
        let depths: Vec<f64> = ops
            .iter()
            .filter_map(|o| match o {
                GCodeOp::Arc { z: Some(z), .. } => Some(*z),
                _ => None,
            })
            .collect();
        assert!(depths.contains(&-5.0));
        assert!(depths.contains(&-10.0));
    }

    #[test]
    fn test_head_seat_wider_than_shaft() {
        let c = cbore();
        let ops = c.update();
        let radii: Vec<f64> = ops
            .iter()
            .filter_map(|o| match o {
                GCodeOp::Arc { i: Some(i), .. } => Some(-i),
                _ => None,
            })
            .collect();
        // Head seat milling radius d1/2 - td/2 = 3; shaft d/2 - td/2 = 1.
        let max = radii.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(max, 3.0);
        assert!(radii.contains(&1.0));
    }

    #[test]
    fn test_tool_wider_than_hole_rejected() {
        let mut c = cbore();
        c.d = 2.0; // td = 3
        assert_eq!(c.update()[0].to_gcode(), "( PARAMETER ERROR )");
    }

    #[test]
    fn test_shallow_end_depth_rejected() {
        let mut c = cbore();
        c.params.z1 = -4.0; // sink + washer = 5
        assert_eq!(c.update()[0].to_gcode(), "( PARAMETER ERROR )");
    }

    #[test]
    fn test_returns_to_center() {
        let c = cbore();
        assert!(c.gcode().contains("G01 X0.0000 Y0.0000 F300.0000"));
    }
}
