//! Straight slot, cut back and forth.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;

use crate::params::{build_postamble, build_preamble, ShapeParameters};

use super::{parameter_error, NcShape};

/// Mills a slot from the origin to (dx, dy), alternating direction per
/// z pass. Optionally pecks before each plunge to clear chips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Slot end point x
    pub dx: f64,
    /// Slot end point y
    pub dy: f64,
    /// Peck before each plunge instead of plunging linearly
    pub peck: bool,
}

impl Slot {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            dx: 50.0,
            dy: 0.0,
            peck: false,
        }
    }
}

impl NcShape for Slot {
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
        ol.push(GCodeOp::modal(61.0));
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

        let mut z = p.z0;
        while z > p.z1 {
            z -= p.zi;
            if z < p.z1 {
                z = p.z1;
            }
            if self.peck {
                ol.push(GCodeOp::drill().z(z).r(z + p.zi).q(p.zi / 2.0).f(p.frz));
            }
            ol.push(GCodeOp::linear().z(z).f(p.frz));
            ol.push(GCodeOp::linear().x(self.dx).y(self.dy).f(p.frtd));
            if z == p.z1 {
                break;
            }
            z -= p.zi;
            if z < p.z1 {
                z = p.z1;
            }
            if self.peck {
                ol.push(GCodeOp::drill().z(z).r(z + p.zi).q(p.zi / 2.0).f(p.frz));
            }
            ol.push(GCodeOp::linear().z(z).f(p.frz));
            ol.push(GCodeOp::linear().x(0.0).y(0.0).f(p.frtd));
        }

        ol.extend(build_postamble(p));
        ol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> Slot {
        let params = ShapeParameters {
            z0: 0.0,
            z1: -3.0,
            zi: 1.0,
            td: 2.0,
            ..Default::default()
        };
        let mut s = Slot::new(params);
        s.object_name = "Slot_1".to_string();
        s.dx = 50.0;
        s.dy = 0.0;
        s
    }

    #[test]
    fn test_alternates_direction_per_pass() {
        let s = slot();
        let g = s.gcode();
        // Odd passes cut towards (dx, dy), even passes back to origin.
        assert!(g.contains("G01 X50.0000 Y0.0000 F300.0000"));
        assert!(g.contains("G01 X0.0000 Y0.0000 F300.0000"));
        let fwd = g.matches("G01 X50.0000 Y0.0000 F300").count();
        let back = g.matches("G01 X0.0000 Y0.0000 F300").count();
        // Passes at -1, -2, -3: forward, back, forward.
        assert_eq!(fwd, 2);
        assert_eq!(back, 1);
    }

    #[test]
    fn test_terminates_exactly_at_end_depth() {
        let s = slot();
        let ops = s.update();
        let deepest = ops
            .iter()
            .filter_map(|o| match o {
                GCodeOp::Linear { z: Some(z), .. } => Some(*z),
                _ => None,
            })
            .fold(f64::INFINITY, f64::min);
        assert_eq!(deepest, -3.0);
    }

    #[test]
    fn test_peck_retraction_before_each_plunge() {
        let mut s = slot();
        s.peck = true;
        let ops = s.update();
        let pecks: Vec<&GCodeOp> = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::DrillCycle { .. }))
            .collect();
        assert_eq!(pecks.len(), 3);
        if let GCodeOp::DrillCycle { z, r, q, .. } = pecks[0] {
            assert_eq!(*z, Some(-1.0));
            assert_eq!(*r, Some(0.0)); // retract plane one zi above
            assert_eq!(*q, Some(0.5));
        }
    }

    #[test]
    fn test_exact_path_mode_enforced() {
        let s = slot();
        let g = s.gcode();
        assert!(g.contains("G61\n"));
    }
}
