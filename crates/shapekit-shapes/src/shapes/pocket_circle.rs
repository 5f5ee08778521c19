//! Circular pocket, ring-spiral cleared.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::{ArcDirection, GCodeOp};

use crate::params::{build_postamble, build_preamble, ShapeParameters};
use crate::pocketing::pocket_circle;

use super::{parameter_error, NcShape};

/// Clears a circular (or annular) pocket centered on the origin using
/// the shared ring-spiral routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PocketCircle {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Inner radius; 0 for a full pocket
    pub ri: f64,
    /// Outer radius
    pub ra: f64,
    /// Machining direction: conventional or climb cutting
    pub climb: bool,
}

impl PocketCircle {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            ri: 5.0,
            ra: 20.0,
            climb: true,
        }
    }
}

impl NcShape for PocketCircle {
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

        let dr = p.td * (p.so / 100.0);
        // A full pocket still needs a little entry clearance at the
        // center; an annular one keeps the tool off the inner wall.
        let ri = if self.ri == 0.0 {
            p.td / 3.0
        } else {
            self.ri + p.td / 2.0
        };
        let ra = self.ra - p.td / 2.0;
        let dir = if self.climb {
            ArcDirection::Cw
        } else {
            ArcDirection::Ccw
        };

        let mut ol = build_preamble(p);
        ol.push(
            GCodeOp::rapid()
                .x(ri)
                .y(0.0)
                .cmt("Rapid move to start point"),
        );
        ol.push(
            GCodeOp::rapid()
                .z(p.z0 + p.zsh0)
                .cmt("Rapid down to workpiece"),
        );
        ol.extend(pocket_circle(
            dir, p.z0, p.z1, p.zi, ri, ra, dr, p.frtd, p.frso,
        ));
        // Park mid-band before lifting off.
        ol.push(GCodeOp::linear().x(ri + (ra - ri) / 2.0).y(0.0));
        ol.extend(build_postamble(p));
        ol
    }
}
