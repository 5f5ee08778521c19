//! Rectangle outline with optional bridge tabs.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;
use shapekit_core::math::Point;

use crate::params::{build_postamble, build_preamble, Contour, ShapeParameters};

use super::{parameter_error, NcShape};

/// Outlines a rectangle centered on the origin.
///
/// The path runs at the nominal boundary, or half a tool diameter inside
/// or outside of it. With bridges enabled, the plunge ladder stops one
/// bridge height above the end depth and a second ladder walks the
/// boundary lifting the tool over four tabs per side pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineRectangle {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Width (x)
    pub w: f64,
    /// Height (y)
    pub h: f64,
    /// Machining direction: conventional or climb cutting
    pub climb: bool,
    /// Cutter compensation mode
    pub contour: Contour,
    /// Leave four bridges per side pair
    pub bridges: bool,
    /// Height of the bridges
    pub bridge_height: f64,
    /// Width of the bridges
    pub bridge_width: f64,
    /// Shape-local rotation center
    pub rs_x: f64,
    pub rs_y: f64,
    /// Shape-local rotation, degrees
    pub rs_deg: f64,
}

/// Waypoint in the bridge walk: either a corner/gap point or a z move.
enum BridgeStep {
    At(f64, f64),
    /// Lift to the bridge reserve level.
    Raise,
    /// Plunge back to the current cutting depth.
    Lower,
}

impl OutlineRectangle {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            w: 40.0,
            h: 20.0,
            climb: true,
            contour: Contour::Exact,
            bridges: true,
            bridge_height: 1.0,
            bridge_width: 1.0,
            rs_x: 0.0,
            rs_y: 0.0,
            rs_deg: 0.0,
        }
    }
}

impl NcShape for OutlineRectangle {
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
            && self.w > 0.0
            && self.h > 0.0
            && self.bridge_height > 0.0
            && self.bridge_width > 0.0
    }

    fn update(&self) -> Vec<GCodeOp> {
        if !self.parameters_ok() {
            return parameter_error();
        }
        let p = &self.params;

        // End depth of the plunge ladder: bridges reserve material above z1.
        let ze = if self.bridges {
            p.z1 + self.bridge_height
        } else {
            p.z1
        };

        let (x, y) = match self.contour {
            Contour::Inside => ((self.w - p.td) / 2.0, (self.h - p.td) / 2.0),
            Contour::Outside => ((self.w + p.td) / 2.0, (self.h + p.td) / 2.0),
            Contour::Exact => (self.w / 2.0, self.h / 2.0),
        };

        let mut waypoints = vec![(x, y), (x, -y), (-x, -y), (-x, y), (x, y)];

        // Gap half-width measured from the tab center.
        let bw = (self.bridge_width + p.td) / 2.0;
        use BridgeStep::{At, Lower, Raise};
        let mut bridge_walk = vec![
            Lower,
            At(x, y),
            Lower,
            At(x, bw),
            Raise,
            At(x, -bw),
            Lower,
            At(x, -y),
            Lower,
            At(bw, -y),
            Raise,
            At(-bw, -y),
            Lower,
            At(-x, -y),
            Lower,
            At(-x, -bw),
            Raise,
            At(-x, bw),
            Lower,
            At(-x, y),
            Lower,
            At(-bw, y),
            Raise,
            At(bw, y),
            Lower,
            At(x, y),
            Lower,
        ];

        if !self.climb {
            waypoints.reverse();
            bridge_walk.reverse();
        }
        if self.contour == Contour::Exact {
            waypoints.reverse();
            bridge_walk.reverse();
        }

        let mut ol = build_preamble(p);
        ol.push(
            GCodeOp::rapid()
                .x(waypoints[0].0)
                .y(waypoints[0].1)
                .cmt("Rapid move to start point"),
        );
        ol.push(
            GCodeOp::rapid()
                .z(p.z0 + p.zsh0)
                .cmt("Rapid down to workpiece"),
        );

        let mut z = p.z0;
        while z > ze {
            z -= p.zi;
            if z < ze {
                z = ze;
            }
            ol.push(GCodeOp::linear().z(z).f(p.frz));
            for &(wx, wy) in &waypoints {
                ol.push(GCodeOp::linear().x(wx).y(wy).f(p.frtd));
            }
        }

        if self.bridges {
            while z > p.z1 {
                z -= p.zi;
                if z < p.z1 {
                    z = p.z1;
                }
                for step in &bridge_walk {
                    match step {
                        At(wx, wy) => ol.push(GCodeOp::linear().x(*wx).y(*wy).f(p.frtd)),
                        Raise => ol.push(GCodeOp::linear().z(ze).f(p.frz)),
                        Lower => ol.push(GCodeOp::linear().z(z).f(p.frz)),
                    }
                }
            }
        }

        ol.extend(build_postamble(p));

        for op in &mut ol {
            op.rotate(Point::new(self.rs_x, self.rs_y), self.rs_deg);
        }
        ol
    }
}
