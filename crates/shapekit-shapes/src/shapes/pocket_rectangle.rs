//! Rectangular pocket, zig-zag cleared.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;

use crate::params::{build_postamble, build_preamble, ShapeParameters};

use super::{parameter_error, NcShape};

/// Clears a rectangular pocket centered on the origin.
///
/// The pattern starts in the center and steps outward quadrant-
/// symmetrically, the y step scaled to the aspect ratio so both bounds
/// are reached together. A boundary lap finishes each level, optionally
/// with corner-relief cuts so a square insert seats fully. Climb milling
/// mirrors the whole pattern across both axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PocketRectangle {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Width (x)
    pub w: f64,
    /// Height (y)
    pub h: f64,
    /// Machining direction: conventional or climb cutting
    pub climb: bool,
    /// Mill out the corners to seat a rectangular insert
    pub corners: bool,
}

impl PocketRectangle {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            w: 50.0,
            h: 40.0,
            climb: true,
            corners: false,
        }
    }
}

impl NcShape for PocketRectangle {
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

        let d = p.td * (p.so / 100.0);
        // The pocket must be wider than the tool in both axes.
        if self.w <= p.td || self.h <= p.td {
            return Vec::new();
        }
        let xm = (self.w - p.td) / 2.0;
        let ym = (self.h - p.td) / 2.0;
        let dx = d;
        let dy = (ym / xm) * d;
        // Corner relief: diagonal reach of the tool beyond its radius.
        let c = (2.0 * (p.td / 2.0) * (p.td / 2.0)).sqrt() - p.td / 2.0;

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

        let mut z = p.z0;
        while z > p.z1 {
            z -= p.zi;
            if z < p.z1 {
                z = p.z1;
            }
            ol.push(GCodeOp::linear().x(0.0).y(0.0));
            ol.push(GCodeOp::linear().z(z).f(p.frtd));
            ol.push(GCodeOp::modal(64.0));
            let mut x = 0.0;
            let mut y = 0.0;
            loop {
                x += dx;
                if x > xm {
                    x = xm;
                }
                ol.push(GCodeOp::linear().x(x).y(y));
                y += dy;
                if y > ym {
                    y = ym;
                }
                ol.push(GCodeOp::linear().x(x).y(-y));
                ol.push(GCodeOp::linear().x(-x).y(-y));
                ol.push(GCodeOp::linear().x(-x).y(y));
                if x >= xm && y >= ym {
                    break;
                }
            }
            ol.push(GCodeOp::modal(61.0));
            if self.corners {
                ol.push(GCodeOp::linear().x(x).y(y));
                ol.push(GCodeOp::linear().x(x + c).y(y + c));
                ol.push(GCodeOp::linear().x(x).y(y));
                ol.push(GCodeOp::linear().x(x).y(-y));
                ol.push(GCodeOp::linear().x(x + c).y(-y - c));
                ol.push(GCodeOp::linear().x(x).y(-y));
                ol.push(GCodeOp::linear().x(-x).y(-y));
                ol.push(GCodeOp::linear().x(-x - c).y(-y - c));
                ol.push(GCodeOp::linear().x(-x).y(-y));
                ol.push(GCodeOp::linear().x(-x).y(y));
                ol.push(GCodeOp::linear().x(-x - c).y(y + c));
                ol.push(GCodeOp::linear().x(-x).y(y));
            } else {
                ol.push(GCodeOp::linear().x(x).y(y));
                ol.push(GCodeOp::linear().x(x).y(-y));
                ol.push(GCodeOp::linear().x(-x).y(-y));
                ol.push(GCodeOp::linear().x(-x).y(y));
            }
            ol.push(GCodeOp::modal(64.0));
            ol.push(GCodeOp::linear().x(0.0).y(y));
            ol.push(GCodeOp::modal(61.0));
        }

        if self.climb {
            // Climb milling runs the identical pattern mirrored across
            // both axes.
            for op in &mut ol {
                op.mirror_xy();
            }
        }
        ol.push(GCodeOp::rapid().x(0.0).y(0.0).z(0.0));
        ol.extend(build_postamble(p));
        ol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pocket() -> PocketRectangle {
        let params = ShapeParameters {
            z0: 0.0,
            z1: -1.0,
            zi: 1.0,
            td: 2.0,
            so: 50.0,
            ..Default::default()
        };
        let mut r = PocketRectangle::new(params);
        r.object_name = "PocketRectangle_1".to_string();
        r.w = 10.0;
        r.h = 6.0;
        r.climb = false;
        r
    }

    #[test]
    fn test_zigzag_reaches_both_bounds() {
        let r = pocket();
        let g = r.gcode();
        // xm = 4, ym = 2 for a 10x6 pocket with a 2mm tool.
        assert!(g.contains("X4.0000 Y2.0000"));
        assert!(g.contains("X-4.0000 Y-2.0000"));
    }

    #[test]
    fn test_y_step_matches_aspect_ratio() {
        let r = pocket();
        let ops = r.update();
        // dx = 1.0, dy = (2/4)*1.0 = 0.5: the first outward ring sits at
        // x=1, y=0.5.
        let lines: Vec<String> = ops.iter().map(|o| o.to_gcode()).collect();
        assert!(lines.iter().any(|l| l == "G01 X1.0000 Y-0.5000"));
    }

    #[test]
    fn test_undersized_pocket_yields_empty_path() {
        let mut r = pocket();
        r.w = 1.0; // narrower than the tool
        assert!(r.update().is_empty());
    }

    #[test]
    fn test_corner_relief_cuts() {
        let mut r = pocket();
        r.corners = true;
        let g = r.gcode();
        // c = sqrt(2)*1 - 1 for td=2.
        let c = 2.0_f64.sqrt() - 1.0;
        assert!(g.contains(&format!("X{:.4} Y{:.4}", 4.0 + c, 2.0 + c)));
    }

    #[test]
    fn test_climb_mirrors_pattern() {
        let mut conv = pocket();
        let mut climb = pocket();
        climb.climb = true;
        conv.climb = false;
        let g_conv: Vec<String> = conv.update().iter().map(|o| o.to_gcode()).collect();
        let g_climb: Vec<String> = climb.update().iter().map(|o| o.to_gcode()).collect();

        // First zig move flips sign in both axes.
        let first_conv = g_conv.iter().find(|l| l.contains("X1.0000")).unwrap();
        assert_eq!(first_conv, "G01 X1.0000 Y0.0000");
        assert!(g_climb.iter().any(|l| l == "G01 X-1.0000 Y-0.0000"));
    }

    #[test]
    fn test_pattern_ends_at_origin_level_zero() {
        let r = pocket();
        let g = r.gcode();
        assert!(g.contains("G00 X0.0000 Y0.0000 Z0.0000"));
    }
}
