//! Ellipse outline by fixed angular sampling.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;
use shapekit_core::math::ellipse_point;

use crate::params::{build_postamble, build_preamble, Contour, ShapeParameters};

use super::{parameter_error, NcShape};

/// Outlines an ellipse centered on the origin.
///
/// The ellipse is sampled at a fixed angular increment; the cut descends
/// continuously across each revolution rather than per full pass, then
/// runs one full-depth revolution and ramps back up on a partial
/// lead-out lap. The asymmetric lead-in/lead-out bounds mirror the
/// behavior of the machines this was tuned against and are covered by
/// tests as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineEllipse {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Radius x
    pub a: f64,
    /// Radius y
    pub b: f64,
    /// Angle increment (resolution), degrees
    pub ai: f64,
    /// Machining direction: conventional or climb cutting
    pub climb: bool,
    /// Cutter compensation mode
    pub contour: Contour,
    /// Leave bridges (reserved depth above the end level)
    pub bridges: bool,
    /// Height of the bridges
    pub bridge_height: f64,
    /// Width of the bridges
    pub bridge_width: f64,
}

impl OutlineEllipse {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            a: 20.0,
            b: 10.0,
            ai: 5.0,
            climb: true,
            contour: Contour::Exact,
            bridges: false,
            bridge_height: 1.0,
            bridge_width: 1.0,
        }
    }

    fn angle_comment(r: f64) -> String {
        if r.fract().abs() < 1e-9 {
            format!("{:.0}", r)
        } else {
            format!("{}", r)
        }
    }
}

impl NcShape for OutlineEllipse {
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
            && self.a > 0.0
            && self.b > 0.0
            && self.a > self.params.td / 2.0
            && self.b > self.params.td / 2.0
            && self.ai > 0.0
            && self.bridge_height > 0.0
            && self.bridge_width > 0.0
    }

    fn update(&self) -> Vec<GCodeOp> {
        if !self.parameters_ok() {
            return parameter_error();
        }
        let p = &self.params;

        let ze = if self.bridges {
            p.z1 + self.bridge_height
        } else {
            p.z1
        };

        let (a, b) = match self.contour {
            Contour::Inside => (self.a - p.td / 2.0, self.b - p.td / 2.0),
            Contour::Exact => (self.a, self.b),
            Contour::Outside => (self.a + p.td / 2.0, self.b + p.td / 2.0),
        };
        let ai = self.ai;

        // Start phase and sweep direction, a 4-way contour x climb table:
        // the inside contour runs opposite to exact/outside.
        let inside = self.contour == Contour::Inside;
        let (descending, start_sample) = match (inside, self.climb) {
            (true, false) => (true, ai),
            (true, true) => (false, -ai),
            (false, false) => (false, -ai),
            (false, true) => (true, ai),
        };
        let mut rng: Vec<f64> = Vec::new();
        if descending {
            let mut r = 360.0;
            while r > 0.0 {
                rng.push(r);
                r -= ai;
            }
        } else {
            let mut r = 0.0;
            while r < 360.0 {
                rng.push(r);
                r += ai;
            }
        }
        let start = ellipse_point(a, b, start_sample);

        let mut ol = build_preamble(p);
        ol.push(
            GCodeOp::rapid()
                .x(start.x)
                .y(start.y)
                .cmt("Rapid move to start point"),
        );
        ol.push(GCodeOp::modal(64.0).p(0.05));

        let mut z = p.z0;
        while z > ze {
            for &r in &rng {
                // Continuous descent: one zi spread over a revolution.
                z -= p.zi / (360.0 / ai);
                let pt = ellipse_point(a, b, r);
                ol.push(
                    GCodeOp::linear()
                        .x(pt.x)
                        .y(pt.y)
                        .z(z)
                        .cmt(Self::angle_comment(r)),
                );
            }
        }

        // Final full-depth revolution.
        for &r in &rng {
            let pt = ellipse_point(a, b, r);
            ol.push(
                GCodeOp::linear()
                    .x(pt.x)
                    .y(pt.y)
                    .cmt(Self::angle_comment(r)),
            );
        }

        // Partial lead-out ramp back towards the start height.
        let mut i = 0;
        for &r in &rng {
            let pt = ellipse_point(a, b, r);
            ol.push(
                GCodeOp::linear()
                    .x(pt.x)
                    .y(pt.y)
                    .z(z)
                    .cmt(Self::angle_comment(r)),
            );
            if z > p.z0 {
                break;
            }
            if i > 0 {
                z += p.zi / (360.0 * 0.0625 / ai.abs());
            }
            i = 1;
        }

        ol.extend(build_postamble(p));
        ol.push(GCodeOp::modal(61.0));
        ol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ellipse() -> OutlineEllipse {
        let params = ShapeParameters {
            z0: 0.0,
            z1: -1.0,
            zi: 1.0,
            td: 2.0,
            ..Default::default()
        };
        let mut e = OutlineEllipse::new(params);
        e.object_name = "OutlineEllipse_1".to_string();
        e.ai = 45.0;
        e
    }

    #[test]
    fn test_depth_interpolates_across_revolution() {
        let e = ellipse();
        let ops = e.update();
        // 8 samples per revolution at ai=45: each descends zi/8.
        let depths: Vec<f64> = ops
            .iter()
            .filter_map(|o| match o {
                GCodeOp::Linear { z: Some(z), x: Some(_), .. } => Some(*z),
                _ => None,
            })
            .collect();
        assert!((depths[0] - (-0.125)).abs() < 1e-9);
        assert!((depths[1] - (-0.25)).abs() < 1e-9);
        // The descent lap bottoms out at z1.
        assert!((depths[7] - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_final_pass_at_constant_depth() {
        let e = ellipse();
        let ops = e.update();
        // After the descent lap comes one lap without z words.
        let flat = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::Linear { z: None, x: Some(_), .. }))
            .count();
        assert_eq!(flat, 8);
    }

    #[test]
    fn test_lead_out_ramps_up_and_stops() {
        let e = ellipse();
        let ops = e.update();
        let depths: Vec<f64> = ops
            .iter()
            .filter_map(|o| match o {
                GCodeOp::Linear { z: Some(z), x: Some(_), .. } => Some(*z),
                _ => None,
            })
            .collect();
        // Lead-out samples follow the descent lap: first two stay at -1
        // (the ramp increment starts after the first sample), then climb
        // by zi*ai/22.5 = 2.0 per sample and break once above z0.
        let lead_out = &depths[8..];
        assert_eq!(lead_out[0], -1.0);
        assert_eq!(lead_out[1], -1.0);
        assert!((lead_out[2] - 1.0).abs() < 1e-9);
        assert_eq!(lead_out.len(), 3);
    }

    #[test]
    fn test_direction_table() {
        // Exact + climb descends the angle range from 360.
        let mut e = ellipse();
        e.climb = true;
        let g = e.gcode();
        let first = g.lines().find(|l| l.contains("( 360 )")).unwrap();
        assert!(first.starts_with("G01 X20.0000"));

        // Exact + conventional ascends from 0.
        e.climb = false;
        let g = e.gcode();
        assert!(g.contains("( 0 )"));
        assert!(!g.contains("( 360 )"));
    }

    #[test]
    fn test_tool_wider_than_axis_is_rejected() {
        let mut e = ellipse();
        e.b = 0.9; // td/2 = 1.0
        assert_eq!(e.update()[0].to_gcode(), "( PARAMETER ERROR )");
    }

    #[test]
    fn test_blend_mode_brackets_path() {
        let e = ellipse();
        let g = e.gcode();
        assert!(g.contains("G64 P0.0500"));
        assert!(g.ends_with("G61\n\n"));
    }
}
