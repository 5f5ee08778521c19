//! Circular-arc band pocket.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::{ArcDirection, GCodeOp};
use shapekit_core::math::{arc_angle, rotate_point, Point};

use crate::params::{build_postamble, build_preamble, ShapeParameters};

use super::{parameter_error, NcShape};

/// Clears an angular band between two radii and two angles.
///
/// Starts on the band's center line and grows symmetric concentric
/// passes outward until the remaining span is covered, correcting the
/// final step to land exactly on the boundary - the same ring-growth
/// policy as the full circular pocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PocketCircularArc {
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
}

impl PocketCircularArc {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            ri: 25.0,
            ro: 50.0,
            a0: 0.0,
            a1: 90.0,
        }
    }

    /// One band lap at the given radii: trimmed outer arc out, trimmed
    /// inner arc back.
    fn band_lap(&self, ri: f64, ro: f64) -> Vec<GCodeOp> {
        let p = &self.params;
        let origin = Point::new(0.0, 0.0);
        let mut ol = Vec::new();

        let a = arc_angle(p.td / 2.0, ro);
        let p0 = rotate_point(Point::new(ro, 0.0), origin, self.a0 + a);
        let p1 = rotate_point(Point::new(ro, 0.0), origin, self.a1 - a);
        ol.push(GCodeOp::linear().x(p0.x).y(p0.y).f(p.frtd));
        ol.push(
            GCodeOp::arc(ArcDirection::Ccw)
                .x(p1.x)
                .y(p1.y)
                .i(-p0.x)
                .j(-p0.y),
        );

        let a = arc_angle(p.td / 2.0, ri);
        let p0 = rotate_point(Point::new(ri, 0.0), origin, self.a1 - a);
        let p1 = rotate_point(Point::new(ri, 0.0), origin, self.a0 + a);
        ol.push(GCodeOp::linear().x(p0.x).y(p0.y).f(p.frtd));
        ol.push(
            GCodeOp::arc(ArcDirection::Cw)
                .x(p1.x)
                .y(p1.y)
                .i(-p0.x)
                .j(-p0.y),
        );
        ol
    }
}

impl NcShape for PocketCircularArc {
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

        let so = p.td / 100.0 * p.so;
        let r0 = self.ri + (self.ro - self.ri) / 2.0;
        let dr_max = (self.ro - self.ri) / 2.0 - so;
        let a = arc_angle(so, r0);
        let origin = Point::new(0.0, 0.0);
        let start = rotate_point(Point::new(r0, 0.0), origin, self.a0 + a);

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
            ol.push(GCodeOp::modal(64.0).cmt("Blend path mode"));
            let mut dr = -so / 2.0;
            while dr <= dr_max {
                dr += so;
                if dr > dr_max {
                    dr = dr_max;
                    ol.push(GCodeOp::modal(61.0).cmt("Exact path mode"));
                }
                ol.extend(self.band_lap(r0 - dr, r0 + dr));
                if dr >= dr_max {
                    break;
                }
            }
            ol.push(GCodeOp::linear().x(start.x).y(start.y));
        }

        // Lead out slightly ahead along the band, one increment up.
        let out = rotate_point(Point::new(r0, 0.0), origin, self.a0 + a * 1.5);
        ol.push(GCodeOp::linear().x(out.x).y(out.y).z(z + p.zi));
        ol.extend(build_postamble(p));
        ol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band() -> PocketCircularArc {
        let params = ShapeParameters {
            z0: 0.0,
            z1: -1.0,
            zi: 1.0,
            td: 2.0,
            so: 50.0,
            ..Default::default()
        };
        let mut b = PocketCircularArc::new(params);
        b.object_name = "PocketCircularArc_1".to_string();
        b.ri = 20.0;
        b.ro = 30.0;
        b.a0 = 0.0;
        b.a1 = 90.0;
        b
    }

    #[test]
    fn test_rings_grow_from_centerline() {
        let b = band();
        let ops = b.update();
        // so = 1, r0 = 25, dr_max = 4: ring passes at dr = 0.5, 1.5, 2.5,
        // 3.5, then the corrected final pass at 4.
        let ccw_arcs: Vec<&GCodeOp> = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::Arc { dir: ArcDirection::Ccw, .. }))
            .collect();
        assert_eq!(ccw_arcs.len(), 5);
        // Final pass reaches the boundary radius ro - so = 29.
        let outer_radii: Vec<f64> = ops
            .iter()
            .filter_map(|o| match o {
                GCodeOp::Arc {
                    dir: ArcDirection::Ccw,
                    i: Some(i),
                    j: Some(j),
                    ..
                } => Some((i * i + j * j).sqrt()),
                _ => None,
            })
            .collect();
        let max = outer_radii.iter().cloned().fold(0.0f64, f64::max);
        assert!((max - 29.0).abs() < 1e-9);
    }

    #[test]
    fn test_each_lap_pairs_outer_and_inner() {
        let b = band();
        let ops = b.update();
        let ccw = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::Arc { dir: ArcDirection::Ccw, .. }))
            .count();
        let cw = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::Arc { dir: ArcDirection::Cw, .. }))
            .count();
        assert_eq!(ccw, cw);
    }

    #[test]
    fn test_exact_mode_guard_before_final_ring() {
        let b = band();
        let g = b.gcode();
        assert!(g.contains("G61\t\t\t\t\t\t( Exact path mode )"));
    }

    #[test]
    fn test_lead_out_one_increment_up() {
        let b = band();
        let ops = b.update();
        let lead = ops
            .iter()
            .rev()
            .find(|o| matches!(o, GCodeOp::Linear { z: Some(_), .. }))
            .unwrap();
        if let GCodeOp::Linear { z, .. } = lead {
            assert_eq!(*z, Some(0.0)); // -1 + zi
        }
    }
}
