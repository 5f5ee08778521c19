//! Bezel tick engraving.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;
use shapekit_core::math::{rotate_point, Point};

use crate::params::{build_postamble, build_preamble, ShapeParameters};

use super::{parameter_error, NcShape};

/// Engraves radial tick marks for a dial or bezel.
///
/// Ticks are spaced evenly from the start to the end angle; every
/// `div_major`-th tick, starting with the first, is cut to the major
/// outer radius, the rest to the minor one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bezel {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Inner radius
    pub ri: f64,
    /// Outer radius of major ticks
    pub ro_major: f64,
    /// Outer radius of minor ticks
    pub ro_minor: f64,
    /// Start angle, degrees
    pub a0: f64,
    /// End angle, degrees
    pub a1: f64,
    /// Number of ticks
    pub div: u32,
    /// Major tick every n divisions
    pub div_major: u32,
}

impl Bezel {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            ri: 15.0,
            ro_major: 22.5,
            ro_minor: 20.0,
            a0: 240.0,
            a1: -60.0,
            div: 25,
            div_major: 4,
        }
    }

    /// The tick segments as (start, end) point pairs.
    pub fn ticks(&self) -> Vec<(Point, Point)> {
        let a = (self.a1 - self.a0) / (self.div - 1) as f64;
        let origin = Point::new(0.0, 0.0);
        let mut ticks = Vec::new();
        let mut j = 0;
        for i in 0..self.div {
            let angle = i as f64 * a + self.a0;
            let start = rotate_point(Point::new(self.ri, 0.0), origin, angle);
            let ro = if j == 0 { self.ro_major } else { self.ro_minor };
            let end = rotate_point(Point::new(ro, 0.0), origin, angle);
            j += 1;
            if j == self.div_major {
                j = 0;
            }
            ticks.push((start, end));
        }
        ticks
    }
}

impl NcShape for Bezel {
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
            && self.ri > 0.0
            && self.ro_minor > 0.0
            && self.ro_major > 0.0
            && self.div > 1
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
        for (start, end) in self.ticks() {
            ol.push(GCodeOp::rapid().z(p.zsh));
            ol.push(GCodeOp::rapid().x(start.x).y(start.y));
            ol.push(GCodeOp::rapid().z(p.z0 + p.zsh0));
            ol.push(GCodeOp::linear().z(p.z1).f(p.frz));
            ol.push(GCodeOp::linear().x(end.x).y(end.y));
        }
        ol.extend(build_postamble(p));
        ol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bezel() -> Bezel {
        let params = ShapeParameters {
            z0: 0.0,
            z1: -0.5,
            zi: 0.5,
            td: 1.0,
            ..Default::default()
        };
        let mut b = Bezel::new(params);
        b.object_name = "Bezel_1".to_string();
        b.ri = 10.0;
        b.ro_major = 20.0;
        b.ro_minor = 15.0;
        b.a0 = 0.0;
        b.a1 = 90.0;
        b.div = 4;
        b.div_major = 3;
        b
    }

    #[test]
    fn test_ticks_evenly_spaced() {
        let b = bezel();
        let ticks = b.ticks();
        assert_eq!(ticks.len(), 4);
        // Delta angle = 90/3 = 30 degrees; first tick along +x.
        assert!((ticks[0].0.x - 10.0).abs() < 1e-9);
        assert!(ticks[0].0.y.abs() < 1e-9);
        let second = ticks[1].0;
        assert!((second.x - 10.0 * 30.0_f64.to_radians().cos()).abs() < 1e-9);
    }

    #[test]
    fn test_major_minor_alternation() {
        let b = bezel();
        let ticks = b.ticks();
        let len = |t: &(Point, Point)| (t.1.x.powi(2) + t.1.y.powi(2)).sqrt();
        // div_major = 3: ticks 0 and 3 are major.
        assert!((len(&ticks[0]) - 20.0).abs() < 1e-9);
        assert!((len(&ticks[1]) - 15.0).abs() < 1e-9);
        assert!((len(&ticks[2]) - 15.0).abs() < 1e-9);
        assert!((len(&ticks[3]) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_engrave_cycle_per_tick() {
        let b = bezel();
        let ops = b.update();
        let plunges = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::Linear { z: Some(z), .. } if *z == -0.5))
            .count();
        assert_eq!(plunges, 4);
    }

    #[test]
    fn test_single_division_rejected() {
        let mut b = bezel();
        b.div = 1;
        assert_eq!(b.update()[0].to_gcode(), "( PARAMETER ERROR )");
    }
}
