//! Arbitrary polygon outline.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;
use shapekit_core::math::{point_on_line, Point};
use std::path::Path as FsPath;

use crate::params::{build_postamble, build_preamble, ShapeParameters};

use super::{parameter_error, NcShape};

/// Machine-side cutter compensation for the polygon path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutterComp {
    /// No compensation
    Off,
    /// G41, tool left of the programmed path
    Left,
    /// G42, tool right of the programmed path
    Right,
}

impl Default for CutterComp {
    fn default() -> Self {
        CutterComp::Off
    }
}

/// Cuts along an arbitrary, independently scaled point list.
///
/// Points are built interactively by the host or imported from a
/// two-column coordinate file. With cutter compensation enabled the tool
/// first rapids to a lead-in point one tool diameter from the first
/// point towards the last, so the compensation has room to engage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlinePolygon {
    pub object_name: String,
    pub params: ShapeParameters,
    /// Scale factor x
    pub scale_x: f64,
    /// Scale factor y
    pub scale_y: f64,
    /// Cutter compensation
    pub cc: CutterComp,
    /// Automatically close the polygon
    pub close: bool,
    /// The polygon points, unscaled
    pub points: Vec<Point>,
    /// Shape-local rotation center
    pub rs_x: f64,
    pub rs_y: f64,
    /// Shape-local rotation, degrees
    pub rs_deg: f64,
    /// Path blending tolerance (G64 P)
    pub g64: f64,
}

impl OutlinePolygon {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            scale_x: 1.0,
            scale_y: 1.0,
            cc: CutterComp::Off,
            close: true,
            points: Vec::new(),
            rs_x: 0.0,
            rs_y: 0.0,
            rs_deg: 0.0,
            g64: 0.01,
        }
    }

    /// Imports points from a two-column coordinate file.
    ///
    /// Lines that do not hold exactly two numbers are skipped.
    pub fn import_points(&mut self, path: impl AsRef<FsPath>) -> Result<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read polygon file {}", path.display()))?;
        self.points.clear();
        for line in text.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() == 2 {
                if let (Ok(x), Ok(y)) = (parts[0].parse::<f64>(), parts[1].parse::<f64>()) {
                    self.points.push(Point::new(x, y));
                }
            }
        }
        Ok(())
    }
}

impl NcShape for OutlinePolygon {
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

        let pts: Vec<Point> = self
            .points
            .iter()
            .map(|pt| Point::new(pt.x * self.scale_x, pt.y * self.scale_y))
            .collect();

        // Start point and cutter-compensation lead-in point.
        let (start, lead_in) = if pts.len() > 2 {
            let p0 = pts[0];
            let mut p1 = pts[pts.len() - 1];
            if p0 == p1 {
                p1 = pts[pts.len() - 2];
            }
            (p0, point_on_line(p0, p1, p.td))
        } else {
            (Point::new(0.0, 0.0), Point::new(0.0, 0.0))
        };

        let mut ol = build_preamble(p);
        ol.push(GCodeOp::modal(64.0).p(self.g64).cmt("Blend path mode"));
        match self.cc {
            CutterComp::Left => {
                ol.push(
                    GCodeOp::rapid()
                        .x(lead_in.x)
                        .y(lead_in.y)
                        .cmt("Rapid move to lead in point"),
                );
                ol.push(GCodeOp::rapid().z(p.z0 + p.zsh0).f(p.frz));
                ol.push(GCodeOp::modal(41.0).cmt("cutter compensation left of programmed path"));
            }
            CutterComp::Right => {
                ol.push(
                    GCodeOp::rapid()
                        .x(lead_in.x)
                        .y(lead_in.y)
                        .cmt("Rapid move to lead in point"),
                );
                ol.push(GCodeOp::rapid().z(p.z0 + p.zsh0).f(p.frz));
                ol.push(GCodeOp::modal(42.0).cmt("cutter compensation right of programmed path"));
            }
            CutterComp::Off => {}
        }

        ol.push(
            GCodeOp::rapid()
                .x(start.x)
                .y(start.y)
                .cmt("Rapid move to start point"),
        );

        let mut z = p.z0;
        while z > p.z1 {
            z -= p.zi;
            if z < p.z1 {
                z = p.z1;
            }
            ol.push(GCodeOp::linear().z(z).f(p.frz));
            ol.push(GCodeOp::feed(p.frtd));
            for pt in &pts {
                ol.push(GCodeOp::linear().x(pt.x).y(pt.y));
            }
            if self.close && !pts.is_empty() {
                ol.push(GCodeOp::linear().x(pts[0].x).y(pts[0].y));
            }
        }

        ol.extend(build_postamble(p));
        if self.cc != CutterComp::Off {
            ol.push(GCodeOp::modal(40.0).cmt("cutter compensation off"));
        }
        ol.push(GCodeOp::modal(61.0).cmt("Exact path mode"));

        for op in &mut ol {
            op.rotate(Point::new(self.rs_x, self.rs_y), self.rs_deg);
        }
        ol
    }
}
