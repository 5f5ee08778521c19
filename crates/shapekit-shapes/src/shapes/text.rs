//! Text engraving with a stroke font.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;
use shapekit_core::math::{arc_angle, Point};
use shapekit_core::FontError;
use std::path::Path as FsPath;
use std::sync::Arc;

use crate::font::{self, Font, FontHandle};
use crate::params::{build_postamble, build_preamble, ShapeParameters};

use super::{parameter_error, NcShape};

/// Engraves text using a loaded stroke font.
///
/// Each glyph is cut stroke by stroke in z-increment passes, lifting to
/// clearance between strokes that do not connect. The cursor advances by
/// glyph width plus character spacing; a non-zero radius bends the
/// advance onto a circular arc instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub object_name: String,
    pub params: ShapeParameters,
    /// The text to engrave; lines separated by \n
    pub text: String,
    /// Path of the stroke-font file this shape was loaded with
    pub fontfile: String,
    /// Requested character height; 0 keeps native font units
    pub char_height: f64,
    /// Requested character width; 0 keeps native font units
    pub char_width: f64,
    /// Space between characters
    pub char_space: f64,
    /// Space between lines
    pub line_space: f64,
    /// Path blending tolerance (G64 P)
    pub g64: f64,
    /// Arc flattening resolution in degrees, applied at font load
    pub arc_res: f64,
    /// Radius of circular text; 0 for straight text
    pub radius: f64,
    /// Arc justification: 0 = center is bottom, 1 = center is top
    pub arc_just: u8,
    /// Alignment: 0 = left, 1 = center, 2 = right
    pub align: u8,
    /// Mirror the result horizontally (negates y)
    pub mirror_h: bool,
    /// Mirror the result vertically (negates x)
    pub mirror_v: bool,
    /// The loaded font; re-attached by the host after deserialization
    #[serde(skip)]
    pub font: Option<FontHandle>,
}

impl Text {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            object_name: String::new(),
            params,
            text: "Simple G-Code\nGenerator!!!".to_string(),
            fontfile: String::new(),
            char_height: 10.0,
            char_width: 10.0,
            char_space: 1.0,
            line_space: 10.0,
            g64: 0.01,
            arc_res: 10.0,
            radius: 0.0,
            arc_just: 0,
            align: 1,
            mirror_h: false,
            mirror_v: false,
            font: None,
        }
    }

    /// Loads the given font file and attaches it to this shape.
    ///
    /// On failure the shape is left without a font (and renders the
    /// parameter-error sentinel) rather than keeping a stale one.
    pub fn load_font(&mut self, path: impl AsRef<FsPath>) -> Result<(), FontError> {
        match font::load_font(&path, self.arc_res) {
            Ok(f) => {
                self.font = Some(Arc::new(f));
                self.fontfile = path.as_ref().display().to_string();
                Ok(())
            }
            Err(e) => {
                self.font = None;
                self.fontfile = String::new();
                Err(e)
            }
        }
    }

    /// Attaches an already-loaded font handle.
    pub fn set_font(&mut self, font: FontHandle, fontfile: impl Into<String>) {
        self.font = Some(font);
        self.fontfile = fontfile.into();
    }

    /// The x/y scale mapping native font units to the requested box.
    /// Zero width or height keeps native units.
    fn scale(&self, font: &Font) -> (f64, f64) {
        if self.char_width == 0.0 || self.char_height == 0.0 {
            (1.0, 1.0)
        } else {
            (self.char_width / font.wmax, self.char_height / font.hmax)
        }
    }

    /// The rendered width of one line.
    fn text_width(&self, font: &Font, line: &str, scale_x: f64) -> f64 {
        let mut l = 0.0;
        for c in line.chars() {
            let key = c as u32;
            match font.glyph(key) {
                Some(g) => l += g.xmax * scale_x + self.char_space,
                None => l += font.xmax * scale_x + self.char_space,
            }
        }
        if let Some(c) = line.chars().next() {
            if let Some(g) = font.glyph(c as u32) {
                l -= self.char_space - g.xmin;
            }
        }
        l
    }

    /// The rendered height of the whole text block.
    fn text_height(&self, font: &Font, text: &str, scale_y: f64) -> f64 {
        let lines = text.matches('\n').count() as f64;
        if scale_y != 1.0 {
            lines * self.char_height
        } else {
            lines * font.ymax
        }
    }

    /// The op list for a single glyph, aligned to the origin.
    fn glyph_gcode(&self, font: &Font, key: u32, scale_x: f64, scale_y: f64) -> Vec<GCodeOp> {
        let p = &self.params;
        let mut ol = Vec::new();
        if key == ' ' as u32 {
            return ol;
        }
        let glyph = match font.glyph(key) {
            Some(g) => g,
            None => return ol,
        };

        let mut z = p.z0;
        while z > p.z1 {
            z -= p.zi;
            if z < p.z1 {
                z = p.z1;
            }
            // Pen position of the previous stroke end; parked far away so
            // the first stroke always triggers an approach.
            let mut pen = Point::new(-1000.0, -1000.0);
            let mut first_stroke = true;
            for stroke in &glyph.strokes {
                let s = Point::new(stroke.x0 * scale_x, stroke.y0 * scale_y);
                if s.distance_to(&pen) > 0.001 || first_stroke {
                    first_stroke = false;
                    ol.push(GCodeOp::rapid().z(p.zsh));
                    ol.push(GCodeOp::rapid().x(s.x).y(s.y));
                    ol.push(GCodeOp::rapid().z(z + 0.1));
                    ol.push(GCodeOp::linear().z(z).f(p.frtd));
                }
                pen = Point::new(stroke.x1 * scale_x, stroke.y1 * scale_y);
                ol.push(GCodeOp::linear().x(pen.x).y(pen.y));
            }
        }
        ol
    }

    /// The op list for the whole text block.
    fn text_gcode(&self, font: &Font, text: &str, scale_x: f64, scale_y: f64) -> Vec<GCodeOp> {
        let mut ol = Vec::new();
        let ch = if scale_y == 1.0 {
            font.ymax
        } else {
            self.char_height
        };
        // Radius of the glyph baseline for circular text.
        let mut r = if self.arc_just == 0 {
            self.radius - ch
        } else {
            -(self.radius - self.text_height(font, text, scale_y))
        };
        let mut row = 0.0;

        for line in text.split('\n') {
            if line.is_empty() {
                break;
            }
            let line_width = self.text_width(font, line, scale_x);
            let first_key = line.chars().next().map(|c| c as u32).unwrap_or(0);
            let first_xmin = font.glyph(first_key).map(|g| g.xmin).unwrap_or(0.0);
            let mut x = match self.align % 3 {
                0 => 0.0 - first_xmin,
                1 => -line_width / 2.0,
                2 => -line_width + first_xmin,
                _ => 0.0,
            };

            for c in line.chars() {
                let key = c as u32;
                if !font.has_glyph(key) {
                    break;
                }
                let glyph_xmax = font.glyph(key).map(|g| g.xmax).unwrap_or(0.0);
                let mut o = self.glyph_gcode(font, key, scale_x, scale_y);
                if self.radius != 0.0 {
                    // Bend onto the arc: linear advance maps to angle,
                    // each glyph pivots about its own center.
                    let half = glyph_xmax * scale_x / 2.0;
                    let a = arc_angle(x + half, r);
                    for oo in &mut o {
                        oo.rotate(Point::new(half, -r), -a);
                        oo.add_offset(-half, r, 0.0);
                    }
                } else {
                    for oo in &mut o {
                        oo.add_offset(x, row, 0.0);
                    }
                }
                ol.extend(o);
                x += glyph_xmax * scale_x + self.char_space;
            }
            r -= self.line_space;
            row -= self.line_space;
        }
        ol
    }
}

impl NcShape for Text {
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
        self.params.base_parameters_ok() && self.font.is_some()
    }

    fn update(&self) -> Vec<GCodeOp> {
        if !self.parameters_ok() {
            return parameter_error();
        }
        let p = &self.params;
        let font = self.font.as_ref().expect("checked by parameters_ok");

        let mut ol = build_preamble(p);
        ol.push(GCodeOp::modal(64.0).p(self.g64).cmt("Blend path mode"));
        if !self.text.is_empty() {
            let (scale_x, scale_y) = self.scale(font);
            let mut body = self.text_gcode(font, &self.text, scale_x, scale_y);
            if self.mirror_v {
                for op in &mut body {
                    op.negate_x();
                }
            }
            if self.mirror_h {
                for op in &mut body {
                    op.negate_y();
                }
            }
            ol.extend(body);
        }
        ol.push(GCodeOp::modal(61.0).cmt("Exact path mode"));
        ol.extend(build_postamble(p));
        ol
    }
}
