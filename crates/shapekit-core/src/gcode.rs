//! G-code primitive operations.
//!
//! Every toolpath generator produces a flat list of [`GCodeOp`] values;
//! rendering and the geometric transforms live here. Formatting is pure
//! and locale-independent: floats always carry exactly four fractional
//! digits, and rendering the same op twice is byte-identical.
//!
//! Fields are optional throughout. An absent field is simply not emitted;
//! it is never defaulted to zero. An op whose mandatory word is missing
//! (a tool select without a tool number, a machine command without a
//! code) renders an inline error marker instead of silently dropping the
//! command.

use crate::math::{rotate_point, Point};

/// Direction of an arc move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    /// Clockwise (G02)
    Cw,
    /// Counter-clockwise (G03)
    Ccw,
}

/// A single G-code operation.
#[derive(Debug, Clone, PartialEq)]
pub enum GCodeOp {
    /// G00 rapid move. Emits X, Y, Z, F, comment.
    Rapid {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        f: Option<f64>,
        c: Option<String>,
    },
    /// G01 linear interpolated move. Emits X, Y, Z, F, comment.
    Linear {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        f: Option<f64>,
        c: Option<String>,
    },
    /// G02/G03 arc move. Emits X, Y, Z, I, J, K, P, F, comment.
    ///
    /// I/J are the arc center relative to the start point; P is the
    /// number of full turns for helical/spiral moves.
    Arc {
        dir: ArcDirection,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        i: Option<f64>,
        j: Option<f64>,
        k: Option<f64>,
        p: Option<f64>,
        f: Option<f64>,
        c: Option<String>,
    },
    /// G83 peck drilling cycle. Emits X, Y, Z, R, L, Q, F, comment.
    DrillCycle {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        r: Option<f64>,
        l: Option<f64>,
        q: Option<f64>,
        f: Option<f64>,
        c: Option<String>,
    },
    /// T word, tool selection.
    ToolSelect { tool: Option<u32>, c: Option<String> },
    /// Standalone F word, feed rate.
    Feed { f: Option<f64>, c: Option<String> },
    /// M word, machine command, with optional spindle speed.
    Machine {
        code: Option<u32>,
        s: Option<f64>,
        c: Option<String>,
    },
    /// Plain G word for plane selection and modal commands.
    ///
    /// The code may be fractional (G17.1, G61.1); an integral code is
    /// emitted without a decimal point.
    Modal {
        code: Option<f64>,
        p: Option<f64>,
        q: Option<f64>,
        c: Option<String>,
    },
    /// Verbatim text block, passed through untouched.
    RawText { text: String, c: Option<String> },
    /// A standalone comment line.
    Comment { text: String },
}

/// Formats a float for G-code output with exactly four fractional digits.
fn fv(v: f64) -> String {
    format!("{:.4}", v)
}

/// Formats a trailing comment: tab padding plus parenthesized text.
fn cmt_str(c: &str) -> String {
    format!("\t\t\t\t\t\t( {} )", c)
}

/// Inline marker for an op whose mandatory word is missing.
fn error_marker(letter: char) -> String {
    format!("{}!!  ( *** ERROR *** )", letter)
}

impl GCodeOp {
    /// Creates an empty rapid move.
    pub fn rapid() -> Self {
        GCodeOp::Rapid {
            x: None,
            y: None,
            z: None,
            f: None,
            c: None,
        }
    }

    /// Creates an empty linear move.
    pub fn linear() -> Self {
        GCodeOp::Linear {
            x: None,
            y: None,
            z: None,
            f: None,
            c: None,
        }
    }

    /// Creates an empty arc move in the given direction.
    pub fn arc(dir: ArcDirection) -> Self {
        GCodeOp::Arc {
            dir,
            x: None,
            y: None,
            z: None,
            i: None,
            j: None,
            k: None,
            p: None,
            f: None,
            c: None,
        }
    }

    /// Creates an empty peck drilling cycle.
    pub fn drill() -> Self {
        GCodeOp::DrillCycle {
            x: None,
            y: None,
            z: None,
            r: None,
            l: None,
            q: None,
            f: None,
            c: None,
        }
    }

    /// Creates a tool selection.
    pub fn tool_select(tool: u32) -> Self {
        GCodeOp::ToolSelect {
            tool: Some(tool),
            c: None,
        }
    }

    /// Creates a standalone feed rate command.
    pub fn feed(f: f64) -> Self {
        GCodeOp::Feed { f: Some(f), c: None }
    }

    /// Creates a machine command.
    pub fn machine(code: u32) -> Self {
        GCodeOp::Machine {
            code: Some(code),
            s: None,
            c: None,
        }
    }

    /// Creates a modal G command.
    pub fn modal(code: f64) -> Self {
        GCodeOp::Modal {
            code: Some(code),
            p: None,
            q: None,
            c: None,
        }
    }

    /// Creates a verbatim text block.
    pub fn raw_text(text: impl Into<String>) -> Self {
        GCodeOp::RawText {
            text: text.into(),
            c: None,
        }
    }

    /// Creates a standalone comment.
    pub fn comment(text: impl Into<String>) -> Self {
        GCodeOp::Comment { text: text.into() }
    }

    /// Sets the X coordinate on variants that carry one.
    pub fn x(mut self, v: f64) -> Self {
        match &mut self {
            GCodeOp::Rapid { x, .. }
            | GCodeOp::Linear { x, .. }
            | GCodeOp::Arc { x, .. }
            | GCodeOp::DrillCycle { x, .. } => *x = Some(v),
            _ => {}
        }
        self
    }

    /// Sets the Y coordinate on variants that carry one.
    pub fn y(mut self, v: f64) -> Self {
        match &mut self {
            GCodeOp::Rapid { y, .. }
            | GCodeOp::Linear { y, .. }
            | GCodeOp::Arc { y, .. }
            | GCodeOp::DrillCycle { y, .. } => *y = Some(v),
            _ => {}
        }
        self
    }

    /// Sets the Z coordinate on variants that carry one.
    pub fn z(mut self, v: f64) -> Self {
        match &mut self {
            GCodeOp::Rapid { z, .. }
            | GCodeOp::Linear { z, .. }
            | GCodeOp::Arc { z, .. }
            | GCodeOp::DrillCycle { z, .. } => *z = Some(v),
            _ => {}
        }
        self
    }

    /// Sets the I arc-center offset.
    pub fn i(mut self, v: f64) -> Self {
        if let GCodeOp::Arc { i, .. } = &mut self {
            *i = Some(v);
        }
        self
    }

    /// Sets the J arc-center offset.
    pub fn j(mut self, v: f64) -> Self {
        if let GCodeOp::Arc { j, .. } = &mut self {
            *j = Some(v);
        }
        self
    }

    /// Sets the K arc-center offset.
    pub fn k(mut self, v: f64) -> Self {
        if let GCodeOp::Arc { k, .. } = &mut self {
            *k = Some(v);
        }
        self
    }

    /// Sets the P word (turn count on arcs, tolerance on modal commands).
    pub fn p(mut self, v: f64) -> Self {
        match &mut self {
            GCodeOp::Arc { p, .. } | GCodeOp::Modal { p, .. } => *p = Some(v),
            _ => {}
        }
        self
    }

    /// Sets the Q word (peck increment, modal parameter).
    pub fn q(mut self, v: f64) -> Self {
        match &mut self {
            GCodeOp::DrillCycle { q, .. } | GCodeOp::Modal { q, .. } => *q = Some(v),
            _ => {}
        }
        self
    }

    /// Sets the R word on a drilling cycle.
    pub fn r(mut self, v: f64) -> Self {
        if let GCodeOp::DrillCycle { r, .. } = &mut self {
            *r = Some(v);
        }
        self
    }

    /// Sets the L word on a drilling cycle.
    pub fn l(mut self, v: f64) -> Self {
        if let GCodeOp::DrillCycle { l, .. } = &mut self {
            *l = Some(v);
        }
        self
    }

    /// Sets the feed rate word.
    pub fn f(mut self, v: f64) -> Self {
        match &mut self {
            GCodeOp::Rapid { f, .. }
            | GCodeOp::Linear { f, .. }
            | GCodeOp::Arc { f, .. }
            | GCodeOp::DrillCycle { f, .. }
            | GCodeOp::Feed { f, .. } => *f = Some(v),
            _ => {}
        }
        self
    }

    /// Sets the spindle speed on a machine command.
    pub fn s(mut self, v: f64) -> Self {
        if let GCodeOp::Machine { s, .. } = &mut self {
            *s = Some(v);
        }
        self
    }

    /// Sets the trailing comment.
    pub fn cmt(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            GCodeOp::Rapid { c, .. }
            | GCodeOp::Linear { c, .. }
            | GCodeOp::Arc { c, .. }
            | GCodeOp::DrillCycle { c, .. }
            | GCodeOp::ToolSelect { c, .. }
            | GCodeOp::Feed { c, .. }
            | GCodeOp::Machine { c, .. }
            | GCodeOp::Modal { c, .. }
            | GCodeOp::RawText { c, .. } => *c = Some(text.into()),
            GCodeOp::Comment { .. } => {}
        }
        self
    }

    /// Adds the given offset to every present coordinate.
    ///
    /// Arc center offsets (I/J/K) are relative to the start point and are
    /// left untouched.
    pub fn add_offset(&mut self, dx: f64, dy: f64, dz: f64) {
        match self {
            GCodeOp::Rapid { x, y, z, .. }
            | GCodeOp::Linear { x, y, z, .. }
            | GCodeOp::Arc { x, y, z, .. }
            | GCodeOp::DrillCycle { x, y, z, .. } => {
                if let Some(x) = x {
                    *x += dx;
                }
                if let Some(y) = y {
                    *y += dy;
                }
                if let Some(z) = z {
                    *z += dz;
                }
            }
            _ => {}
        }
    }

    /// Rotates the op about `center` by `angle_deg`.
    ///
    /// A present (x, y) pair rotates about `center`. A present (i, j)
    /// arc-center offset rotates about the origin: the offset is relative
    /// to the start point, so it turns with the path but never receives
    /// the translation. Anything else is a no-op.
    pub fn rotate(&mut self, center: Point, angle_deg: f64) {
        match self {
            GCodeOp::Rapid { x, y, .. }
            | GCodeOp::Linear { x, y, .. }
            | GCodeOp::DrillCycle { x, y, .. } => {
                if let (Some(px), Some(py)) = (*x, *y) {
                    let p = rotate_point(Point::new(px, py), center, angle_deg);
                    *x = Some(p.x);
                    *y = Some(p.y);
                }
            }
            GCodeOp::Arc { x, y, i, j, .. } => {
                if let (Some(px), Some(py)) = (*x, *y) {
                    let p = rotate_point(Point::new(px, py), center, angle_deg);
                    *x = Some(p.x);
                    *y = Some(p.y);
                }
                if let (Some(pi), Some(pj)) = (*i, *j) {
                    let p = rotate_point(Point::new(pi, pj), Point::new(0.0, 0.0), angle_deg);
                    *i = Some(p.x);
                    *j = Some(p.y);
                }
            }
            _ => {}
        }
    }

    /// Negates a present X coordinate (mirror across the Y axis).
    pub fn negate_x(&mut self) {
        match self {
            GCodeOp::Rapid { x, .. }
            | GCodeOp::Linear { x, .. }
            | GCodeOp::Arc { x, .. }
            | GCodeOp::DrillCycle { x, .. } => {
                if let Some(x) = x {
                    *x = -*x;
                }
            }
            _ => {}
        }
    }

    /// Negates a present Y coordinate (mirror across the X axis).
    pub fn negate_y(&mut self) {
        match self {
            GCodeOp::Rapid { y, .. }
            | GCodeOp::Linear { y, .. }
            | GCodeOp::Arc { y, .. }
            | GCodeOp::DrillCycle { y, .. } => {
                if let Some(y) = y {
                    *y = -*y;
                }
            }
            _ => {}
        }
    }

    /// Mirrors the op across both axes (negates any present X and Y).
    pub fn mirror_xy(&mut self) {
        self.negate_x();
        self.negate_y();
    }

    /// Renders the op as a line of G-code.
    pub fn to_gcode(&self) -> String {
        match self {
            GCodeOp::Rapid { x, y, z, f, c } => move_words("G00", *x, *y, *z, *f, c),
            GCodeOp::Linear { x, y, z, f, c } => move_words("G01", *x, *y, *z, *f, c),
            GCodeOp::Arc {
                dir,
                x,
                y,
                z,
                i,
                j,
                k,
                p,
                f,
                c,
            } => {
                let mut g = String::from(match dir {
                    ArcDirection::Cw => "G02",
                    ArcDirection::Ccw => "G03",
                });
                push_word(&mut g, 'X', *x);
                push_word(&mut g, 'Y', *y);
                push_word(&mut g, 'Z', *z);
                push_word(&mut g, 'I', *i);
                push_word(&mut g, 'J', *j);
                push_word(&mut g, 'K', *k);
                push_word(&mut g, 'P', *p);
                push_word(&mut g, 'F', *f);
                push_comment(&mut g, c);
                g
            }
            GCodeOp::DrillCycle {
                x,
                y,
                z,
                r,
                l,
                q,
                f,
                c,
            } => {
                let mut g = String::from("G83");
                push_word(&mut g, 'X', *x);
                push_word(&mut g, 'Y', *y);
                push_word(&mut g, 'Z', *z);
                push_word(&mut g, 'R', *r);
                push_word(&mut g, 'L', *l);
                push_word(&mut g, 'Q', *q);
                push_word(&mut g, 'F', *f);
                push_comment(&mut g, c);
                g
            }
            GCodeOp::ToolSelect { tool, c } => match tool {
                Some(tn) => {
                    let mut g = format!("T{}", tn);
                    push_comment(&mut g, c);
                    g
                }
                None => error_marker('T'),
            },
            GCodeOp::Feed { f, c } => match f {
                Some(f) => {
                    let mut g = format!("F{}", fv(*f));
                    push_comment(&mut g, c);
                    g
                }
                None => error_marker('F'),
            },
            GCodeOp::Machine { code, s, c } => match code {
                Some(code) => {
                    let mut g = format!("M{}", code);
                    if let Some(s) = s {
                        g.push_str(" S");
                        g.push_str(&fv(*s));
                    }
                    push_comment(&mut g, c);
                    g
                }
                None => error_marker('M'),
            },
            GCodeOp::Modal { code, p, q, c } => match code {
                Some(code) => {
                    let mut g = if code.fract() == 0.0 {
                        format!("G{}", *code as i64)
                    } else {
                        format!("G{}", code)
                    };
                    push_word(&mut g, 'P', *p);
                    push_word(&mut g, 'Q', *q);
                    push_comment(&mut g, c);
                    g
                }
                None => error_marker('G'),
            },
            GCodeOp::RawText { text, c } => {
                let mut g = text.clone();
                push_comment(&mut g, c);
                g
            }
            GCodeOp::Comment { text } => format!("( {} )", text),
        }
    }
}

fn push_word(g: &mut String, letter: char, v: Option<f64>) {
    if let Some(v) = v {
        g.push(' ');
        g.push(letter);
        g.push_str(&fv(v));
    }
}

fn push_comment(g: &mut String, c: &Option<String>) {
    if let Some(c) = c {
        g.push_str(&cmt_str(c));
    }
}

fn move_words(
    word: &str,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    f: Option<f64>,
    c: &Option<String>,
) -> String {
    let mut g = String::from(word);
    push_word(&mut g, 'X', x);
    push_word(&mut g, 'Y', y);
    push_word(&mut g, 'Z', z);
    push_word(&mut g, 'F', f);
    push_comment(&mut g, c);
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rapid_field_order_and_format() {
        let op = GCodeOp::rapid().x(1.0).y(-2.5).z(0.125).f(300.0);
        assert_eq!(op.to_gcode(), "G00 X1.0000 Y-2.5000 Z0.1250 F300.0000");
    }

    #[test]
    fn test_absent_fields_not_emitted() {
        let op = GCodeOp::linear().z(-1.0);
        assert_eq!(op.to_gcode(), "G01 Z-1.0000");
    }

    #[test]
    fn test_arc_full_word_order() {
        let op = GCodeOp::arc(ArcDirection::Ccw)
            .x(1.0)
            .y(2.0)
            .z(3.0)
            .i(-1.0)
            .j(0.0)
            .p(2.0)
            .f(100.0);
        assert_eq!(
            op.to_gcode(),
            "G03 X1.0000 Y2.0000 Z3.0000 I-1.0000 J0.0000 P2.0000 F100.0000"
        );
        let op = GCodeOp::arc(ArcDirection::Cw).i(-5.0).j(0.0);
        assert_eq!(op.to_gcode(), "G02 I-5.0000 J0.0000");
    }

    #[test]
    fn test_drill_cycle() {
        let op = GCodeOp::drill().x(1.0).y(2.0).z(-5.0).r(0.0).q(0.5).f(80.0);
        assert_eq!(
            op.to_gcode(),
            "G83 X1.0000 Y2.0000 Z-5.0000 R0.0000 Q0.5000 F80.0000"
        );
    }

    #[test]
    fn test_comment_rendering() {
        let op = GCodeOp::rapid().z(10.0).cmt("To safety height");
        assert_eq!(
            op.to_gcode(),
            "G00 Z10.0000\t\t\t\t\t\t( To safety height )"
        );
        assert_eq!(GCodeOp::comment("hello").to_gcode(), "( hello )");
    }

    #[test]
    fn test_modal_codes() {
        assert_eq!(GCodeOp::modal(61.0).to_gcode(), "G61");
        assert_eq!(GCodeOp::modal(17.1).to_gcode(), "G17.1");
        assert_eq!(GCodeOp::modal(64.0).p(0.05).to_gcode(), "G64 P0.0500");
    }

    #[test]
    fn test_machine_with_spindle_speed() {
        assert_eq!(
            GCodeOp::machine(3).s(12000.0).to_gcode(),
            "M3 S12000.0000"
        );
        assert_eq!(GCodeOp::machine(9).to_gcode(), "M9");
    }

    #[test]
    fn test_missing_mandatory_field_renders_marker() {
        assert_eq!(
            GCodeOp::ToolSelect { tool: None, c: None }.to_gcode(),
            "T!!  ( *** ERROR *** )"
        );
        assert_eq!(
            GCodeOp::Feed { f: None, c: None }.to_gcode(),
            "F!!  ( *** ERROR *** )"
        );
        assert_eq!(
            GCodeOp::Machine {
                code: None,
                s: None,
                c: None
            }
            .to_gcode(),
            "M!!  ( *** ERROR *** )"
        );
        assert_eq!(
            GCodeOp::Modal {
                code: None,
                p: None,
                q: None,
                c: None
            }
            .to_gcode(),
            "G!!  ( *** ERROR *** )"
        );
    }

    #[test]
    fn test_add_offset_skips_absent_and_arc_offsets() {
        let mut op = GCodeOp::arc(ArcDirection::Cw).x(1.0).y(1.0).i(-1.0).j(0.0);
        op.add_offset(10.0, 20.0, 30.0);
        assert_eq!(
            op,
            GCodeOp::arc(ArcDirection::Cw).x(11.0).y(21.0).i(-1.0).j(0.0)
        );

        let mut op = GCodeOp::rapid().z(5.0);
        op.add_offset(10.0, 20.0, 1.0);
        assert_eq!(op.to_gcode(), "G00 Z6.0000");
    }

    #[test]
    fn test_rotate_requires_coordinate_pair() {
        let mut op = GCodeOp::linear().x(10.0);
        op.rotate(Point::new(0.0, 0.0), 90.0);
        // Lone X is left alone; there is no pair to rotate.
        assert_eq!(op.to_gcode(), "G01 X10.0000");
    }

    #[test]
    fn test_rotate_arc_rotates_center_offset_about_origin() {
        let mut op = GCodeOp::arc(ArcDirection::Ccw).x(10.0).y(0.0).i(-10.0).j(0.0);
        op.rotate(Point::new(5.0, 0.0), 90.0);
        if let GCodeOp::Arc { x, y, i, j, .. } = op {
            assert!((x.unwrap() - 5.0).abs() < 1e-9);
            assert!((y.unwrap() - 5.0).abs() < 1e-9);
            // Offset rotates about the origin, not the pivot.
            assert!(i.unwrap().abs() < 1e-9);
            assert!((j.unwrap() - -10.0).abs() < 1e-9);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_offset_then_rotate_differs_from_rotate_then_offset() {
        let base = GCodeOp::arc(ArcDirection::Ccw).x(10.0).y(0.0).i(-10.0).j(0.0);
        let center = Point::new(0.0, 0.0);

        let mut a = base.clone();
        a.add_offset(5.0, 0.0, 0.0);
        a.rotate(center, 90.0);

        let mut b = base.clone();
        b.rotate(center, 90.0);
        b.add_offset(5.0, 0.0, 0.0);

        assert_ne!(a.to_gcode(), b.to_gcode());
        // Offset-then-rotate sweeps the offset into Y; rotate-then-offset
        // leaves it on X. The arc offset turns identically in both.
        assert_eq!(a.to_gcode(), "G03 X0.0000 Y15.0000 I-0.0000 J-10.0000");
        assert_eq!(b.to_gcode(), "G03 X5.0000 Y10.0000 I-0.0000 J-10.0000");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let op = GCodeOp::arc(ArcDirection::Cw)
            .x(1.2345678)
            .y(2.0)
            .i(0.5)
            .j(0.5)
            .f(250.0)
            .cmt("ring");
        assert_eq!(op.to_gcode(), op.to_gcode());
    }
}
