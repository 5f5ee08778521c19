//! Common machining parameters shared by all parametric shapes.
//!
//! Every shape embeds a [`ShapeParameters`] value (composition, not
//! inheritance); the preamble/postamble builders are free functions over
//! it. The base invariant lives here too: generators call it before
//! producing any path so a bad parameter set can never yield a partial
//! program.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;

/// Working plane selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    /// G17
    Xy,
    /// G18
    Zx,
    /// G19
    Yz,
}

impl Plane {
    /// The modal G-code number selecting this plane.
    pub fn code(&self) -> f64 {
        match self {
            Plane::Xy => 17.0,
            Plane::Zx => 18.0,
            Plane::Yz => 19.0,
        }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Plane::Xy
    }
}

/// Cutter compensation mode for outline shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contour {
    /// Tool runs inside the nominal boundary (half a diameter in).
    Inside,
    /// Tool center follows the boundary exactly.
    Exact,
    /// Tool runs outside the nominal boundary (half a diameter out).
    Outside,
}

impl Default for Contour {
    fn default() -> Self {
        Contour::Exact
    }
}

/// The machining parameters common to every shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeParameters {
    /// Tool number
    pub tn: u32,
    /// Tool diameter
    pub td: f64,
    /// Step over, percent of tool diameter
    pub so: f64,
    /// Feed rate at full tool diameter engagement
    pub frtd: f64,
    /// Feed rate at step over engagement
    pub frso: f64,
    /// Feed rate for z plunges
    pub frz: f64,
    /// Spindle speed (rpm)
    pub ss: f64,
    /// Safety height
    pub zsh: f64,
    /// Clearance for the rapid approach towards the workpiece
    pub zsh0: f64,
    /// Cut start height
    pub z0: f64,
    /// Cut stop height
    pub z1: f64,
    /// Z increment per pass
    pub zi: f64,
    /// Object position offset
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,
    /// Center of rotation
    pub rot_x: f64,
    pub rot_y: f64,
    /// Rotation around the center of rotation, degrees
    pub rot_deg: f64,
    /// Working plane
    pub plane: Plane,

    /// User defined preamble g-code
    pub preamble_gcode: String,
    /// Select and change the tool
    pub preamble_tool: bool,
    /// Go to safety height
    pub preamble_zsh: bool,
    /// Select the working plane
    pub preamble_plane: bool,
    /// Start the spindle clockwise
    pub preamble_spindle_cw: bool,
    /// Start the spindle counter clockwise
    pub preamble_spindle_ccw: bool,
    /// Turn on mist coolant
    pub preamble_mist: bool,
    /// Turn on flood coolant
    pub preamble_flood: bool,

    /// User defined postamble g-code
    pub postamble_gcode: String,
    /// Go to safety height
    pub postamble_zsh: bool,
    /// Turn the spindle off
    pub postamble_spindle_off: bool,
    /// Turn all coolant off
    pub postamble_coolant_off: bool,
}

impl Default for ShapeParameters {
    fn default() -> Self {
        Self {
            tn: 1,
            td: 3.0,
            so: 40.0,
            frtd: 300.0,
            frso: 500.0,
            frz: 100.0,
            ss: 12000.0,
            zsh: 10.0,
            zsh0: 2.0,
            z0: 0.0,
            z1: -1.0,
            zi: 0.5,
            pos_x: 0.0,
            pos_y: 0.0,
            pos_z: 0.0,
            rot_x: 0.0,
            rot_y: 0.0,
            rot_deg: 0.0,
            plane: Plane::Xy,
            preamble_gcode: String::new(),
            preamble_tool: true,
            preamble_zsh: true,
            preamble_plane: true,
            preamble_spindle_cw: true,
            preamble_spindle_ccw: false,
            preamble_mist: false,
            preamble_flood: false,
            postamble_gcode: String::new(),
            postamble_zsh: true,
            postamble_spindle_off: true,
            postamble_coolant_off: true,
        }
    }
}

impl ShapeParameters {
    /// Checks the common parameters for plausibility.
    ///
    /// The z bounds and increment must describe a finite descent and the
    /// tool/stepover values must be usable, otherwise the pass loops in
    /// the generators would never terminate.
    pub fn base_parameters_ok(&self) -> bool {
        self.z1 < self.z0
            && self.zi > 0.0
            && self.zsh > 0.0
            && self.tn > 0
            && self.td > 0.0
            && self.so > 0.0
            && self.so <= 100.0
    }
}

/// Builds the default preamble op sequence, each op gated by its flag.
pub fn build_preamble(p: &ShapeParameters) -> Vec<GCodeOp> {
    let mut ol = Vec::new();
    if p.preamble_tool {
        ol.push(GCodeOp::tool_select(p.tn).cmt("Select tool"));
        ol.push(GCodeOp::machine(6).cmt("Tool change"));
    }
    if p.preamble_zsh {
        ol.push(GCodeOp::rapid().z(p.zsh).cmt("To safety height"));
    }
    if p.preamble_plane {
        ol.push(GCodeOp::modal(p.plane.code()).cmt("Select plane"));
    }
    if p.preamble_spindle_cw {
        ol.push(GCodeOp::machine(3).s(p.ss).cmt("Start spindle clockwise"));
    }
    if p.preamble_spindle_ccw {
        ol.push(
            GCodeOp::machine(4)
                .s(p.ss)
                .cmt("Start spindle counter clockwise"),
        );
    }
    if p.preamble_mist {
        ol.push(GCodeOp::machine(7).cmt("Turn mist coolant on"));
    }
    if p.preamble_flood {
        ol.push(GCodeOp::machine(8).cmt("Turn flood coolant on"));
    }
    if !p.preamble_gcode.is_empty() {
        ol.push(GCodeOp::raw_text(p.preamble_gcode.clone()).cmt("User specific preamble"));
    }
    ol
}

/// Builds the default postamble op sequence, the mirror of the preamble.
///
/// Safety height comes first so the coolant and spindle shut down with
/// the tool clear of the workpiece.
pub fn build_postamble(p: &ShapeParameters) -> Vec<GCodeOp> {
    let mut ol = Vec::new();
    if p.postamble_zsh {
        ol.push(GCodeOp::rapid().z(p.zsh).cmt("To safety height"));
    }
    if p.postamble_coolant_off {
        ol.push(GCodeOp::machine(9).cmt("All coolant off"));
    }
    if p.postamble_spindle_off {
        ol.push(GCodeOp::machine(5).cmt("spindle control: stop the spindle"));
    }
    if !p.postamble_gcode.is_empty() {
        ol.push(GCodeOp::raw_text(p.postamble_gcode.clone()).cmt("User specific postamble"));
    }
    ol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_invariant_accepts_defaults() {
        assert!(ShapeParameters::default().base_parameters_ok());
    }

    #[test]
    fn test_base_invariant_rejects_bad_values() {
        let mut p = ShapeParameters::default();
        p.z1 = p.z0; // end depth must be strictly below start depth
        assert!(!p.base_parameters_ok());

        let mut p = ShapeParameters::default();
        p.zi = 0.0;
        assert!(!p.base_parameters_ok());

        let mut p = ShapeParameters::default();
        p.so = 101.0;
        assert!(!p.base_parameters_ok());

        let mut p = ShapeParameters::default();
        p.tn = 0;
        assert!(!p.base_parameters_ok());
    }

    #[test]
    fn test_preamble_order_and_gating() {
        let p = ShapeParameters::default();
        let lines: Vec<String> = build_preamble(&p).iter().map(|o| o.to_gcode()).collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("T1"));
        assert!(lines[1].starts_with("M6"));
        assert!(lines[2].starts_with("G00 Z10.0000"));
        assert!(lines[3].starts_with("G17"));
        assert!(lines[4].starts_with("M3 S12000.0000"));
    }

    #[test]
    fn test_postamble_lifts_before_shutdown() {
        let p = ShapeParameters::default();
        let lines: Vec<String> = build_postamble(&p).iter().map(|o| o.to_gcode()).collect();
        assert!(lines[0].starts_with("G00 Z"));
        assert!(lines[1].starts_with("M9"));
        assert!(lines[2].starts_with("M5"));
    }

    #[test]
    fn test_all_flags_off_yields_empty_amble() {
        let p = ShapeParameters {
            preamble_tool: false,
            preamble_zsh: false,
            preamble_plane: false,
            preamble_spindle_cw: false,
            ..Default::default()
        };
        assert!(build_preamble(&p).is_empty());
    }
}
