//! Parametric shape generators.
//!
//! One module per shape kind. Every shape implements [`NcShape`]: a
//! validity check plus an `update` producing the ordered op list for one
//! complete machining of the shape. Rendering (offset, rotation, comment
//! framing) is shared by the trait's provided `gcode` method.

pub mod bezel;
pub mod counterbore;
pub mod custom_code;
pub mod drill_matrix;
pub mod grill;
pub mod outline_circle;
pub mod outline_circular_arc;
pub mod outline_ellipse;
pub mod outline_polygon;
pub mod outline_rectangle;
pub mod pocket_circle;
pub mod pocket_circular_arc;
pub mod pocket_rectangle;
pub mod slot;
pub mod subroutine_call;
pub mod text;

pub use bezel::Bezel;
pub use counterbore::Counterbore;
pub use custom_code::CustomCode;
pub use drill_matrix::DrillMatrix;
pub use grill::{Grill, GrillShape};
pub use outline_circle::OutlineCircle;
pub use outline_circular_arc::OutlineCircularArc;
pub use outline_ellipse::OutlineEllipse;
pub use outline_polygon::{CutterComp, OutlinePolygon};
pub use outline_rectangle::OutlineRectangle;
pub use pocket_circle::PocketCircle;
pub use pocket_circular_arc::PocketCircularArc;
pub use pocket_rectangle::PocketRectangle;
pub use slot::Slot;
pub use subroutine_call::SubroutineCall;
pub use text::Text;

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;
use shapekit_core::math::Point;

use crate::defaults::Defaults;
use crate::params::ShapeParameters;

/// The sentinel emitted instead of a path when validation fails.
///
/// Callers must treat this as terminal: no postamble follows it.
pub(crate) fn parameter_error() -> Vec<GCodeOp> {
    vec![GCodeOp::comment("PARAMETER ERROR")]
}

/// Contract implemented by every parametric shape.
pub trait NcShape {
    /// The shape's unique object name within its program.
    fn object_name(&self) -> &str;

    /// Renames the shape.
    fn set_object_name(&mut self, name: String);

    /// The common machining parameters, when the shape carries them.
    /// Text-only kinds (custom code, subroutine call) return `None`.
    fn parameters(&self) -> Option<&ShapeParameters>;

    /// Mutable access to the common machining parameters.
    fn parameters_mut(&mut self) -> Option<&mut ShapeParameters>;

    /// Checks the shape-specific fields and the common parameter
    /// invariant. `update` degrades to the error sentinel when false.
    fn parameters_ok(&self) -> bool;

    /// Calculates the complete op sequence for this shape.
    fn update(&self) -> Vec<GCodeOp>;

    /// Renders the shape as G-code text: positional offset, then rotation
    /// about the configured pivot, then one line per op framed by the
    /// object name comment and a trailing blank line.
    fn gcode(&self) -> String {
        let mut ops = self.update();
        if let Some(p) = self.parameters() {
            for op in &mut ops {
                op.add_offset(p.pos_x, p.pos_y, p.pos_z);
            }
            for op in &mut ops {
                op.rotate(Point::new(p.rot_x, p.rot_y), p.rot_deg);
            }
        }
        let mut out = format!("( {} )\n", self.object_name());
        for op in &ops {
            out.push_str(&op.to_gcode());
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// Discriminant for the shape catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    CustomCode,
    OutlineRectangle,
    OutlineCircle,
    OutlineCircularArc,
    OutlineEllipse,
    OutlinePolygon,
    PocketRectangle,
    PocketCircle,
    PocketCircularArc,
    Slot,
    DrillMatrix,
    Grill,
    Bezel,
    Text,
    Subroutine,
    Counterbore,
}

impl ShapeKind {
    /// Every shape kind, in catalogue order.
    pub const ALL: [ShapeKind; 16] = [
        ShapeKind::CustomCode,
        ShapeKind::OutlineRectangle,
        ShapeKind::OutlineCircle,
        ShapeKind::OutlineCircularArc,
        ShapeKind::OutlineEllipse,
        ShapeKind::OutlinePolygon,
        ShapeKind::PocketRectangle,
        ShapeKind::PocketCircle,
        ShapeKind::PocketCircularArc,
        ShapeKind::Slot,
        ShapeKind::DrillMatrix,
        ShapeKind::Grill,
        ShapeKind::Bezel,
        ShapeKind::Text,
        ShapeKind::Subroutine,
        ShapeKind::Counterbore,
    ];

    /// The catalogue name of this kind, used for default object names.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::CustomCode => "CustomCode",
            ShapeKind::OutlineRectangle => "OutlineRectangle",
            ShapeKind::OutlineCircle => "OutlineCircle",
            ShapeKind::OutlineCircularArc => "OutlineCircularArc",
            ShapeKind::OutlineEllipse => "OutlineEllipse",
            ShapeKind::OutlinePolygon => "OutlinePolygon",
            ShapeKind::PocketRectangle => "PocketRectangle",
            ShapeKind::PocketCircle => "PocketCircle",
            ShapeKind::PocketCircularArc => "PocketCircularArc",
            ShapeKind::Slot => "Slot",
            ShapeKind::DrillMatrix => "DrillMatrix",
            ShapeKind::Grill => "Grill",
            ShapeKind::Bezel => "Bezel",
            ShapeKind::Text => "Text",
            ShapeKind::Subroutine => "Subroutine",
            ShapeKind::Counterbore => "Counterbore",
        }
    }

    /// One-line description for pickers and logs.
    pub fn description(&self) -> &'static str {
        match self {
            ShapeKind::CustomCode => "Individual g-code or text",
            ShapeKind::OutlineRectangle => "Outline a rectangle",
            ShapeKind::OutlineCircle => "Outline a circle",
            ShapeKind::OutlineCircularArc => "Outlining a circular arc",
            ShapeKind::OutlineEllipse => "Outline an ellipse",
            ShapeKind::OutlinePolygon => "Cut along a polygon path",
            ShapeKind::PocketRectangle => "Pocketing a rectangle",
            ShapeKind::PocketCircle => "Pocketing a circle",
            ShapeKind::PocketCircularArc => "Pocketing a circular arc",
            ShapeKind::Slot => "Pocketing a slot",
            ShapeKind::DrillMatrix => "Drilling a matrix",
            ShapeKind::Grill => "Drilling a grill",
            ShapeKind::Bezel => "Engraving a bezel",
            ShapeKind::Text => "Engrave text",
            ShapeKind::Subroutine => "NGC subroutine",
            ShapeKind::Counterbore => "Counterbore",
        }
    }
}

/// A shape instance: the discriminated union over all 16 shape kinds.
///
/// The serialized form is the persisted project state: kind tag, common
/// parameters, shape-specific fields. Loaded resources (fonts,
/// subroutine bodies) are skipped and re-attached by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ShapeInstance {
    CustomCode(CustomCode),
    OutlineRectangle(OutlineRectangle),
    OutlineCircle(OutlineCircle),
    OutlineCircularArc(OutlineCircularArc),
    OutlineEllipse(OutlineEllipse),
    OutlinePolygon(OutlinePolygon),
    PocketRectangle(PocketRectangle),
    PocketCircle(PocketCircle),
    PocketCircularArc(PocketCircularArc),
    Slot(Slot),
    DrillMatrix(DrillMatrix),
    Grill(Grill),
    Bezel(Bezel),
    Text(Text),
    Subroutine(SubroutineCall),
    Counterbore(Counterbore),
}

impl ShapeInstance {
    /// Creates a shape of the given kind seeded from the defaults table.
    pub fn new(kind: ShapeKind, defaults: &Defaults) -> Self {
        let p = defaults.parameters.clone();
        match kind {
            ShapeKind::CustomCode => ShapeInstance::CustomCode(CustomCode::new()),
            ShapeKind::OutlineRectangle => {
                ShapeInstance::OutlineRectangle(OutlineRectangle::new(p))
            }
            ShapeKind::OutlineCircle => ShapeInstance::OutlineCircle(OutlineCircle::new(p)),
            ShapeKind::OutlineCircularArc => {
                ShapeInstance::OutlineCircularArc(OutlineCircularArc::new(p))
            }
            ShapeKind::OutlineEllipse => ShapeInstance::OutlineEllipse(OutlineEllipse::new(p)),
            ShapeKind::OutlinePolygon => ShapeInstance::OutlinePolygon(OutlinePolygon::new(p)),
            ShapeKind::PocketRectangle => {
                ShapeInstance::PocketRectangle(PocketRectangle::new(p))
            }
            ShapeKind::PocketCircle => ShapeInstance::PocketCircle(PocketCircle::new(p)),
            ShapeKind::PocketCircularArc => {
                ShapeInstance::PocketCircularArc(PocketCircularArc::new(p))
            }
            ShapeKind::Slot => ShapeInstance::Slot(Slot::new(p)),
            ShapeKind::DrillMatrix => ShapeInstance::DrillMatrix(DrillMatrix::new(p)),
            ShapeKind::Grill => ShapeInstance::Grill(Grill::new(p)),
            ShapeKind::Bezel => ShapeInstance::Bezel(Bezel::new(p)),
            ShapeKind::Text => ShapeInstance::Text(Text::new(p)),
            ShapeKind::Subroutine => ShapeInstance::Subroutine(SubroutineCall::new()),
            ShapeKind::Counterbore => ShapeInstance::Counterbore(Counterbore::new(p)),
        }
    }

    /// The kind discriminant of this instance.
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeInstance::CustomCode(_) => ShapeKind::CustomCode,
            ShapeInstance::OutlineRectangle(_) => ShapeKind::OutlineRectangle,
            ShapeInstance::OutlineCircle(_) => ShapeKind::OutlineCircle,
            ShapeInstance::OutlineCircularArc(_) => ShapeKind::OutlineCircularArc,
            ShapeInstance::OutlineEllipse(_) => ShapeKind::OutlineEllipse,
            ShapeInstance::OutlinePolygon(_) => ShapeKind::OutlinePolygon,
            ShapeInstance::PocketRectangle(_) => ShapeKind::PocketRectangle,
            ShapeInstance::PocketCircle(_) => ShapeKind::PocketCircle,
            ShapeInstance::PocketCircularArc(_) => ShapeKind::PocketCircularArc,
            ShapeInstance::Slot(_) => ShapeKind::Slot,
            ShapeInstance::DrillMatrix(_) => ShapeKind::DrillMatrix,
            ShapeInstance::Grill(_) => ShapeKind::Grill,
            ShapeInstance::Bezel(_) => ShapeKind::Bezel,
            ShapeInstance::Text(_) => ShapeKind::Text,
            ShapeInstance::Subroutine(_) => ShapeKind::Subroutine,
            ShapeInstance::Counterbore(_) => ShapeKind::Counterbore,
        }
    }
}

macro_rules! for_each_shape {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            ShapeInstance::CustomCode($s) => $body,
            ShapeInstance::OutlineRectangle($s) => $body,
            ShapeInstance::OutlineCircle($s) => $body,
            ShapeInstance::OutlineCircularArc($s) => $body,
            ShapeInstance::OutlineEllipse($s) => $body,
            ShapeInstance::OutlinePolygon($s) => $body,
            ShapeInstance::PocketRectangle($s) => $body,
            ShapeInstance::PocketCircle($s) => $body,
            ShapeInstance::PocketCircularArc($s) => $body,
            ShapeInstance::Slot($s) => $body,
            ShapeInstance::DrillMatrix($s) => $body,
            ShapeInstance::Grill($s) => $body,
            ShapeInstance::Bezel($s) => $body,
            ShapeInstance::Text($s) => $body,
            ShapeInstance::Subroutine($s) => $body,
            ShapeInstance::Counterbore($s) => $body,
        }
    };
}

impl NcShape for ShapeInstance {
    fn object_name(&self) -> &str {
        for_each_shape!(self, s => s.object_name())
    }

    fn set_object_name(&mut self, name: String) {
        for_each_shape!(self, s => s.set_object_name(name))
    }

    fn parameters(&self) -> Option<&ShapeParameters> {
        for_each_shape!(self, s => s.parameters())
    }

    fn parameters_mut(&mut self) -> Option<&mut ShapeParameters> {
        for_each_shape!(self, s => s.parameters_mut())
    }

    fn parameters_ok(&self) -> bool {
        for_each_shape!(self, s => s.parameters_ok())
    }

    fn update(&self) -> Vec<GCodeOp> {
        for_each_shape!(self, s => s.update())
    }
}
