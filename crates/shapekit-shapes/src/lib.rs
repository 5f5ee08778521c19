//! # ShapeKit Shapes
//!
//! The parametric shape catalogue and program assembly for ShapeKit:
//! common machining parameters with preamble/postamble builders, one
//! generator per shape kind, the shared ring-spiral pocketing routine,
//! the stroke-font and subroutine loaders, and the change-tracking cache
//! that turns mutable shape parameters into memoized program text.

pub mod defaults;
pub mod font;
pub mod params;
pub mod pocketing;
pub mod program;
pub mod shapes;
pub mod subroutine;

pub use defaults::Defaults;
pub use font::{Font, FontHandle, Glyph, Stroke};
pub use params::{build_postamble, build_preamble, Contour, Plane, ShapeParameters};
pub use pocketing::pocket_circle;
pub use program::{CachedShape, Program, POSTAMBLE_DEFAULT, PREAMBLE_DEFAULT};
pub use shapes::{
    Bezel, Counterbore, CustomCode, CutterComp, DrillMatrix, Grill, GrillShape, NcShape,
    OutlineCircle, OutlineCircularArc, OutlineEllipse, OutlinePolygon, OutlineRectangle,
    PocketCircle, PocketCircularArc, PocketRectangle, ShapeInstance, ShapeKind, Slot,
    SubroutineCall, Text,
};
pub use subroutine::{SubParam, Subroutine, SubroutineHandle};
