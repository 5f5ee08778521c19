//! # ShapeKit Core
//!
//! Core types for ShapeKit: the G-code primitive operation model, the
//! geometric helper kernel, and the error taxonomy shared by the
//! resource loaders.

pub mod error;
pub mod gcode;
pub mod math;

pub use error::{Error, FontError, Result, SubroutineError};
pub use gcode::{ArcDirection, GCodeOp};
pub use math::{
    arc_angle, arc_length, ellipse_point, point_on_line, rotate_point, Point,
};
