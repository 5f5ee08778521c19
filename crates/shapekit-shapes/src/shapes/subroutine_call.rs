//! NGC subroutine insertion.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;

use crate::params::ShapeParameters;
use crate::subroutine::SubroutineHandle;

use super::{parameter_error, NcShape};

/// Inserts an externally loaded subroutine: optionally its body, then a
/// call statement built from the ordered, non-blank value list.
///
/// Carries no machining parameters; the subroutine body is opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubroutineCall {
    pub object_name: String,
    /// Name of the subroutine this shape was bound to, for re-attachment
    pub sub_name: String,
    /// Values passed to the call, in parameter order; blanks are skipped
    pub values: Vec<String>,
    /// Include the subroutine body before the call
    pub include_body: bool,
    /// The loaded subroutine; re-attached by the host after
    /// deserialization
    #[serde(skip)]
    pub sub: Option<SubroutineHandle>,
}

impl SubroutineCall {
    pub fn new() -> Self {
        Self {
            object_name: String::new(),
            sub_name: String::new(),
            values: Vec::new(),
            include_body: true,
            sub: None,
        }
    }

    /// Attaches a loaded subroutine handle.
    pub fn set_subroutine(&mut self, sub: SubroutineHandle) {
        self.sub_name = sub.name.clone();
        self.sub = Some(sub);
    }
}

impl Default for SubroutineCall {
    fn default() -> Self {
        Self::new()
    }
}

impl NcShape for SubroutineCall {
    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn set_object_name(&mut self, name: String) {
        self.object_name = name;
    }

    fn parameters(&self) -> Option<&ShapeParameters> {
        None
    }

    fn parameters_mut(&mut self) -> Option<&mut ShapeParameters> {
        None
    }

    fn parameters_ok(&self) -> bool {
        self.sub.is_some()
    }

    fn update(&self) -> Vec<GCodeOp> {
        if !self.parameters_ok() {
            return parameter_error();
        }
        let sub = self.sub.as_ref().expect("checked by parameters_ok");

        let mut command = format!("o<{}> CALL", sub.name);
        for v in &self.values {
            if !v.is_empty() {
                command.push_str(&format!(" [{}]", v));
            }
        }

        let mut ol = Vec::new();
        if self.include_body {
            ol.push(GCodeOp::raw_text(sub.code.clone()));
        }
        ol.push(GCodeOp::raw_text(command));
        ol
    }
}
