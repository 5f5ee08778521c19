//! Free-form G-code block.

use serde::{Deserialize, Serialize};
use shapekit_core::gcode::GCodeOp;

use crate::params::ShapeParameters;

use super::NcShape;

/// A verbatim text block inserted into the program untouched.
///
/// Carries no machining parameters; the program's default preamble and
/// postamble objects are instances of this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCode {
    pub object_name: String,
    /// The text emitted verbatim.
    pub text: String,
}

impl CustomCode {
    pub fn new() -> Self {
        Self {
            object_name: String::new(),
            text: "( Add your g-code... )".to_string(),
        }
    }
}

impl Default for CustomCode {
    fn default() -> Self {
        Self::new()
    }
}

impl NcShape for CustomCode {
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
        true
    }

    fn update(&self) -> Vec<GCodeOp> {
        vec![GCodeOp::raw_text(self.text.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emits_text_verbatim() {
        let mut cc = CustomCode::new();
        cc.set_object_name("Preamble".to_string());
        cc.text = "G21\nG90".to_string();
        let g = cc.gcode();
        assert_eq!(g, "( Preamble )\nG21\nG90\n\n");
    }
}
