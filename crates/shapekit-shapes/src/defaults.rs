//! Default parameter table.
//!
//! New shape instances are seeded from a [`Defaults`] value. The host
//! decides where the table comes from; a JSON file loader is provided
//! for convenience and falls back to the built-in defaults when the file
//! is missing or unreadable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::params::ShapeParameters;

/// The default-parameter table applied to newly created shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Common machining parameters seeded into every new shape.
    pub parameters: ShapeParameters,
}

impl Defaults {
    /// Loads a defaults table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read defaults file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse defaults file {}", path.display()))
    }

    /// Loads a defaults table, falling back to the built-in values.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(d) => d,
            Err(e) => {
                warn!(
                    "Using built-in defaults, could not load {}: {e:#}",
                    path.as_ref().display()
                );
                Self::default()
            }
        }
    }

    /// Writes the defaults table to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write defaults file {}", path.display()))
    }
}
