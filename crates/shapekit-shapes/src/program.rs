//! Program assembly and the change-tracking recomputation cache.
//!
//! Each shape instance is wrapped in a [`CachedShape`] that memoizes the
//! rendered text together with a snapshot of the generation inputs (the
//! shape's persisted field values, not its ops). A text request compares
//! the current values against the snapshot and only re-runs the
//! generator on a difference; the host drives recomputation explicitly
//! through [`Program::refresh`] or the text getters - the core owns no
//! timers.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::defaults::Defaults;
use crate::shapes::{NcShape, ShapeInstance, ShapeKind};

/// Fallback preamble text when the host supplies none.
pub const PREAMBLE_DEFAULT: &str = "G17\t( set xy-plane )\nG21\t( units: millimeters )\nG94\t( feed rate mode: units per minute )\nG61\t( Exact path mode )\nG90\t( distance mode )\nF1000\t( feed rate )";

/// Fallback postamble text when the host supplies none.
pub const POSTAMBLE_DEFAULT: &str = "M5\t( spindle control: stop the spindle )\nM9\t( coolant control: turn all coolant off )\nM2\t( end program )";

/// Wraps one shape and memoizes its rendered G-code.
#[derive(Debug, Clone)]
pub struct CachedShape<S> {
    shape: S,
    text: String,
    snapshot: String,
}

impl<S: NcShape + Serialize> CachedShape<S> {
    /// Wraps a shape and renders it once.
    pub fn new(shape: S) -> Self {
        let text = shape.gcode();
        let snapshot = Self::snapshot_of(&shape);
        Self {
            shape,
            text,
            snapshot,
        }
    }

    /// Serializes the generation inputs in a fixed field order.
    fn snapshot_of(shape: &S) -> String {
        serde_json::to_string(shape).unwrap_or_default()
    }

    /// Read access to the wrapped shape.
    pub fn shape(&self) -> &S {
        &self.shape
    }

    /// Mutable access to the wrapped shape. The next text request picks
    /// up any change through the snapshot comparison.
    pub fn shape_mut(&mut self) -> &mut S {
        &mut self.shape
    }

    /// Returns the shape's G-code, recomputing only when the parameter
    /// snapshot differs or `recalculate` forces it.
    pub fn gcode(&mut self, recalculate: bool) -> &str {
        if recalculate {
            self.text = self.shape.gcode();
            self.snapshot = Self::snapshot_of(&self.shape);
        } else {
            let current = Self::snapshot_of(&self.shape);
            if current != self.snapshot {
                debug!("Recomputing {}", self.shape.object_name());
                self.text = self.shape.gcode();
                self.snapshot = current;
            }
        }
        &self.text
    }
}

/// An ordered list of cached shape instances forming one G-code program.
#[derive(Debug)]
pub struct Program {
    /// Project name, written into the header comment block.
    pub name: String,
    objects: Vec<CachedShape<ShapeInstance>>,
    defaults: Defaults,
    counters: HashMap<&'static str, u32>,
}

impl Program {
    /// Creates a program seeded with the default preamble and postamble
    /// text objects.
    pub fn new(name: impl Into<String>, defaults: Defaults) -> Self {
        let mut program = Self {
            name: name.into(),
            objects: Vec::new(),
            defaults,
            counters: HashMap::new(),
        };
        program.init_ambles(PREAMBLE_DEFAULT, POSTAMBLE_DEFAULT);
        program
    }

    /// Creates a program with host-supplied preamble/postamble text.
    pub fn with_ambles(
        name: impl Into<String>,
        defaults: Defaults,
        preamble: &str,
        postamble: &str,
    ) -> Self {
        let mut program = Self {
            name: name.into(),
            objects: Vec::new(),
            defaults,
            counters: HashMap::new(),
        };
        program.init_ambles(preamble, postamble);
        program
    }

    fn init_ambles(&mut self, preamble: &str, postamble: &str) {
        let idx = self.create_shape(ShapeKind::CustomCode, None);
        if let ShapeInstance::CustomCode(cc) = self.objects[idx].shape_mut() {
            cc.object_name = "Preamble".to_string();
            cc.text = preamble.to_string();
        }
        let idx = self.create_shape(ShapeKind::CustomCode, Some(idx));
        if let ShapeInstance::CustomCode(cc) = self.objects[idx].shape_mut() {
            cc.object_name = "Postamble".to_string();
            cc.text = postamble.to_string();
        }
    }

    /// The next default object name for a kind: `<Kind>_<n>`.
    fn next_name(&mut self, kind: ShapeKind) -> String {
        let n = self.counters.entry(kind.name()).or_insert(0);
        *n += 1;
        format!("{}_{}", kind.name(), n)
    }

    /// Creates a shape of the given kind from the defaults table and
    /// inserts it after `after` (or appends). Returns its index.
    pub fn create_shape(&mut self, kind: ShapeKind, after: Option<usize>) -> usize {
        let mut shape = ShapeInstance::new(kind, &self.defaults);
        shape.set_object_name(self.next_name(kind));
        let index = match after {
            Some(i) if i + 1 <= self.objects.len() => i + 1,
            _ => self.objects.len(),
        };
        self.objects.insert(index, CachedShape::new(shape));
        index
    }

    /// Duplicates the shape at `index`, inserting the copy right after
    /// it under a fresh name. Returns the copy's index.
    pub fn duplicate(&mut self, index: usize) -> Option<usize> {
        let kind = self.objects.get(index)?.shape().kind();
        let mut copy = self.objects[index].shape().clone();
        copy.set_object_name(self.next_name(kind));
        self.objects.insert(index + 1, CachedShape::new(copy));
        Some(index + 1)
    }

    /// Deletes the shape at `index`.
    pub fn delete(&mut self, index: usize) {
        if index < self.objects.len() {
            self.objects.remove(index);
        }
    }

    /// Moves the shape at `index` one slot up. Returns the new index.
    pub fn move_up(&mut self, index: usize) -> usize {
        if index > 0 && index < self.objects.len() {
            self.objects.swap(index - 1, index);
            index - 1
        } else {
            index
        }
    }

    /// Moves the shape at `index` one slot down. Returns the new index.
    pub fn move_down(&mut self, index: usize) -> usize {
        if index + 1 < self.objects.len() {
            self.objects.swap(index, index + 1);
            index + 1
        } else {
            index
        }
    }

    /// Deletes every object and re-seeds the default ambles.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.counters.clear();
        self.init_ambles(PREAMBLE_DEFAULT, POSTAMBLE_DEFAULT);
    }

    /// Number of objects in the program.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the program holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The shape at `index`.
    pub fn shape(&self, index: usize) -> Option<&ShapeInstance> {
        self.objects.get(index).map(|o| o.shape())
    }

    /// Mutable access to the shape at `index`.
    pub fn shape_mut(&mut self, index: usize) -> Option<&mut ShapeInstance> {
        self.objects.get_mut(index).map(|o| o.shape_mut())
    }

    /// Iterates over all shapes mutably, e.g. to re-attach fonts and
    /// subroutine bodies after a project load.
    pub fn shapes_mut(&mut self) -> impl Iterator<Item = &mut ShapeInstance> {
        self.objects.iter_mut().map(|o| o.shape_mut())
    }

    /// The object names in program order.
    pub fn object_names(&self) -> Vec<String> {
        self.objects
            .iter()
            .map(|o| o.shape().object_name().to_string())
            .collect()
    }

    /// Refreshes every cache entry, recomputing where parameters changed.
    /// The host calls this on its own schedule.
    pub fn refresh(&mut self) {
        for o in &mut self.objects {
            o.gcode(false);
        }
    }

    fn header(&self) -> String {
        let mut g = format!("( Project: {} )\n", self.name);
        g.push_str(&format!(
            "( Date: {} )\n",
            chrono::Local::now().date_naive()
        ));
        g.push_str(&format!(
            "( Generator: shapekit v{} )\n\n",
            env!("CARGO_PKG_VERSION")
        ));
        g
    }

    /// The complete program text: header comment block plus every
    /// object's rendered G-code in program order.
    pub fn gcode(&mut self, recalculate: bool) -> String {
        let mut g = self.header();
        for o in &mut self.objects {
            g.push_str(o.gcode(recalculate));
        }
        g
    }

    /// Program text restricted to the given object indexes.
    pub fn gcode_selection(&mut self, indexes: &[usize], recalculate: bool) -> String {
        let mut g = self.header();
        for &i in indexes {
            if let Some(o) = self.objects.get_mut(i) {
                g.push_str(o.gcode(recalculate));
            }
        }
        g
    }

    /// Writes the complete program text to a file.
    pub fn save_gcode(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.gcode(false);
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write g-code file {}", path.display()))
    }

    /// Serializes the shape list (pure data, no cache state).
    pub fn save_project(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let shapes: Vec<&ShapeInstance> = self.objects.iter().map(|o| o.shape()).collect();
        let text = serde_json::to_string_pretty(&shapes)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write project file {}", path.display()))
    }

    /// Loads a shape list, replacing the current objects. Name counters
    /// advance past the loaded names so future defaults stay unique.
    /// Fonts and subroutine bodies must be re-attached by the host.
    pub fn load_project(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file {}", path.display()))?;
        let shapes: Vec<ShapeInstance> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse project file {}", path.display()))?;
        self.objects.clear();
        self.counters.clear();
        for shape in shapes {
            self.bump_counter(&shape);
            self.objects.push(CachedShape::new(shape));
        }
        Ok(())
    }

    /// Advances the name counter for a loaded shape's kind past its
    /// numeric suffix, if it carries one.
    fn bump_counter(&mut self, shape: &ShapeInstance) {
        let kind = shape.kind();
        if let Some(suffix) = shape
            .object_name()
            .strip_prefix(kind.name())
            .and_then(|s| s.strip_prefix('_'))
        {
            if let Ok(n) = suffix.parse::<u32>() {
                let c = self.counters.entry(kind.name()).or_insert(0);
                *c = (*c).max(n);
            }
        }
    }
}
