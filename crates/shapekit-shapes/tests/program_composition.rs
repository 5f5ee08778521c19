//! End-to-end program assembly: composition order, cache behavior, and
//! the serialized round-trip of every shape kind.

use std::sync::Arc;

use shapekit_shapes::shapes::{NcShape, ShapeInstance, ShapeKind};
use shapekit_shapes::{font, Defaults, Program};

fn fixture_font() -> Arc<font::Font> {
    let text = "\
# Version: 1\n\
# WordSpacing: 4\n\
\n\
[A] 1\n\
L 0,0,2,6\n\
L 2,6,4,0\n\
\n";
    Arc::new(font::parse_font(text, 10.0, "fixture").unwrap())
}

#[test]
fn program_renders_instances_in_order() {
    let mut p = Program::new("panel.sgg", Defaults::default());
    let slot = p.create_shape(ShapeKind::Slot, Some(0));
    let grill = p.create_shape(ShapeKind::Grill, Some(slot));
    let text = p.create_shape(ShapeKind::Text, Some(grill));
    if let Some(ShapeInstance::Text(t)) = p.shape_mut(text) {
        t.set_font(fixture_font(), "fixture.cxf");
        t.text = "A".to_string();
    }

    let g = p.gcode(false);
    let order: Vec<usize> = ["( Preamble )", "( Slot_1 )", "( Grill_1 )", "( Text_1 )", "( Postamble )"]
        .iter()
        .map(|tag| g.find(tag).unwrap())
        .collect();
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(order, sorted);
}

#[test]
fn program_header_names_project() {
    let mut p = Program::new("panel.sgg", Defaults::default());
    let g = p.gcode(false);
    assert!(g.starts_with("( Project: panel.sgg )\n( Date: "));
}

#[test]
fn unattached_resources_degrade_to_sentinel_not_failure() {
    let mut p = Program::new("panel.sgg", Defaults::default());
    p.create_shape(ShapeKind::Text, Some(0));
    p.create_shape(ShapeKind::Subroutine, Some(1));
    let g = p.gcode(false);
    // Both instances fail, the document is still complete.
    assert_eq!(g.matches("( PARAMETER ERROR )").count(), 2);
    assert!(g.contains("( Postamble )"));
}

#[test]
fn refresh_tracks_mutations() {
    let mut p = Program::new("panel.sgg", Defaults::default());
    let i = p.create_shape(ShapeKind::Slot, Some(0));
    let before = p.gcode(false);

    if let Some(ShapeInstance::Slot(s)) = p.shape_mut(i) {
        s.dx = 75.0;
    }
    p.refresh();
    let after = p.gcode(false);
    assert_ne!(before, after);
    assert!(after.contains("X75.0000"));
}

#[test]
fn every_kind_roundtrips_through_project_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all_kinds.json");

    let mut p = Program::new("all.sgg", Defaults::default());
    for kind in ShapeKind::ALL {
        p.create_shape(kind, None);
    }
    assert_eq!(p.len(), 2 + 16);
    p.save_project(&path).unwrap();

    let mut q = Program::new("all.sgg", Defaults::default());
    q.load_project(&path).unwrap();
    assert_eq!(q.len(), 2 + 16);
    assert_eq!(p.object_names(), q.object_names());

    // The persisted state is pure data: re-rendering both programs with
    // the same (detached) resources yields identical text.
    assert_eq!(p.gcode(true), q.gcode(true));
}

#[test]
fn kind_discriminant_survives_roundtrip() {
    let mut p = Program::new("all.sgg", Defaults::default());
    for kind in ShapeKind::ALL {
        p.create_shape(kind, None);
    }
    let shapes: Vec<&ShapeInstance> = (0..p.len()).map(|i| p.shape(i).unwrap()).collect();
    let json = serde_json::to_string(&shapes).unwrap();
    let back: Vec<ShapeInstance> = serde_json::from_str(&json).unwrap();
    for (orig, loaded) in shapes.iter().zip(&back) {
        assert_eq!(orig.kind(), loaded.kind());
        assert_eq!(orig.object_name(), loaded.object_name());
    }
}

#[test]
fn selection_and_full_render_agree() {
    let mut p = Program::new("panel.sgg", Defaults::default());
    let i = p.create_shape(ShapeKind::Bezel, Some(0));
    let full = p.gcode(false);
    let selection = p.gcode_selection(&[i], false);
    // The selected instance's block is identical in both renders.
    let block_start = full.find("( Bezel_1 )").unwrap();
    let block_end = full[block_start..].find("\n\n").unwrap() + block_start;
    assert!(selection.contains(&full[block_start..block_end]));
}
