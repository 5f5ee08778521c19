//! Ring-spiral pocketing, shared by the circular pocket shapes.
//!
//! Clears an annular (or full) circular area around the origin. Two
//! regimes:
//!
//! - inner radius < outer radius: at each z level the innermost ring is
//!   entered with a helical arc to depth, then the rings step outward by
//!   `dr` (the last step clamped to land exactly on the outer radius),
//!   each connected by a short radial feed; a finishing lap runs at the
//!   outer radius.
//! - inner radius >= outer radius (slot-like bore): a single multi-turn
//!   spiral arc descends to the final depth using the arc turn-count
//!   word, followed by one finishing circle.

use shapekit_core::gcode::{ArcDirection, GCodeOp};

/// Generates the op list for a ring-spiral pocket at the origin.
///
/// `dir` selects climb vs. conventional (G02/G03), `z0`/`z1`/`zi` the
/// z pass ladder, `ri`/`ra` the inner/outer milling radii (already
/// compensated for the tool), `dr` the radial step, `frtd`/`frso` the
/// feed rates at full-diameter and stepover engagement.
#[allow(clippy::too_many_arguments)]
pub fn pocket_circle(
    dir: ArcDirection,
    z0: f64,
    z1: f64,
    zi: f64,
    ri: f64,
    ra: f64,
    dr: f64,
    frtd: f64,
    frso: f64,
) -> Vec<GCodeOp> {
    let mut ol = Vec::new();
    if ri >= ra {
        let turns = ((z1 - z0) / zi).abs().ceil();
        ol.push(GCodeOp::linear().x(ra).y(0.0).f(frtd));
        ol.push(GCodeOp::modal(64.0));
        ol.push(
            GCodeOp::arc(dir)
                .x(ra)
                .y(0.0)
                .z(z1)
                .i(-ra)
                .j(0.0)
                .p(turns)
                .f(frso),
        );
        ol.push(GCodeOp::arc(dir).x(ra).y(0.0).i(-ra).j(0.0).f(frso));
    } else {
        let mut z = z0;
        while z > z1 {
            z -= zi;
            if z < z1 {
                z = z1;
            }
            let mut r = ri - dr;
            let mut spiral_in = true;
            while r < ra {
                r += dr;
                if r > ra {
                    r = ra;
                }
                if spiral_in {
                    ol.push(GCodeOp::linear().x(r).y(0.0).f(frtd));
                    ol.push(GCodeOp::modal(64.0));
                    ol.push(GCodeOp::arc(dir).x(r).y(0.0).z(z).i(-r).j(0.0).f(frtd));
                    if r == ri && z == z1 {
                        // Single ring on the last pass: close with two full
                        // turns so the floor is actually cleared.
                        ol.push(GCodeOp::arc(dir).x(r).y(0.0).i(-r).j(0.0).p(2.0).f(frso));
                    } else {
                        ol.push(GCodeOp::arc(dir).x(r).y(0.0).i(-r).j(0.0).f(frso));
                    }
                    spiral_in = false;
                }
                if r != ri {
                    ol.push(GCodeOp::linear().x(r).y(0.0).f(frtd));
                    ol.push(GCodeOp::arc(dir).x(r).y(0.0).i(-r).j(0.0).f(frso));
                }
            }
            ol.push(GCodeOp::arc(dir).x(r).y(0.0).i(-r).j(0.0).f(frso));
        }
    }
    ol
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arcs(ops: &[GCodeOp]) -> Vec<&GCodeOp> {
        ops.iter()
            .filter(|o| matches!(o, GCodeOp::Arc { .. }))
            .collect()
    }

    #[test]
    fn test_spiral_regime_emits_exactly_one_multiturn_arc() {
        // Inner >= outer: one continuous spiral plus a finishing circle.
        let ops = pocket_circle(
            ArcDirection::Ccw,
            0.0,
            -6.0,
            2.0,
            5.0,
            5.0,
            1.0,
            300.0,
            500.0,
        );
        let spiral: Vec<_> = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::Arc { p: Some(_), .. }))
            .collect();
        assert_eq!(spiral.len(), 1);
        if let GCodeOp::Arc { z, p, .. } = spiral[0] {
            assert_eq!(*z, Some(-6.0));
            assert_eq!(*p, Some(3.0)); // ceil(6/2) turns
        }
        assert_eq!(arcs(&ops).len(), 2);
    }

    #[test]
    fn test_ring_regime_steps_to_outer_radius() {
        // ri=5, ra=20, dr=5: rings at 5, 10, 15, 20 per z level, i.e.
        // ceil((ra-ri)/dr) = 3 radial step-ins after the entry ring.
        let ops = pocket_circle(
            ArcDirection::Cw,
            0.0,
            -1.0,
            1.0,
            5.0,
            20.0,
            5.0,
            300.0,
            500.0,
        );
        let mut radii: Vec<f64> = ops
            .iter()
            .filter_map(|o| match o {
                GCodeOp::Arc { i: Some(i), .. } => Some(-i),
                _ => None,
            })
            .collect();
        radii.dedup();
        assert_eq!(radii, vec![5.0, 10.0, 15.0, 20.0]);

        // Exactly one helical descent arc per z level.
        let descents = ops
            .iter()
            .filter(|o| matches!(o, GCodeOp::Arc { z: Some(_), .. }))
            .count();
        assert_eq!(descents, 1);
    }

    #[test]
    fn test_final_ring_lands_exactly_on_boundary() {
        // (ra-ri)/dr is not integral; the last step must clamp to ra.
        let ops = pocket_circle(
            ArcDirection::Ccw,
            0.0,
            -1.0,
            1.0,
            4.0,
            18.0,
            5.0,
            300.0,
            500.0,
        );
        let max_r = ops
            .iter()
            .filter_map(|o| match o {
                GCodeOp::Arc { i: Some(i), .. } => Some(-i),
                _ => None,
            })
            .fold(0.0f64, f64::max);
        assert_eq!(max_r, 18.0);
    }

    #[test]
    fn test_z_ladder_clamps_to_end_depth() {
        let ops = pocket_circle(
            ArcDirection::Ccw,
            0.0,
            -5.0,
            2.0,
            2.0,
            8.0,
            2.0,
            300.0,
            500.0,
        );
        let depths: Vec<f64> = ops
            .iter()
            .filter_map(|o| match o {
                GCodeOp::Arc { z: Some(z), .. } => Some(*z),
                _ => None,
            })
            .collect();
        assert_eq!(depths, vec![-2.0, -4.0, -5.0]);
    }
}
