//! External ↔ internal hinge representation.
//!
//! `internalize` captures every length-based hinge as the driven point's
//! coordinates in its anchors' frame at a reference angle. `externalize` goes
//! back to link lengths; lengths carry no branch, so a hinge captured on the
//! negative local-y side re-evaluates on the other side afterwards.

use super::refs::{RefAllocator, Role};
use super::types::{Hinge, HingeFrame, Linkage, Structure};
use crate::geometry::FrameCoords;
use crate::kinematics::{evaluate, KinematicsError};

/// Replace every `Hinge` with an equivalent `HingeFrame` captured at `theta`.
///
/// Length variables that no other structure reads are retired.
pub fn internalize(linkage: &Linkage, theta: f64) -> Result<Linkage, KinematicsError> {
    let vars = evaluate(linkage, theta)?;
    let mut out = linkage.clone();
    let mut alloc = RefAllocator::scan(&out.vars);
    for i in 0..out.structures.len() {
        let Structure::Hinge(h) = out.structures[i] else {
            continue;
        };
        let frame =
            FrameCoords::from_points(vars.point(h.p0), vars.point(h.p1), vars.point(h.driven))
                .ok_or(KinematicsError::DegenerateTriangle { structure: i })?;
        let t = alloc.mint_point(&mut out.vars);
        let l2t = alloc.mint(&mut out.vars, Role::Length);
        out.ground.set(t.x, frame.xt);
        out.ground.set(t.y, frame.yt);
        out.ground.set(l2t, frame.l2);
        out.structures[i] = Structure::HingeFrame(HingeFrame {
            xt: t.x,
            yt: t.y,
            l2t,
            p0: h.p0,
            p1: h.p1,
            driven: h.driven,
        });
        for l in [h.l0, h.l1] {
            if out.readers_of(l, None) == 0 {
                out.retire(l);
            }
        }
    }
    Ok(out)
}

/// Replace every `HingeFrame` with the length-based `Hinge` it implies.
pub fn externalize(linkage: &Linkage) -> Linkage {
    let mut out = linkage.clone();
    let mut alloc = RefAllocator::scan(&out.vars);
    for i in 0..out.structures.len() {
        let Structure::HingeFrame(h) = out.structures[i] else {
            continue;
        };
        let frame = FrameCoords {
            xt: out.ground.get(h.xt).unwrap_or(f64::NAN),
            yt: out.ground.get(h.yt).unwrap_or(f64::NAN),
            l2: out.ground.get(h.l2t).unwrap_or(f64::NAN),
        };
        let (len0, len1) = frame.lengths();
        let l0 = alloc.mint(&mut out.vars, Role::Length);
        let l1 = alloc.mint(&mut out.vars, Role::Length);
        out.ground.set(l0, len0);
        out.ground.set(l1, len1);
        out.structures[i] = Structure::Hinge(Hinge {
            l0,
            l1,
            p0: h.p0,
            p1: h.p1,
            driven: h.driven,
        });
        for id in [h.xt, h.yt, h.l2t] {
            if out.readers_of(id, None) == 0 {
                out.retire(id);
            }
        }
    }
    out
}
