//! Drag constraint solver.
//!
//! Moving one point rewrites the smallest set of ground parameters so that a
//! forward solve at the unchanged driver angle puts the point where it was
//! dragged. The structure list is never touched. A candidate that breaks the
//! mechanism anywhere in its revolution is dropped as a whole.

use tracing::debug;

use crate::cfg::KinCfg;
use crate::geometry::{euclid, FrameCoords, Point};
use crate::kinematics::{trace_path, validate_rotation, Polyline};
use crate::model::{Ground, Linkage, PointRef, Rotary, Structure, Vars};
use crate::point_map::PointMap;

/// Accepted drag: the new ground values and the re-traced path (if a point is traced).
#[derive(Clone, Debug, PartialEq)]
pub struct DragOutcome {
    pub ground: Ground,
    pub path: Option<Polyline>,
}

/// Crank length and phase that put `driven` at the end of the crank at `theta`.
fn set_crank(ground: &mut Ground, r: &Rotary, anchor: Point, driven: Point, theta: f64) {
    let d = driven - anchor;
    ground.set(r.length, euclid(anchor, driven));
    ground.set(r.phase, d.y.atan2(d.x) - theta);
}

/// Move `point` to `to` and re-derive the parameters of every structure the
/// point map lists for it.
///
/// - ground point: its ground coordinates are overwritten;
/// - rotary anchor / driven end: crank length and phase are recomputed, the other end stays;
/// - hinge anchor (non-ground) / driven point: the local-frame triple (or the two
///   link lengths) is recomputed from the current positions with `point` at `to`.
///
/// `vars` must be the evaluation of `linkage` at `theta`. Returns None when the
/// point is not part of any structure or the candidate fails validation; the
/// caller's linkage is never modified.
#[allow(clippy::too_many_arguments)]
pub fn move_point(
    point: PointRef,
    to: Point,
    point_map: &PointMap,
    linkage: &Linkage,
    theta: f64,
    vars: &Vars,
    trace: Option<PointRef>,
    cfg: KinCfg,
) -> Option<DragOutcome> {
    let movers = point_map.movers_at(point.x, linkage);
    if movers.is_empty() {
        return None;
    }
    let is_ground = linkage.is_ground(point.x);
    let pos = |p: PointRef| if p.x == point.x { to } else { vars.point(p) };
    let mut ground = linkage.ground.clone();

    for i in movers {
        match &linkage.structures[i] {
            Structure::Rotary(r) => {
                if r.anchor.x == point.x {
                    if is_ground {
                        ground.set_point(point, to);
                    } else {
                        set_crank(&mut ground, r, to, vars.point(r.driven), theta);
                    }
                } else if r.driven.x == point.x {
                    set_crank(&mut ground, r, pos(r.anchor), to, theta);
                }
            }
            Structure::Hinge(h) => {
                if is_ground {
                    ground.set_point(point, to);
                } else {
                    let p2 = pos(h.driven);
                    ground.set(h.l0, euclid(pos(h.p0), p2));
                    ground.set(h.l1, euclid(pos(h.p1), p2));
                }
            }
            Structure::HingeFrame(h) => {
                if is_ground {
                    ground.set_point(point, to);
                } else {
                    let Some(frame) = FrameCoords::from_points(pos(h.p0), pos(h.p1), pos(h.driven))
                    else {
                        debug!(structure = i, "drag rejected: hinge anchors coincide");
                        return None;
                    };
                    ground.set(h.xt, frame.xt);
                    ground.set(h.yt, frame.yt);
                    ground.set(h.l2t, frame.l2);
                }
            }
        }
    }

    let candidate = Linkage {
        structures: linkage.structures.clone(),
        vars: linkage.vars.clone(),
        ground,
    };
    let checked = match trace {
        Some(p) => trace_path(&candidate, p, cfg.samples).map(Some),
        None => validate_rotation(&candidate, cfg.samples).map(|_| None),
    };
    match checked {
        Ok(path) => Some(DragOutcome {
            ground: candidate.ground,
            path,
        }),
        Err(e) => {
            debug!(point = %linkage.key(point.x), error = %e, "drag rejected");
            None
        }
    }
}
