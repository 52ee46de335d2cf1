//! Structures synthesized by a finished gesture.

use super::state::{Clicks, EffectKind, GestureState};
use crate::geometry::{FrameCoords, Point};
use crate::kinematics::KinematicsError;
use crate::model::{HingeFrame, Linkage, PointRef, RefAllocator, Role, Rotary, Structure, Vars};

/// A structure insertion waiting to be committed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SideEffect {
    /// Hinge on existing `p0`, `p1`; driven point starts at `driven`.
    Ppg {
        p0: PointRef,
        p1: PointRef,
        driven: Point,
    },
    /// Hinge on existing `p0` and a new ground point at `anchor`; driven point
    /// starts at `driven`.
    Pgg {
        p0: PointRef,
        anchor: Point,
        driven: Point,
    },
    /// Rotary around a new ground point at `anchor`.
    Rotary { anchor: Point, length: f64 },
}

/// Result of applying a `SideEffect` to a copy of a linkage.
#[derive(Clone, Debug)]
pub struct Applied {
    pub linkage: Linkage,
    /// The new structure's output.
    pub driven: PointRef,
}

impl SideEffect {
    pub(crate) fn from_clicks(kind: EffectKind, c: &Clicks, crank_length: f64) -> Option<Self> {
        Some(match kind {
            EffectKind::Ppg => SideEffect::Ppg {
                p0: *c.points.first()?,
                p1: *c.points.get(1)?,
                driven: *c.grounds.first()?,
            },
            EffectKind::Pgg => SideEffect::Pgg {
                p0: *c.points.first()?,
                anchor: *c.grounds.first()?,
                driven: *c.grounds.get(1)?,
            },
            EffectKind::Rotary => SideEffect::Rotary {
                anchor: *c.grounds.first()?,
                length: crank_length,
            },
        })
    }

    /// Append the new structure (and its ground values) to a copy of `linkage`.
    ///
    /// `vars` is the evaluation at `theta`; it supplies the positions of the
    /// existing points. Hinges are created in local-frame form. A new rotary is
    /// phased so that its crank points along +x at `theta`. Fails if a hinge's
    /// anchors coincide.
    pub fn apply(
        &self,
        linkage: &Linkage,
        vars: &Vars,
        theta: f64,
    ) -> Result<Applied, KinematicsError> {
        let mut out = linkage.clone();
        let index = out.structures.len();
        let mut alloc = RefAllocator::scan(&out.vars);
        let structure = match *self {
            SideEffect::Ppg { p0, p1, driven } => {
                let frame = FrameCoords::from_points(vars.point(p0), vars.point(p1), driven)
                    .ok_or(KinematicsError::DegenerateTriangle { structure: index })?;
                let d = alloc.mint_point(&mut out.vars);
                hinge_frame(&mut out, &mut alloc, frame, p0, p1, d)
            }
            SideEffect::Pgg { p0, anchor, driven } => {
                let frame = FrameCoords::from_points(vars.point(p0), anchor, driven)
                    .ok_or(KinematicsError::DegenerateTriangle { structure: index })?;
                let p1 = alloc.mint_point(&mut out.vars);
                out.ground.set_point(p1, anchor);
                let d = alloc.mint_point(&mut out.vars);
                hinge_frame(&mut out, &mut alloc, frame, p0, p1, d)
            }
            SideEffect::Rotary { anchor, length } => {
                let a = alloc.mint_point(&mut out.vars);
                out.ground.set_point(a, anchor);
                let l = alloc.mint(&mut out.vars, Role::Length);
                let f = alloc.mint(&mut out.vars, Role::Phase);
                out.ground.set(l, length);
                out.ground.set(f, -theta);
                let d = alloc.mint_point(&mut out.vars);
                Structure::Rotary(Rotary {
                    length: l,
                    anchor: a,
                    phase: f,
                    driven: d,
                })
            }
        };
        let driven = structure.driven();
        out.structures.push(structure);
        Ok(Applied {
            linkage: out,
            driven,
        })
    }
}

fn hinge_frame(
    out: &mut Linkage,
    alloc: &mut RefAllocator,
    frame: FrameCoords,
    p0: PointRef,
    p1: PointRef,
    driven: PointRef,
) -> Structure {
    let t = alloc.mint_point(&mut out.vars);
    let l2t = alloc.mint(&mut out.vars, Role::Length);
    out.ground.set(t.x, frame.xt);
    out.ground.set(t.y, frame.yt);
    out.ground.set(l2t, frame.l2);
    Structure::HingeFrame(HingeFrame {
        xt: t.x,
        yt: t.y,
        l2t,
        p0,
        p1,
        driven,
    })
}

/// Rubber-band polyline for the pending gesture, ending or passing through `mouse`.
pub fn preview_lines(state: &GestureState, mouse: Point, vars: &Vars) -> Vec<Point> {
    match *state {
        GestureState::Idle | GestureState::Rotary => Vec::new(),
        GestureState::G { g0 } => vec![g0, mouse],
        GestureState::GG { g0, g1 } => vec![g0, g1, mouse],
        GestureState::P { p0 } => vec![vars.point(p0), mouse],
        GestureState::PP { p0, p1 } => vec![vars.point(p0), mouse, vars.point(p1)],
        GestureState::PG { p0, g0 } => vec![vars.point(p0), mouse, g0],
    }
}
