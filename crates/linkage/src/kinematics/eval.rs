//! Forward solve of every structure output from a driver angle.

use std::fmt;

use crate::geometry::{circle_intersection, FrameCoords, Point};
use crate::model::{Linkage, Structure, Vars};

/// The single runtime failure of the core: a hinge whose circles do not meet.
///
/// Used as the validity oracle by animation (skip the frame), dragging (roll the
/// edit back) and link creation (reject the new structure).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KinematicsError {
    DegenerateTriangle { structure: usize },
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::DegenerateTriangle { structure } => write!(
                f,
                "structure {structure}: link lengths don't make a triangle"
            ),
        }
    }
}

impl std::error::Error for KinematicsError {}

/// Evaluate all variables of `linkage` at driver angle `theta`.
pub fn evaluate(linkage: &Linkage, theta: f64) -> Result<Vars, KinematicsError> {
    let mut vars = Vars::from_ground(&linkage.ground, linkage.vars.len());
    for (i, s) in linkage.structures.iter().enumerate() {
        debug_assert!(
            s.inputs().iter().all(|&id| vars.get(id).is_finite()),
            "structure {i} reads an undefined variable"
        );
        let p = match *s {
            Structure::Rotary(r) => {
                let anchor = vars.point(r.anchor);
                let l = vars.get(r.length);
                let a = theta + vars.get(r.phase);
                anchor + Point::new(a.cos(), a.sin()) * l
            }
            Structure::Hinge(h) => circle_intersection(
                vars.point(h.p0),
                vars.point(h.p1),
                vars.get(h.l0),
                vars.get(h.l1),
                true,
            )
            .ok_or(KinematicsError::DegenerateTriangle { structure: i })?,
            Structure::HingeFrame(h) => {
                let frame = FrameCoords {
                    xt: vars.get(h.xt),
                    yt: vars.get(h.yt),
                    l2: vars.get(h.l2t),
                };
                let (l0, l1) = frame.lengths();
                circle_intersection(vars.point(h.p0), vars.point(h.p1), l0, l1, frame.upper())
                    .ok_or(KinematicsError::DegenerateTriangle { structure: i })?
            }
        };
        vars.set_point(s.driven(), p);
    }
    Ok(vars)
}
