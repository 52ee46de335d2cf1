//! Point adjacency map: which structures touch each point, and how.
//!
//! Derived from the structure list and rebuilt whole whenever it changes.
//! Feeds hit-testing, the drag solver and point deletion.

use std::collections::BTreeMap;

use crate::geometry::{euclid, Point};
use crate::model::{Linkage, PointRef, Structure, VarId, Vars};

/// How a point is held in place by one incident structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connection {
    /// Ground anchor of the structure.
    Ground,
    /// Joined to `pivot` by a link; `link` is the length variable when the
    /// hinge is length-based (None for local-frame hinges).
    Joint { pivot: PointRef, link: Option<VarId> },
    /// Driven end of a rotary around `anchor`.
    Actuator { anchor: PointRef, length: VarId },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointEntry {
    pub point: PointRef,
    /// Indices of every structure reading or writing the point.
    pub structures: Vec<usize>,
    pub connections: Vec<Connection>,
    /// Written by a rotary (an end effector).
    pub rotary_output: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointMap {
    entries: BTreeMap<VarId, PointEntry>,
}

impl PointMap {
    pub fn build(linkage: &Linkage) -> Self {
        let mut entries: BTreeMap<VarId, PointEntry> = BTreeMap::new();
        let mut add = |p: PointRef, i: usize, c: Connection| {
            let e = entries.entry(p.x).or_insert_with(|| PointEntry {
                point: p,
                structures: Vec::new(),
                connections: Vec::new(),
                rotary_output: false,
            });
            if e.structures.last() != Some(&i) {
                e.structures.push(i);
            }
            e.connections.push(c);
        };
        let anchor_connection = |p: PointRef, driven: PointRef, link: Option<VarId>| {
            if linkage.is_ground(p.x) {
                Connection::Ground
            } else {
                Connection::Joint {
                    pivot: driven,
                    link,
                }
            }
        };

        for (i, s) in linkage.structures.iter().enumerate() {
            match *s {
                Structure::Rotary(r) => {
                    add(
                        r.anchor,
                        i,
                        anchor_connection(r.anchor, r.driven, Some(r.length)),
                    );
                    add(
                        r.driven,
                        i,
                        Connection::Actuator {
                            anchor: r.anchor,
                            length: r.length,
                        },
                    );
                }
                Structure::Hinge(h) => {
                    add(h.p0, i, anchor_connection(h.p0, h.driven, Some(h.l0)));
                    add(h.p1, i, anchor_connection(h.p1, h.driven, Some(h.l1)));
                    add(h.driven, i, Connection::Joint { pivot: h.p0, link: Some(h.l0) });
                    add(h.driven, i, Connection::Joint { pivot: h.p1, link: Some(h.l1) });
                }
                Structure::HingeFrame(h) => {
                    add(h.p0, i, anchor_connection(h.p0, h.driven, None));
                    add(h.p1, i, anchor_connection(h.p1, h.driven, None));
                    add(h.driven, i, Connection::Joint { pivot: h.p0, link: None });
                    add(h.driven, i, Connection::Joint { pivot: h.p1, link: None });
                }
            }
        }

        for e in entries.values_mut() {
            if e
                .connections
                .iter()
                .any(|c| matches!(c, Connection::Actuator { .. }))
            {
                // Moving an actuator changes the crank only, not the links hanging off it.
                e.connections
                    .retain(|c| matches!(c, Connection::Actuator { .. }));
                e.rotary_output = true;
            }
        }
        Self { entries }
    }

    #[inline]
    pub fn get(&self, x: VarId) -> Option<&PointEntry> {
        self.entries.get(&x)
    }

    /// All structures touching point `x`.
    pub fn structures_at(&self, x: VarId) -> &[usize] {
        self.get(x).map(|e| e.structures.as_slice()).unwrap_or(&[])
    }

    /// Structures the drag solver edits when point `x` moves: rotary outputs
    /// only move their rotaries.
    pub fn movers_at(&self, x: VarId, linkage: &Linkage) -> Vec<usize> {
        let Some(e) = self.get(x) else {
            return Vec::new();
        };
        e.structures
            .iter()
            .copied()
            .filter(|&i| !e.rotary_output || linkage.structures[i].is_rotary())
            .collect()
    }

    pub fn connections_at(&self, x: VarId) -> &[Connection] {
        self.get(x).map(|e| e.connections.as_slice()).unwrap_or(&[])
    }

    pub fn points(&self) -> impl Iterator<Item = PointRef> + '_ {
        self.entries.values().map(|e| e.point)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Points that accept pointer input; while animating only ground points do.
    pub fn clickable_points(&self, paused: bool, linkage: &Linkage) -> Vec<PointRef> {
        self.points()
            .filter(|p| paused || linkage.is_ground(p.x))
            .collect()
    }
}

/// Closest of `candidates` to `pos` within `threshold`, if any.
pub fn nearest_point(
    pos: Point,
    candidates: &[PointRef],
    vars: &Vars,
    threshold: f64,
) -> Option<PointRef> {
    candidates
        .iter()
        .map(|&p| (p, euclid(pos, vars.point(p))))
        .filter(|(_, d)| *d < threshold)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}
