//! Structures (the building blocks of a linkage) and the linkage container.
//!
//! - `Rotary`: crank of fixed length turning about an anchor at the driver
//!   angle plus a phase offset.
//! - `Hinge`: two-bar joint given by two link lengths (external form).
//! - `HingeFrame`: the same joint given by the driven point in the local frame
//!   of its anchors at a reference pose (internal form). The sign of `yt`
//!   carries the intersection branch, so the joint never flips while the
//!   anchors move continuously.

use nalgebra::Vector2;

use super::refs::{PointRef, VarId, VarTable};
use crate::geometry::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rotary {
    pub length: VarId,
    pub anchor: PointRef,
    pub phase: VarId,
    pub driven: PointRef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hinge {
    pub l0: VarId,
    pub l1: VarId,
    pub p0: PointRef,
    pub p1: PointRef,
    pub driven: PointRef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HingeFrame {
    pub xt: VarId,
    pub yt: VarId,
    pub l2t: VarId,
    pub p0: PointRef,
    pub p1: PointRef,
    pub driven: PointRef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Structure {
    Rotary(Rotary),
    Hinge(Hinge),
    HingeFrame(HingeFrame),
}

impl Structure {
    /// The point this structure writes.
    #[inline]
    pub fn driven(&self) -> PointRef {
        match self {
            Structure::Rotary(r) => r.driven,
            Structure::Hinge(h) => h.driven,
            Structure::HingeFrame(h) => h.driven,
        }
    }

    /// Points read by this structure.
    pub fn anchors(&self) -> Vec<PointRef> {
        match self {
            Structure::Rotary(r) => vec![r.anchor],
            Structure::Hinge(h) => vec![h.p0, h.p1],
            Structure::HingeFrame(h) => vec![h.p0, h.p1],
        }
    }

    /// Scalar parameters (lengths, phase, frame triple); always ground values.
    pub fn params(&self) -> Vec<VarId> {
        match self {
            Structure::Rotary(r) => vec![r.length, r.phase],
            Structure::Hinge(h) => vec![h.l0, h.l1],
            Structure::HingeFrame(h) => vec![h.xt, h.yt, h.l2t],
        }
    }

    /// Every handle read by this structure.
    pub fn inputs(&self) -> Vec<VarId> {
        let mut ids = self.params();
        for p in self.anchors() {
            ids.push(p.x);
            ids.push(p.y);
        }
        ids
    }

    #[inline]
    pub fn outputs(&self) -> [VarId; 2] {
        let d = self.driven();
        [d.x, d.y]
    }

    /// True if `x` is the x handle of one of this structure's points.
    pub fn touches(&self, x: VarId) -> bool {
        self.driven().x == x || self.anchors().iter().any(|p| p.x == x)
    }

    #[inline]
    pub fn is_rotary(&self) -> bool {
        matches!(self, Structure::Rotary(_))
    }
}

/// Ground values (`initialVars`), one optional slot per arena handle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ground {
    slots: Vec<Option<f64>>,
}

impl Ground {
    #[inline]
    pub fn get(&self, id: VarId) -> Option<f64> {
        self.slots.get(id.0).copied().flatten()
    }

    #[inline]
    pub fn contains(&self, id: VarId) -> bool {
        self.get(id).is_some()
    }

    pub fn set(&mut self, id: VarId, value: f64) {
        if self.slots.len() <= id.0 {
            self.slots.resize(id.0 + 1, None);
        }
        self.slots[id.0] = Some(value);
    }

    pub fn clear(&mut self, id: VarId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            *slot = None;
        }
    }

    #[inline]
    pub fn set_point(&mut self, p: PointRef, at: Point) {
        self.set(p.x, at.x);
        self.set(p.y, at.y);
    }

    /// Ground position of `p`, if both coordinates are ground values.
    pub fn point(&self, p: PointRef) -> Option<Point> {
        Some(Vector2::new(self.get(p.x)?, self.get(p.y)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (VarId(i), v)))
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[Option<f64>] {
        &self.slots
    }
}

/// Full variable assignment produced by evaluation (ground + structure outputs).
#[derive(Clone, Debug, PartialEq)]
pub struct Vars {
    values: Vec<f64>,
}

impl Vars {
    /// Ground values only; unset slots read as NaN.
    pub fn from_ground(ground: &Ground, len: usize) -> Self {
        let mut values = vec![f64::NAN; len.max(ground.slots().len())];
        for (id, v) in ground.iter() {
            values[id.0] = v;
        }
        Self { values }
    }

    #[inline]
    pub fn get(&self, id: VarId) -> f64 {
        self.values.get(id.0).copied().unwrap_or(f64::NAN)
    }

    pub fn set(&mut self, id: VarId, value: f64) {
        if self.values.len() <= id.0 {
            self.values.resize(id.0 + 1, f64::NAN);
        }
        self.values[id.0] = value;
    }

    #[inline]
    pub fn point(&self, p: PointRef) -> Point {
        Vector2::new(self.get(p.x), self.get(p.y))
    }

    #[inline]
    pub fn set_point(&mut self, p: PointRef, at: Point) {
        self.set(p.x, at.x);
        self.set(p.y, at.y);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered structures over a shared variable arena plus their ground values.
///
/// Invariants (checked by `from_literal`):
/// - every structure input is ground or the output of a strictly earlier structure;
/// - every output is written exactly once and never shadows a ground value.
#[derive(Clone, Debug, Default)]
pub struct Linkage {
    pub structures: Vec<Structure>,
    pub vars: VarTable,
    pub ground: Ground,
}

impl Linkage {
    #[inline]
    pub fn is_ground(&self, id: VarId) -> bool {
        self.ground.contains(id)
    }

    /// Replace all ground values at once (drag commit).
    #[inline]
    pub fn commit_ground(&mut self, ground: Ground) {
        self.ground = ground;
    }

    /// Display key for a handle, e.g. `"x4"`; retired slots print as `"#<slot>"`.
    pub fn key(&self, id: VarId) -> String {
        match self.vars.name(id) {
            Some(name) => name.to_string(),
            None => format!("#{}", id.0),
        }
    }

    /// Point whose x key is `x<suffix>`, if both coordinates are live and
    /// some structure reads or drives it. Frame coordinates of a local-frame
    /// hinge share the `x`/`y` prefixes but are not points.
    pub fn point_by_suffix(&self, suffix: u32) -> Option<PointRef> {
        use super::refs::{Role, VarName};
        let x = self.vars.get(VarName::new(Role::X, suffix))?;
        let y = self.vars.get(VarName::new(Role::Y, suffix))?;
        self.structures
            .iter()
            .any(|s| s.touches(x))
            .then_some(PointRef::new(x, y))
    }

    /// Number of structures (other than `skip`) reading or writing point `x`.
    pub fn references_to(&self, x: VarId, skip: Option<usize>) -> usize {
        self.structures
            .iter()
            .enumerate()
            .filter(|(i, s)| Some(*i) != skip && s.touches(x))
            .count()
    }

    /// Number of structures (other than `skip`) reading handle `id`.
    pub fn readers_of(&self, id: VarId, skip: Option<usize>) -> usize {
        self.structures
            .iter()
            .enumerate()
            .filter(|(i, s)| Some(*i) != skip && s.inputs().contains(&id))
            .count()
    }

    /// Drop a ground value and its name.
    pub(crate) fn retire(&mut self, id: VarId) {
        self.ground.clear(id);
        self.vars.retire(id);
    }
}
