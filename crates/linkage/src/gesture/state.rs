//! Gesture states, actions and the transition table.

use crate::geometry::Point;
use crate::model::PointRef;

/// Pending link-creation gesture. Clicks are kept in click order.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// One ground click.
    G { g0: Point },
    /// Two ground clicks.
    GG { g0: Point, g1: Point },
    /// One existing point.
    P { p0: PointRef },
    /// Two existing points.
    PP { p0: PointRef, p1: PointRef },
    /// One existing point and one ground click (either order).
    PG { p0: PointRef, g0: Point },
    /// Armed to add a rotary at the next ground click.
    Rotary,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Esc,
    ClickGround(Point),
    ClickPoint(PointRef),
}

/// Map a pointer-up to an action: a hit on an existing point wins over ground.
pub fn action_from_click(pos: Point, hit: Option<PointRef>) -> Action {
    match hit {
        Some(p) => Action::ClickPoint(p),
        None => Action::ClickGround(pos),
    }
}

/// Tag of a `GestureState`, the row index of the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    None,
    G,
    GG,
    P,
    PP,
    PG,
    R,
}

/// Click column of the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Click {
    Ground,
    Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Hinge between two existing points; the ground click is the driven point.
    Ppg,
    /// Hinge between an existing point and a new ground anchor; the second
    /// ground click is the driven point.
    Pgg,
    /// Rotary anchored at the ground click.
    Rotary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Goto(StateKind),
    Ignore,
    Synthesize(EffectKind),
}

use Step::{Goto, Ignore, Synthesize};

/// `(state, [on ground click, on point click])`. `Esc` is handled before lookup.
pub const TRANSITIONS: [(StateKind, [Step; 2]); 7] = [
    (StateKind::None, [Goto(StateKind::G), Goto(StateKind::P)]),
    (StateKind::G, [Goto(StateKind::GG), Goto(StateKind::PG)]),
    (StateKind::P, [Goto(StateKind::PG), Goto(StateKind::PP)]),
    (StateKind::GG, [Ignore, Synthesize(EffectKind::Pgg)]),
    (StateKind::PP, [Synthesize(EffectKind::Ppg), Ignore]),
    (
        StateKind::PG,
        [Synthesize(EffectKind::Pgg), Synthesize(EffectKind::Ppg)],
    ),
    (StateKind::R, [Synthesize(EffectKind::Rotary), Ignore]),
];

pub fn step(kind: StateKind, click: Click) -> Step {
    let col = match click {
        Click::Ground => 0,
        Click::Point => 1,
    };
    TRANSITIONS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, row)| row[col])
        .unwrap_or(Ignore)
}

/// Clicks accumulated by a gesture, in click order per kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Clicks {
    pub points: Vec<PointRef>,
    pub grounds: Vec<Point>,
}

impl GestureState {
    pub fn kind(&self) -> StateKind {
        match self {
            GestureState::Idle => StateKind::None,
            GestureState::G { .. } => StateKind::G,
            GestureState::GG { .. } => StateKind::GG,
            GestureState::P { .. } => StateKind::P,
            GestureState::PP { .. } => StateKind::PP,
            GestureState::PG { .. } => StateKind::PG,
            GestureState::Rotary => StateKind::R,
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    pub(crate) fn clicks(&self) -> Clicks {
        let (points, grounds) = match *self {
            GestureState::Idle | GestureState::Rotary => (vec![], vec![]),
            GestureState::G { g0 } => (vec![], vec![g0]),
            GestureState::GG { g0, g1 } => (vec![], vec![g0, g1]),
            GestureState::P { p0 } => (vec![p0], vec![]),
            GestureState::PP { p0, p1 } => (vec![p0, p1], vec![]),
            GestureState::PG { p0, g0 } => (vec![p0], vec![g0]),
        };
        Clicks { points, grounds }
    }

    /// Rebuild a pending state of `kind` from its clicks.
    pub(crate) fn assemble(kind: StateKind, c: &Clicks) -> Option<Self> {
        Some(match kind {
            StateKind::None => GestureState::Idle,
            StateKind::R => GestureState::Rotary,
            StateKind::G => GestureState::G {
                g0: *c.grounds.first()?,
            },
            StateKind::GG => GestureState::GG {
                g0: *c.grounds.first()?,
                g1: *c.grounds.get(1)?,
            },
            StateKind::P => GestureState::P {
                p0: *c.points.first()?,
            },
            StateKind::PP => GestureState::PP {
                p0: *c.points.first()?,
                p1: *c.points.get(1)?,
            },
            StateKind::PG => GestureState::PG {
                p0: *c.points.first()?,
                g0: *c.grounds.first()?,
            },
        })
    }
}

impl Clicks {
    pub(crate) fn push(&mut self, action: Action) {
        match action {
            Action::ClickGround(g) => self.grounds.push(g),
            Action::ClickPoint(p) => self.points.push(p),
            Action::Esc => {}
        }
    }
}
