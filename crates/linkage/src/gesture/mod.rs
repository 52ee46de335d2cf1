//! Link-creation gesture state machine.
//!
//! Purpose
//! - Turn a sequence of clicks (ground positions or existing points) into one
//!   new hinge or rotary, validated over a full revolution before it is handed
//!   back to the caller.
//!
//! Structure
//! - `state`: states, actions and the transition table (`TRANSITIONS`), kept as
//!   data so it can be read and tested on its own.
//! - `effect`: the synthesized `SideEffect` and how it is spliced into a linkage.
//!
//! Rollback
//! - A synthesized structure that is unreachable anywhere in the revolution is
//!   rejected and the gesture stays in the state it was in before the last
//!   click, for every synthesizing transition. The user can retry just that click.

mod effect;
mod state;

pub use effect::{preview_lines, Applied, SideEffect};
pub use state::{
    action_from_click, step, Action, Click, EffectKind, GestureState, StateKind, Step, TRANSITIONS,
};

use tracing::debug;

use crate::cfg::SessionCfg;
use crate::kinematics::trace_path;
use crate::model::{Linkage, Vars};

/// Linkage, evaluated variables and driver angle the gesture is applied to.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub linkage: &'a Linkage,
    pub vars: &'a Vars,
    pub theta: f64,
}

/// Next state plus the effect to commit, if the gesture just completed.
#[derive(Clone, Debug, PartialEq)]
pub struct Reduction {
    pub state: GestureState,
    pub effect: Option<SideEffect>,
}

impl Reduction {
    fn to(state: GestureState) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

/// Feed one action into the gesture machine.
pub fn reduce(
    state: &GestureState,
    action: Action,
    snap: Snapshot<'_>,
    cfg: &SessionCfg,
) -> Reduction {
    let click = match action {
        Action::Esc => return Reduction::to(GestureState::Idle),
        Action::ClickGround(_) => Click::Ground,
        Action::ClickPoint(_) => Click::Point,
    };
    let mut clicks = state.clicks();
    clicks.push(action);
    match step(state.kind(), click) {
        Step::Ignore => Reduction::to(*state),
        Step::Goto(kind) => {
            Reduction::to(GestureState::assemble(kind, &clicks).unwrap_or(*state))
        }
        Step::Synthesize(kind) => {
            let Some(effect) = SideEffect::from_clicks(kind, &clicks, cfg.default_crank_length)
            else {
                return Reduction::to(*state);
            };
            simulate(state, effect, snap, cfg)
        }
    }
}

/// Apply `effect` to a copy and trace its new point over a full revolution.
fn simulate(
    before: &GestureState,
    effect: SideEffect,
    snap: Snapshot<'_>,
    cfg: &SessionCfg,
) -> Reduction {
    let checked = effect
        .apply(snap.linkage, snap.vars, snap.theta)
        .and_then(|a| trace_path(&a.linkage, a.driven, cfg.kin.samples));
    match checked {
        Ok(_) => Reduction {
            state: GestureState::Idle,
            effect: Some(effect),
        },
        Err(e) => {
            debug!(?effect, error = %e, "new structure rejected");
            Reduction::to(*before)
        }
    }
}
