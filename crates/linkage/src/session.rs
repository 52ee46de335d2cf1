//! Editor session: the application state a host loop owns.
//!
//! Purpose
//! - One explicit record for everything the event handlers share (linkage,
//!   driver angle, pause flag, traced and hovered paths, drag target, pending
//!   gesture), so the whole event contract runs without a UI.
//!
//! Event contract
//! - `tick` once per frame; a frame whose evaluation fails is skipped but the
//!   angle still advances, so animation walks past dead spots.
//! - `pointer_down` / `pointer_move` / `pointer_up` in canonical coordinates.
//! - Keys: `toggle_pause` (space), `cancel` (escape), `trace_hovered` (t),
//!   `delete_hovered` (d), plus `arm_rotary` for the add-rotary control.
//!
//! Links are only added while paused, except rotaries once armed. While
//! animating only ground points can be picked.

use tracing::{debug, trace};

use crate::cfg::SessionCfg;
use crate::delete::try_remove_point;
use crate::drag::move_point;
use crate::geometry::Point;
use crate::gesture::{
    action_from_click, preview_lines, reduce, GestureState, SideEffect, Snapshot,
};
use crate::kinematics::{evaluate, trace_path, KinematicsError, Polyline};
use crate::model::{internalize, Linkage, PointRef, Vars};
use crate::point_map::{nearest_point, PointMap};
use crate::scene::{self, Scene};

#[derive(Clone, Debug)]
pub struct Session {
    linkage: Linkage,
    point_map: PointMap,
    theta: f64,
    vars: Vars,
    paused: bool,
    trace: Option<PointRef>,
    path: Option<Polyline>,
    hover: Option<PointRef>,
    hover_trace: Option<PointRef>,
    hover_path: Option<Polyline>,
    down: Option<PointRef>,
    dragging: bool,
    gesture: GestureState,
    mouse: Option<Point>,
    cfg: SessionCfg,
}

impl Session {
    /// Start a session on `linkage`, converted to local-frame hinges.
    ///
    /// `trace` names a point of `linkage`; its path is dropped if the
    /// mechanism does not survive a full revolution.
    pub fn new(
        linkage: &Linkage,
        trace: Option<PointRef>,
        cfg: SessionCfg,
    ) -> Result<Self, KinematicsError> {
        let linkage = internalize(linkage, 0.0)?;
        let point_map = PointMap::build(&linkage);
        let theta = cfg.initial_angle;
        let vars = evaluate(&linkage, theta)
            .unwrap_or_else(|_| Vars::from_ground(&linkage.ground, linkage.vars.len()));
        let mut session = Self {
            linkage,
            point_map,
            theta,
            vars,
            paused: false,
            trace,
            path: None,
            hover: None,
            hover_trace: None,
            hover_path: None,
            down: None,
            dragging: false,
            gesture: GestureState::Idle,
            mouse: None,
            cfg,
        };
        session.path = session.trace_of(trace);
        Ok(session)
    }

    #[inline]
    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }

    #[inline]
    pub fn point_map(&self) -> &PointMap {
        &self.point_map
    }

    #[inline]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Evaluation of the last good frame.
    #[inline]
    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    #[inline]
    pub fn paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    #[inline]
    pub fn traced_point(&self) -> Option<PointRef> {
        self.trace
    }

    #[inline]
    pub fn path(&self) -> Option<&Polyline> {
        self.path.as_ref()
    }

    #[inline]
    pub fn hovered(&self) -> Option<PointRef> {
        self.hover
    }

    #[inline]
    pub fn hover_path(&self) -> Option<&Polyline> {
        self.hover_path.as_ref()
    }

    fn trace_of(&self, point: Option<PointRef>) -> Option<Polyline> {
        let p = point?;
        match trace_path(&self.linkage, p, self.cfg.kin.samples) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(point = %self.linkage.key(p.x), error = %e, "no closed path");
                None
            }
        }
    }

    fn hit(&self, pos: Point) -> Option<PointRef> {
        let keys = self.point_map.clickable_points(self.paused, &self.linkage);
        nearest_point(pos, &keys, &self.vars, self.cfg.hit_threshold)
    }

    fn refresh_vars(&mut self) {
        if let Ok(v) = evaluate(&self.linkage, self.theta) {
            self.vars = v;
        }
    }

    /// Advance one frame. Returns false when the frame was skipped.
    pub fn tick(&mut self) -> bool {
        match evaluate(&self.linkage, self.theta) {
            Ok(v) => {
                self.vars = v;
                if !self.paused {
                    self.theta += self.cfg.angle_step;
                }
                true
            }
            Err(e) => {
                trace!(theta = self.theta, error = %e, "frame skipped");
                self.theta += self.cfg.angle_step;
                false
            }
        }
    }

    /// Pick the drag target. Ignored while a gesture is in progress.
    pub fn pointer_down(&mut self, pos: Point) {
        if !self.gesture.is_idle() {
            return;
        }
        self.dragging = false;
        self.down = self.hit(pos);
    }

    /// Drag the pressed point, or update the hover point and its path.
    pub fn pointer_move(&mut self, pos: Point) {
        self.mouse = Some(pos);
        let Some(down) = self.down else {
            self.update_hover(pos);
            return;
        };
        self.dragging = true;
        let Some(out) = move_point(
            down,
            pos,
            &self.point_map,
            &self.linkage,
            self.theta,
            &self.vars,
            self.trace,
            self.cfg.kin,
        ) else {
            return;
        };
        self.linkage.commit_ground(out.ground);
        self.path = out.path;
        self.refresh_vars();
        if self.hover_trace.is_some() {
            self.hover_path = self.trace_of(self.hover_trace);
        }
    }

    fn update_hover(&mut self, pos: Point) {
        let hit = self.hit(pos);
        if hit.map(|p| p.x) != self.hover.map(|p| p.x) {
            // ground and the traced point get no second path
            self.hover_trace = hit
                .filter(|h| !self.linkage.is_ground(h.x) && Some(*h) != self.trace);
            self.hover_path = self.trace_of(self.hover_trace);
        }
        self.hover = hit;
    }

    /// End a drag, or feed the click to the gesture machine.
    ///
    /// Returns the committed structure insertion, if the click completed one.
    pub fn pointer_up(&mut self, pos: Point) -> Option<SideEffect> {
        let was_dragging = self.dragging;
        self.dragging = false;
        self.down = None;
        if was_dragging {
            return None;
        }
        if !self.paused && self.gesture != GestureState::Rotary {
            return None;
        }
        let action = action_from_click(pos, self.hit(pos));
        let snap = Snapshot {
            linkage: &self.linkage,
            vars: &self.vars,
            theta: self.theta,
        };
        let r = reduce(&self.gesture, action, snap, &self.cfg);
        self.gesture = r.state;
        let effect = r.effect?;
        match effect.apply(&self.linkage, &self.vars, self.theta) {
            Ok(applied) => {
                self.linkage = applied.linkage;
                self.point_map = PointMap::build(&self.linkage);
                self.refresh_vars();
                self.path = self.trace_of(self.trace);
                debug!(?effect, structures = self.linkage.structures.len(), "structure added");
                Some(effect)
            }
            Err(e) => {
                debug!(?effect, error = %e, "structure could not be applied");
                None
            }
        }
    }

    /// Pause or resume; resuming abandons a pending gesture.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.down = None;
        self.hover = None;
        self.hover_trace = None;
        self.hover_path = None;
        if !self.paused {
            self.cancel();
        }
    }

    pub fn cancel(&mut self) {
        self.gesture = GestureState::Idle;
    }

    /// Add a rotary at the next ground click.
    pub fn arm_rotary(&mut self) {
        self.gesture = GestureState::Rotary;
    }

    /// Trace the hovered point. Returns false if nothing traceable is hovered.
    pub fn trace_hovered(&mut self) -> bool {
        let Some(h) = self.hover.filter(|h| self.hover_trace == Some(*h)) else {
            return false;
        };
        let Some(path) = self.hover_path.take() else {
            return false;
        };
        self.path = Some(path);
        self.trace = Some(h);
        self.hover_trace = None;
        true
    }

    /// Remove the hovered point (see `try_remove_point`).
    pub fn delete_hovered(&mut self) -> bool {
        let Some(h) = self.hover else {
            return false;
        };
        if !try_remove_point(h, &self.point_map, &mut self.linkage) {
            return false;
        }
        self.point_map = PointMap::build(&self.linkage);
        let trace_gone = self
            .trace
            .is_some_and(|t| self.linkage.vars.name(t.x).is_none());
        if self.hover == self.trace || trace_gone {
            self.trace = None;
            self.path = None;
        }
        self.hover = None;
        self.hover_trace = None;
        self.hover_path = None;
        self.refresh_vars();
        true
    }

    /// Everything the renderer needs for the current frame.
    pub fn scene(&self) -> Scene {
        let mut highlighted = Vec::new();
        for p in [self.down, self.hover].into_iter().flatten() {
            highlighted.push(scene::xy(self.vars.point(p)));
        }
        let preview = match self.mouse {
            Some(m) => scene::polyline(&preview_lines(&self.gesture, m, &self.vars)),
            None => Vec::new(),
        };
        Scene {
            segments: scene::segments(&self.linkage, &self.vars),
            traced: self.path.as_deref().map(scene::polyline),
            hover_path: self.hover_path.as_deref().map(scene::polyline),
            highlighted,
            preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::presets;
    use nalgebra::vector;

    fn session() -> Session {
        let lk = presets::four_bar_coupler();
        let trace = lk.point_by_suffix(presets::FOUR_BAR_TRACE_SUFFIX);
        Session::new(&lk, trace, SessionCfg::default()).unwrap()
    }

    fn at(s: &Session, suffix: u32) -> Point {
        s.vars().point(s.linkage().point_by_suffix(suffix).unwrap())
    }

    #[test]
    fn starts_internalized_with_traced_path() {
        let s = session();
        assert_eq!(s.theta(), SessionCfg::default().initial_angle);
        assert_eq!(s.path().unwrap().len(), 126);
        assert_eq!(s.point_map().len(), 5);
        assert!(s.linkage().vars.resolve("l1").is_err());
    }

    #[test]
    fn tick_advances_unless_paused() {
        let mut s = session();
        let t0 = s.theta();
        assert!(s.tick());
        assert!((s.theta() - t0 - 0.05).abs() < 1e-12);
        s.toggle_pause();
        assert!(s.tick());
        assert!((s.theta() - t0 - 0.05).abs() < 1e-12);
    }

    #[test]
    fn skipped_frame_still_advances() {
        let lk = presets::four_bar_coupler();
        let mut s = Session::new(&lk, None, SessionCfg::default()).unwrap();
        // pull ground 3 out of reach of the rocker
        let g3 = s.linkage.point_by_suffix(3).unwrap();
        s.linkage.ground.set_point(g3, vector![3.0, 0.0]);
        s.toggle_pause();
        let t0 = s.theta();
        assert!(!s.tick());
        assert!((s.theta() - t0 - 0.05).abs() < 1e-12);
    }

    #[test]
    fn ground_ground_point_adds_hinge_while_paused() {
        let mut s = session();
        // ignored while animating
        assert!(s.pointer_up(vector![0.6, 0.0]).is_none());
        assert!(s.gesture().is_idle());

        s.toggle_pause();
        let p3 = at(&s, 3);
        assert!(s.pointer_up(vector![0.6, 0.0]).is_none());
        assert!(s.pointer_up(vector![0.45, 0.2]).is_none());
        let effect = s.pointer_up(p3);
        assert!(matches!(effect, Some(SideEffect::Pgg { .. })));
        assert!(s.gesture().is_idle());
        assert_eq!(s.linkage().structures.len(), 4);
        assert_eq!(s.point_map().len(), 7);
        assert!(s.linkage().check().is_ok());
    }

    #[test]
    fn armed_rotary_accepts_ground_click_while_animating() {
        let mut s = session();
        s.arm_rotary();
        let effect = s.pointer_up(vector![-0.8, 0.5]);
        assert!(matches!(effect, Some(SideEffect::Rotary { .. })));
        assert_eq!(s.linkage().structures.len(), 4);
        assert!(s.tick());
    }

    #[test]
    fn resuming_cancels_pending_gesture() {
        let mut s = session();
        s.toggle_pause();
        s.pointer_up(vector![0.6, 0.0]);
        assert!(matches!(s.gesture(), GestureState::G { .. }));
        // no dragging while a gesture is pending
        s.pointer_down(at(&s, 3));
        s.pointer_move(vector![0.5, 0.5]);
        assert_eq!(s.linkage().ground, session().linkage().ground);
        s.toggle_pause();
        assert!(s.gesture().is_idle());
    }

    #[test]
    fn drag_commits_ground_and_skips_click() {
        let mut s = session();
        s.toggle_pause();
        let g3 = s.linkage().point_by_suffix(3).unwrap();
        s.pointer_down(at(&s, 3));
        s.pointer_move(vector![0.32, 0.01]);
        assert!(s.pointer_up(vector![0.32, 0.01]).is_none());
        assert_eq!(s.linkage().ground.point(g3), Some(vector![0.32, 0.01]));
        assert!(s.gesture().is_idle());
        assert_eq!(s.path().unwrap().len(), 126);
    }

    #[test]
    fn hover_trace_and_delete() {
        let mut s = session();
        s.toggle_pause();
        let x2 = s.linkage().point_by_suffix(2).unwrap();
        let x4 = s.linkage().point_by_suffix(4).unwrap();

        // traced point: hovered but no second path
        s.pointer_move(at(&s, 4));
        assert_eq!(s.hovered(), Some(x4));
        assert!(s.hover_path().is_none());

        s.pointer_move(at(&s, 2));
        assert_eq!(s.hovered(), Some(x2));
        assert!(s.hover_path().is_some());
        assert!(s.trace_hovered());
        assert_eq!(s.traced_point(), Some(x2));
        // shared joint cannot be removed
        assert!(!s.delete_hovered());

        s.pointer_move(at(&s, 4));
        assert!(s.delete_hovered());
        assert_eq!(s.linkage().structures.len(), 2);
        assert_eq!(s.point_map().len(), 4);
        assert_eq!(s.traced_point(), Some(x2));
        assert!(s.hovered().is_none());

        s.pointer_move(vector![5.0, 5.0]);
        assert!(s.hover_path().is_none());
    }

    #[test]
    fn hover_path_follows_the_hovered_point() {
        let mut s = session();
        s.toggle_pause();
        let x4 = s.linkage().point_by_suffix(4).unwrap();
        let x4_path = s.path().cloned();

        // joint, then the traced point: the joint's path must not linger
        s.pointer_move(at(&s, 2));
        assert!(s.hover_path().is_some());
        s.pointer_move(at(&s, 4));
        assert_eq!(s.hovered(), Some(x4));
        assert!(s.hover_path().is_none());
        assert!(!s.trace_hovered());
        assert_eq!(s.traced_point(), Some(x4));
        assert_eq!(s.path().cloned(), x4_path);

        // joint, then straight onto a ground point
        s.pointer_move(at(&s, 2));
        assert!(s.hover_path().is_some());
        s.pointer_move(at(&s, 3));
        assert!(s.linkage().is_ground(s.hovered().unwrap().x));
        assert!(s.hover_path().is_none());
        assert!(s.scene().hover_path.is_none());
        assert!(!s.trace_hovered());
        assert_eq!(s.path().cloned(), x4_path);
    }

    #[test]
    fn traced_path_matches_the_point_it_traces() {
        let mut s = session();
        s.toggle_pause();
        let x2 = s.linkage().point_by_suffix(2).unwrap();
        s.pointer_move(at(&s, 2));
        assert!(s.trace_hovered());
        let want = trace_path(s.linkage(), x2, s.cfg.kin.samples).unwrap();
        assert_eq!(s.path(), Some(&want));
        // now traced, so no separate hover path
        assert!(s.hover_path().is_none());
    }

    #[test]
    fn deleting_traced_point_clears_path() {
        let mut s = session();
        s.toggle_pause();
        s.pointer_move(at(&s, 4));
        assert!(s.delete_hovered());
        assert!(s.traced_point().is_none());
        assert!(s.path().is_none());
    }

    #[test]
    fn scene_reflects_session() {
        let mut s = session();
        s.toggle_pause();
        s.pointer_up(vector![0.6, 0.0]);
        s.pointer_move(vector![0.7, 0.1]);
        let scene = s.scene();
        assert_eq!(scene.segments.len(), 3);
        assert_eq!(scene.traced.as_ref().map(Vec::len), Some(126));
        assert_eq!(scene.preview, vec![[0.6, 0.0], [0.7, 0.1]]);
        assert!(scene.highlighted.is_empty());
    }
}
