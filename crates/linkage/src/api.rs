//! Curated surface for the CLI and other in-workspace callers.
//!
//! Not a stable API; re-exports move when modules do.

// Model and literal boundary
pub use crate::model::{
    externalize, internalize, presets, Linkage, LinkageLiteral, ModelError, PointRef, Structure,
    Vars,
};
// Evaluation
pub use crate::kinematics::{
    evaluate, trace_path, validate_rotation, KinematicsError, Polyline, DEFAULT_SAMPLES,
};
// Editing
pub use crate::delete::try_remove_point;
pub use crate::drag::{move_point, DragOutcome};
pub use crate::gesture::{reduce, Action, GestureState, Reduction, SideEffect, Snapshot};
pub use crate::point_map::{nearest_point, PointMap};
// Host
pub use crate::scene::Scene;
pub use crate::session::Session;
