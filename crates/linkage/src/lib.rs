//! Planar linkage kinematics.
//!
//! Build mechanisms from rotary cranks and two-bar hinges, drive them through a
//! full revolution, and edit them interactively: drag points, add links with a
//! click gesture, remove points.
//!
//! Layout
//! - `geometry`: distances, anchor frames, the two-circle solve.
//! - `model`: variable arena, structures, the JSON literal boundary, presets.
//! - `kinematics`: forward evaluation and closed paths.
//! - `drag`, `gesture`, `delete`: the three ways a linkage gets edited.
//! - `point_map`: point incidence and hit-testing.
//! - `session`, `scene`: host-side state record and render list.
//!
//! The core is single-threaded and pure: every operation takes an explicit
//! snapshot and returns a new value; callers commit whole ground maps or
//! structure lists.

pub mod api;
pub mod cfg;
pub mod delete;
pub mod drag;
pub mod geometry;
pub mod gesture;
pub mod kinematics;
pub mod model;
pub mod point_map;
pub mod scene;
pub mod session;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::{KinCfg, SessionCfg};
pub use geometry::Point;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::{KinCfg, SessionCfg};
    pub use crate::geometry::Point;
    pub use crate::kinematics::{evaluate, trace_path, KinematicsError, Polyline};
    pub use crate::model::{presets, Linkage, LinkageLiteral, ModelError, PointRef, Vars};
    pub use crate::session::Session;
}
