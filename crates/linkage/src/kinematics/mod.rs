//! Kinematics evaluator.
//!
//! - `evaluate`: all variables at one driver angle (structures in list order).
//! - `trace_path`: closed curve of one point over a full revolution.
//! - `validate_rotation`: the same sweep when no point is traced.
//!
//! `KinematicsError::DegenerateTriangle` is the only failure and the shared
//! validity oracle of the drag solver and link creation.

mod eval;
mod path;

pub use eval::{evaluate, KinematicsError};
pub use path::{trace_path, validate_rotation, Polyline, DEFAULT_SAMPLES};

#[cfg(test)]
mod tests;
