//! Tunables for evaluation and the interactive session.

use crate::kinematics::DEFAULT_SAMPLES;

/// Kinematics configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KinCfg {
    /// Driver angles sampled per revolution when tracing or validating.
    pub samples: usize,
}

impl Default for KinCfg {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
        }
    }
}

/// Host-side constants (all lengths in linkage coordinates).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionCfg {
    pub kin: KinCfg,
    /// Driver angle increment per animation tick (radians).
    pub angle_step: f64,
    /// Driver angle at session start.
    pub initial_angle: f64,
    /// Hit-test radius around points.
    pub hit_threshold: f64,
    /// Crank length of rotaries added through the gesture machine.
    pub default_crank_length: f64,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            kin: KinCfg::default(),
            angle_step: 0.05,
            initial_angle: 3.7,
            hit_threshold: 0.02,
            default_crank_length: 0.1,
        }
    }
}
