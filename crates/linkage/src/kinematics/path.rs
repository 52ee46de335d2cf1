//! Closed curves traced over one revolution of the driver.

use std::f64::consts::TAU;

use super::eval::{evaluate, KinematicsError};
use crate::geometry::Point;
use crate::model::{Linkage, PointRef};

/// Closed polyline; the first point is repeated at the end.
pub type Polyline = Vec<Point>;

/// Default number of driver angles per revolution.
pub const DEFAULT_SAMPLES: usize = 125;

#[inline]
fn sample_angle(i: usize, samples: usize) -> f64 {
    (i as f64) * TAU / (samples as f64)
}

/// Trace `point` over `samples` evenly spaced driver angles in `[0, 2π)`.
///
/// Fails if any sample is unreachable: the path only exists when the mechanism
/// survives the whole revolution. The result has `samples + 1` points.
pub fn trace_path(
    linkage: &Linkage,
    point: PointRef,
    samples: usize,
) -> Result<Polyline, KinematicsError> {
    let n = samples.max(1);
    let mut path = Vec::with_capacity(n + 1);
    for i in 0..n {
        let vars = evaluate(linkage, sample_angle(i, n))?;
        path.push(vars.point(point));
    }
    path.push(path[0]);
    Ok(path)
}

/// Check that every structure stays reachable over a full revolution.
pub fn validate_rotation(linkage: &Linkage, samples: usize) -> Result<(), KinematicsError> {
    let n = samples.max(1);
    for i in 0..n {
        evaluate(linkage, sample_angle(i, n))?;
    }
    Ok(())
}
