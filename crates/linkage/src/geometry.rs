//! Planar primitives shared by the evaluator, the drag solver and link creation.
//!
//! - `euclid`: distance between two points.
//! - `FrameCoords`: a point expressed in the frame spanned by two anchors.
//! - `circle_intersection`: the two-circle solve behind every hinge.

use nalgebra::Vector2;

/// A point in the linkage's canonical coordinate space.
pub type Point = Vector2<f64>;

/// Euclidean distance between `a` and `b`.
#[inline]
pub fn euclid(a: Point, b: Point) -> f64 {
    (a - b).norm()
}

/// Coordinates of a third point in the local frame of two anchors.
///
/// The frame has its origin at `p0` and its x axis along `p0 → p1`; `l2` is the
/// anchor distance at the moment the frame was captured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameCoords {
    pub xt: f64,
    pub yt: f64,
    pub l2: f64,
}

impl FrameCoords {
    /// Express `p2` in the frame of `p0 → p1`. None if the anchors coincide.
    pub fn from_points(p0: Point, p1: Point, p2: Point) -> Option<Self> {
        let d = p1 - p0;
        let l2 = d.norm();
        if !(l2.is_finite() && l2 > 0.0) {
            return None;
        }
        let u = d / l2;
        let v = p2 - p0;
        Some(Self {
            xt: u.dot(&v),
            yt: u.x * v.y - u.y * v.x,
            l2,
        })
    }

    /// Link lengths `(|p2-p0|, |p2-p1|)` implied by the captured triangle.
    #[inline]
    pub fn lengths(&self) -> (f64, f64) {
        (
            self.xt.hypot(self.yt),
            (self.xt - self.l2).hypot(self.yt),
        )
    }

    /// Branch selector: true for the non-negative local-y side.
    #[inline]
    pub fn upper(&self) -> bool {
        self.yt >= 0.0
    }
}

/// Intersect the circle of radius `l0` around `p0` with the circle of radius `l1`
/// around `p1`, picking the solution on the `upper` side of `p0 → p1`.
///
/// Returns None when the circles do not meet (or the centers coincide), i.e.
/// when `l0, l1, |p1-p0|` violate the triangle inequality.
pub fn circle_intersection(p0: Point, p1: Point, l0: f64, l1: f64, upper: bool) -> Option<Point> {
    let d = p1 - p0;
    let l2 = d.norm();
    if l2 > l0 + l1 || l0 > l2 + l1 || l1 > l2 + l0 {
        return None;
    }
    if !(l2.is_finite() && l2 > 0.0) {
        return None;
    }
    let xt = (l2 * l2 + l0 * l0 - l1 * l1) / (2.0 * l2);
    // Tangent circles can round slightly below zero.
    let yt_abs = (l0 * l0 - xt * xt).max(0.0).sqrt();
    let yt = if upper { yt_abs } else { -yt_abs };
    let (cos_t, sin_t) = (d.x / l2, d.y / l2);
    let q = Point::new(
        p0.x + xt * cos_t - yt * sin_t,
        p0.y + xt * sin_t + yt * cos_t,
    );
    q.iter().all(|v| v.is_finite()).then_some(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn euclid_axis_aligned() {
        let a = vector![1.0, 1.0];
        let b = vector![4.0, 5.0];
        assert!((euclid(a, b) - 5.0).abs() < 1e-12);
        assert!(euclid(a, a).abs() < 1e-12);
    }

    #[test]
    fn frame_coords_axis_aligned() {
        let f = FrameCoords::from_points(vector![1.0, 0.0], vector![3.0, 0.0], vector![2.0, -1.5])
            .unwrap();
        assert!((f.xt - 1.0).abs() < 1e-12);
        assert!((f.yt + 1.5).abs() < 1e-12);
        assert!((f.l2 - 2.0).abs() < 1e-12);
        assert!(!f.upper());
        assert!(FrameCoords::from_points(vector![1.0, 1.0], vector![1.0, 1.0], vector![0.0, 0.0])
            .is_none());
    }

    #[test]
    fn circle_intersection_recovers_third_vertex_seeded() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p0 = vector![rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)];
            let p1 = vector![rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)];
            let p2 = vector![rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)];
            let Some(frame) = FrameCoords::from_points(p0, p1, p2) else {
                continue;
            };
            if frame.l2 < 1e-3 || frame.yt.abs() < 1e-6 {
                continue;
            }
            let (l0, l1) = frame.lengths();
            let q = circle_intersection(p0, p1, l0, l1, frame.upper()).unwrap();
            assert!((q - p2).norm() < 1e-9, "expected {p2:?}, got {q:?}");
        }
    }

    #[test]
    fn circle_intersection_rejects_disjoint_circles() {
        let p0 = vector![0.0, 0.0];
        let p1 = vector![1.0, 0.0];
        assert!(circle_intersection(p0, p1, 0.3, 0.3, true).is_none());
        assert!(circle_intersection(p0, p1, 2.0, 0.5, true).is_none());
        assert!(circle_intersection(p0, p0, 1.0, 1.0, true).is_none());
        // tangent circles are accepted
        let q = circle_intersection(p0, p1, 0.5, 0.5, false).unwrap();
        assert!((q - vector![0.5, 0.0]).norm() < 1e-9);
    }
}
