//! Render list handed to the drawing collaborator.
//!
//! Coordinates are canonical linkage coordinates as `[x, y]` pairs; mapping to
//! pixels is the host's business.

use serde::Serialize;

use crate::geometry::Point;
use crate::model::{Linkage, Structure, Vars};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Scene {
    /// One polyline per structure: rotary anchor → driven, hinge anchor0 → driven → anchor1.
    pub segments: Vec<Vec<[f64; 2]>>,
    /// Path of the traced point.
    pub traced: Option<Vec<[f64; 2]>>,
    /// Path of the hovered point, drawn under the traced one.
    pub hover_path: Option<Vec<[f64; 2]>>,
    /// Pressed and hovered points.
    pub highlighted: Vec<[f64; 2]>,
    /// Gesture rubber band.
    pub preview: Vec<[f64; 2]>,
}

#[inline]
pub fn xy(p: Point) -> [f64; 2] {
    [p.x, p.y]
}

pub fn polyline(points: &[Point]) -> Vec<[f64; 2]> {
    points.iter().copied().map(xy).collect()
}

/// Link polylines of `linkage` at the evaluation `vars`.
///
/// Structures with an undefined coordinate (e.g. before the first successful
/// frame) are left out.
pub fn segments(linkage: &Linkage, vars: &Vars) -> Vec<Vec<[f64; 2]>> {
    linkage
        .structures
        .iter()
        .filter_map(|s| {
            let line: Vec<Point> = match *s {
                Structure::Rotary(r) => vec![vars.point(r.anchor), vars.point(r.driven)],
                Structure::Hinge(_) | Structure::HingeFrame(_) => {
                    let a = s.anchors();
                    vec![vars.point(a[0]), vars.point(s.driven()), vars.point(a[1])]
                }
            };
            line.iter()
                .all(|p| p.iter().all(|v| v.is_finite()))
                .then(|| polyline(&line))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::evaluate;
    use crate::model::presets;

    #[test]
    fn four_bar_segments() {
        let lk = presets::four_bar_coupler();
        let vars = evaluate(&lk, 0.0).unwrap();
        let segs = segments(&lk, &vars);
        assert_eq!(segs.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 3, 3]);
        assert_eq!(segs[0][0], [-0.4, 0.0]);
        assert!((segs[0][1][0] + 0.15).abs() < 1e-12);
        // rocker: crank tip → rocker joint → ground 3
        assert_eq!(segs[1][2], [0.3, 0.0]);
    }

    #[test]
    fn undefined_points_are_skipped() {
        let lk = presets::four_bar_coupler();
        let ground_only = Vars::from_ground(&lk.ground, lk.vars.len());
        assert!(segments(&lk, &ground_only).is_empty());
    }

    #[test]
    fn scene_serializes_as_plain_arrays() {
        let scene = Scene {
            segments: vec![vec![[0.0, 1.0], [2.0, 3.0]]],
            preview: vec![[0.5, 0.5]],
            ..Scene::default()
        };
        let v = serde_json::to_value(&scene).unwrap();
        assert_eq!(v["segments"][0][1][0], 2.0);
        assert!(v["traced"].is_null());
        assert_eq!(v["preview"].as_array().unwrap().len(), 1);
    }
}
