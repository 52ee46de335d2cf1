use super::*;
use crate::geometry::{circle_intersection, euclid, FrameCoords};
use crate::model::{externalize, internalize, presets, Linkage, LinkageLiteral};
use nalgebra::vector;
use proptest::prelude::*;
use std::f64::consts::{PI, TAU};

/// Lone hinge between ground points (0, 0) and (l2 cos a, l2 sin a).
fn lone_hinge(l0: f64, l1: f64, l2: f64, a: f64) -> Linkage {
    let lit: LinkageLiteral = serde_json::from_value(serde_json::json!({
        "structures": [
            {"type": "hinge",
             "input": {"l0r": "l0", "l1r": "l1",
                       "x0r": "x0", "y0r": "y0", "x1r": "x1", "y1r": "y1"},
             "output": {"x2r": "x2", "y2r": "y2"}}
        ],
        "initialVars": {"l0": l0, "l1": l1, "x0": 0.0, "y0": 0.0,
                        "x1": l2 * a.cos(), "y1": l2 * a.sin()}
    }))
    .unwrap();
    Linkage::from_literal(&lit).unwrap()
}

fn set(lk: &mut Linkage, key: &str, value: f64) {
    let id = lk.vars.resolve(key).unwrap();
    lk.ground.set(id, value);
}

/// Hinge on ground 0 and a small crank tip, captured on the negative side.
fn lower_branch_literal() -> LinkageLiteral {
    serde_json::from_str(
        r#"{
          "structures": [
            {"type": "rotary", "input": {"lr": "l0", "x0r": "x1", "y0r": "y1", "fr": "f0"},
             "output": {"x1r": "x2", "y1r": "y2"}},
            {"type": "hinge",
             "input": {"xtr": "x3", "ytr": "y3", "l2tr": "l1",
                       "x0r": "x0", "y0r": "y0", "x1r": "x2", "y1r": "y2"},
             "output": {"x2r": "x4", "y2r": "y4"}}
          ],
          "initialVars": {"x0": 0, "y0": 0, "x1": 1, "y1": 0, "l0": 0.1, "f0": 0,
                          "x3": 0.5, "y3": -0.3, "l1": 1.1}
        }"#,
    )
    .unwrap()
}

#[test]
fn four_bar_reference_pose() {
    let lk = presets::four_bar_coupler();
    let vars = evaluate(&lk, 0.0).unwrap();
    let p = |s| vars.point(lk.point_by_suffix(s).unwrap());
    assert!((p(1) - vector![-0.15, 0.0]).norm() < 1e-12);
    // rocker joint sits above the crank-tip → ground-3 line
    let x2 = p(2);
    assert!((x2.x - 0.075).abs() < 1e-12);
    assert!((x2.y - 0.199375f64.sqrt()).abs() < 1e-12);
    assert!((euclid(p(4), x2) - 0.8).abs() < 1e-12);
    assert!((euclid(p(4), p(1)) - 0.5).abs() < 1e-12);
}

#[test]
fn crank_tip_follows_driver_angle() {
    let lk = presets::four_bar_coupler();
    let tip = lk.point_by_suffix(1).unwrap();
    for k in 0..16 {
        let theta = k as f64 * 0.4;
        let v = evaluate(&lk, theta).unwrap();
        let want = vector![-0.4 + 0.25 * theta.cos(), 0.25 * theta.sin()];
        assert!((v.point(tip) - want).norm() < 1e-12, "theta={theta}");
    }
    // phase shifts the crank
    let mut shifted = lk.clone();
    set(&mut shifted, "f0", PI);
    let v = evaluate(&shifted, 0.0).unwrap();
    assert!((v.point(tip) - vector![-0.65, 0.0]).norm() < 1e-12);
}

#[test]
fn trace_path_is_closed() {
    let lk = presets::four_bar_coupler();
    let coupler = lk.point_by_suffix(presets::FOUR_BAR_TRACE_SUFFIX).unwrap();
    let path = trace_path(&lk, coupler, DEFAULT_SAMPLES).unwrap();
    assert_eq!(path.len(), DEFAULT_SAMPLES + 1);
    assert_eq!(path[0], path[DEFAULT_SAMPLES]);
    let at_zero = evaluate(&lk, 0.0).unwrap().point(coupler);
    assert_eq!(path[0], at_zero);
    // zero samples still yields a closed (degenerate) curve
    assert_eq!(trace_path(&lk, coupler, 0).unwrap().len(), 2);
}

#[test]
fn out_of_reach_hinge_fails_part_way_round() {
    let mut lk = presets::four_bar_coupler();
    // reaches the crank tip at theta = 0 (distance 0.45), not at theta = pi (0.95)
    set(&mut lk, "l1", 0.35);
    set(&mut lk, "l2", 0.3);
    assert!(evaluate(&lk, 0.0).is_ok());
    assert_eq!(
        evaluate(&lk, PI),
        Err(KinematicsError::DegenerateTriangle { structure: 1 })
    );
    assert!(validate_rotation(&lk, DEFAULT_SAMPLES).is_err());
    let coupler = lk.point_by_suffix(4).unwrap();
    assert!(trace_path(&lk, coupler, DEFAULT_SAMPLES).is_err());
}

#[test]
fn degenerate_error_names_the_structure() {
    let e = KinematicsError::DegenerateTriangle { structure: 2 };
    assert_eq!(e.to_string(), "structure 2: link lengths don't make a triangle");
}

#[test]
fn local_frame_hinge_keeps_its_branch() {
    let lk = Linkage::from_literal(&lower_branch_literal()).unwrap();
    let p0 = lk.point_by_suffix(0).unwrap();
    let tip = lk.point_by_suffix(2).unwrap();
    let out = lk.point_by_suffix(4).unwrap();
    let v = evaluate(&lk, 0.0).unwrap();
    assert!((v.point(out) - vector![0.5, -0.3]).norm() < 1e-12);
    for i in 0..DEFAULT_SAMPLES {
        let theta = i as f64 * TAU / DEFAULT_SAMPLES as f64;
        let v = evaluate(&lk, theta).unwrap();
        let f = FrameCoords::from_points(v.point(p0), v.point(tip), v.point(out)).unwrap();
        assert!(f.yt < 0.0, "flipped at theta={theta}");
    }
}

#[test]
fn externalized_hinge_loses_lower_branch() {
    let lk = Linkage::from_literal(&lower_branch_literal()).unwrap();
    let ext = externalize(&lk);
    let out = lk.point_by_suffix(4).unwrap();
    let v = evaluate(&ext, 0.0).unwrap();
    assert!((v.point(out) - vector![0.5, 0.3]).norm() < 1e-12);
}

proptest! {
    #[test]
    fn hinge_outputs_keep_link_lengths(theta in 0.0f64..TAU) {
        let lk = presets::four_bar_coupler();
        let v = evaluate(&lk, theta).unwrap();
        let p = |s| v.point(lk.point_by_suffix(s).unwrap());
        prop_assert!((euclid(p(2), p(1)) - 0.5).abs() < 1e-9);
        prop_assert!((euclid(p(2), p(3)) - 0.5).abs() < 1e-9);
        prop_assert!((euclid(p(4), p(2)) - 0.8).abs() < 1e-9);
        prop_assert!((euclid(p(4), p(1)) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn internal_form_moves_like_external(theta in 0.0f64..TAU, capture in 0.0f64..TAU) {
        let lk = presets::four_bar_coupler();
        let internal = internalize(&lk, capture).unwrap();
        let a = evaluate(&lk, theta).unwrap();
        let b = evaluate(&internal, theta).unwrap();
        for s in 0..5 {
            let p = lk.point_by_suffix(s).unwrap();
            prop_assert!((a.point(p) - b.point(p)).norm() < 1e-9, "point {}", s);
        }
    }

    #[test]
    fn hinge_solves_iff_lengths_make_a_triangle(
        l0 in 0.01f64..2.0,
        l1 in 0.01f64..2.0,
        l2 in 0.01f64..4.0,
        a in 0.0f64..TAU,
    ) {
        // stay clear of the tangent cases
        prop_assume!((l2 - (l0 - l1).abs()).abs() > 1e-6);
        prop_assume!((l2 - (l0 + l1)).abs() > 1e-6);
        let triangle = (l0 - l1).abs() <= l2 && l2 <= l0 + l1;

        let p0 = vector![0.0, 0.0];
        let p1 = vector![l2 * a.cos(), l2 * a.sin()];
        let q = circle_intersection(p0, p1, l0, l1, true);
        prop_assert_eq!(q.is_some(), triangle);
        if let Some(q) = q {
            prop_assert!((euclid(q, p0) - l0).abs() < 1e-7);
            prop_assert!((euclid(q, p1) - l1).abs() < 1e-7);
        }

        let lk = lone_hinge(l0, l1, l2, a);
        match evaluate(&lk, 0.0) {
            Ok(_) => prop_assert!(triangle),
            Err(e) => {
                prop_assert!(!triangle);
                prop_assert_eq!(e, KinematicsError::DegenerateTriangle { structure: 0 });
            }
        }
    }
}
