//! Point deletion.

use tracing::debug;

use crate::model::{Linkage, PointRef, Structure};
use crate::point_map::PointMap;

/// Remove the structure that owns `point`, together with the ground values
/// nothing else uses anymore.
///
/// Only succeeds when exactly one structure references the point and:
/// - for a rotary: its driven end has no other dependents (anchor or driven end may be picked);
/// - for a hinge: the picked point is the driven one.
///
/// Returns false without touching `linkage` otherwise. The caller rebuilds the
/// point map after a successful removal (structure indices shift).
pub fn try_remove_point(point: PointRef, point_map: &PointMap, linkage: &mut Linkage) -> bool {
    let &[index] = point_map.structures_at(point.x) else {
        debug!(point = %linkage.key(point.x), "not removable: shared or unknown point");
        return false;
    };
    let s = linkage.structures[index];
    let removable = match s {
        Structure::Rotary(r) => point_map.structures_at(r.driven.x).len() == 1,
        Structure::Hinge(_) | Structure::HingeFrame(_) => s.driven().x == point.x,
    };
    if !removable {
        debug!(point = %linkage.key(point.x), structure = index, "not removable in this role");
        return false;
    }

    linkage.structures.remove(index);
    let driven = s.driven();
    linkage.retire(driven.x);
    linkage.retire(driven.y);
    for id in s.params() {
        if linkage.readers_of(id, None) == 0 {
            linkage.retire(id);
        }
    }
    for a in s.anchors() {
        if linkage.is_ground(a.x) && linkage.references_to(a.x, None) == 0 {
            linkage.retire(a.x);
            linkage.retire(a.y);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::evaluate;
    use crate::model::{internalize, presets};

    fn internal_four_bar() -> Linkage {
        internalize(&presets::four_bar_coupler(), 0.0).unwrap()
    }

    #[test]
    fn shared_or_anchor_points_are_refused_without_mutation() {
        let mut lk = internal_four_bar();
        let map = PointMap::build(&lk);
        let before = lk.to_literal();
        // crank tip: 3 structures; rocker joint: 2; ground 3: hinge anchor;
        // ground 0: rotary whose tip has dependents
        for suffix in [1, 2, 3, 0] {
            let p = lk.point_by_suffix(suffix).unwrap();
            assert!(!try_remove_point(p, &map, &mut lk), "point {suffix}");
            assert_eq!(lk.to_literal(), before, "point {suffix}");
        }
    }

    #[test]
    fn peel_four_bar_down_to_nothing() {
        let mut lk = internal_four_bar();
        for suffix in [4, 2, 1] {
            let map = PointMap::build(&lk);
            let p = lk.point_by_suffix(suffix).unwrap();
            assert!(try_remove_point(p, &map, &mut lk), "point {suffix}");
            assert!(lk.check().is_ok());
            assert!(evaluate(&lk, 0.4).is_ok());
        }
        assert!(lk.structures.is_empty());
        assert_eq!(lk.ground.iter().count(), 0);
        assert!(lk.vars.is_empty());
    }

    #[test]
    fn removing_rocker_releases_its_private_anchor() {
        let mut lk = internal_four_bar();
        let map = PointMap::build(&lk);
        let coupler = lk.point_by_suffix(4).unwrap();
        assert!(try_remove_point(coupler, &map, &mut lk));
        assert!(lk.point_by_suffix(4).is_none());
        let map = PointMap::build(&lk);
        let rocker = lk.point_by_suffix(2).unwrap();
        let ground = lk.point_by_suffix(3).unwrap();
        assert!(lk.is_ground(ground.x));
        assert!(try_remove_point(rocker, &map, &mut lk));
        // ground 3 was only used by the rocker
        assert!(!lk.is_ground(ground.x));
        assert!(lk.point_by_suffix(3).is_none());
        // the crank and its anchor survive
        assert_eq!(lk.structures.len(), 1);
        assert!(lk.point_by_suffix(0).is_some());
    }
}
