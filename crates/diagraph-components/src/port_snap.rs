//! Port snapping during connection creation (): "a
//! proximity query against anchor/port positions (radius configurable)
//! selects a target port; a per-port predicate
//! `snap_condition(source,target) -> bool` may reject invalid snaps
//! (e.g. direction mismatch, same block)."

use diagraph_types::{AnchorDirection, EntityId, Point};

/// A candidate port considered by [`find_snap_target`]: enough of an
/// anchor's fields to run a snap predicate against, without pulling in
/// the rest of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PortCandidate {
    pub id: EntityId,
    pub owner_block: EntityId,
    pub direction: AnchorDirection,
    pub position: Point,
}

/// Find the closest candidate within `radius` of `point` that also
/// passes `snap_condition(source, candidate)`. Ties (equal distance) are
/// broken by candidate order, matching the deterministic ordering used
/// elsewhere in this workspace (insertion/submission order as the
/// tie-break, never an unspecified hash order).
pub fn find_snap_target<'a>(
    point: Point,
    candidates: &'a [PortCandidate],
    radius: f64,
    source: Option<&PortCandidate>,
    snap_condition: impl Fn(Option<&PortCandidate>, &PortCandidate) -> bool,
) -> Option<&'a PortCandidate> {
    candidates
        .iter()
        .map(|candidate| (candidate, point.distance_to(candidate.position)))
        .filter(|(candidate, distance)| *distance <= radius && snap_condition(source, candidate))
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).expect("distance is never NaN"))
        .map(|(candidate, _)| candidate)
}

/// A common `snap_condition`: reject same-block snaps and require
/// opposite directions (an `Out` port may only connect to an `In` port).
pub fn default_snap_condition(source: Option<&PortCandidate>, target: &PortCandidate) -> bool {
    match source {
        None => true,
        Some(source) => {
            source.owner_block != target.owner_block && source.direction != target.direction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, owner: &str, direction: AnchorDirection, x: f64, y: f64) -> PortCandidate {
        PortCandidate {
            id: EntityId::from_str(id),
            owner_block: EntityId::from_str(owner),
            direction,
            position: Point::new(x, y),
        }
    }

    #[test]
    fn picks_the_nearest_candidate_within_radius() {
        let candidates = vec![
            candidate("far", "b", AnchorDirection::In, 100.0, 100.0),
            candidate("near", "b", AnchorDirection::In, 1.0, 1.0),
        ];
        let found = find_snap_target(Point::new(0.0, 0.0), &candidates, 50.0, None, |_, _| true);
        assert_eq!(found.unwrap().id, EntityId::from_str("near"));
    }

    #[test]
    fn rejects_candidates_outside_the_radius() {
        let candidates = vec![candidate("far", "b", AnchorDirection::In, 100.0, 100.0)];
        let found = find_snap_target(Point::new(0.0, 0.0), &candidates, 5.0, None, |_, _| true);
        assert!(found.is_none());
    }

    #[test]
    fn default_condition_rejects_same_block_and_same_direction() {
        let source = candidate("s", "a", AnchorDirection::Out, 0.0, 0.0);
        let same_block = candidate("t1", "a", AnchorDirection::In, 1.0, 0.0);
        let same_direction = candidate("t2", "b", AnchorDirection::Out, 1.0, 0.0);
        let valid = candidate("t3", "b", AnchorDirection::In, 1.0, 0.0);

        assert!(!default_snap_condition(Some(&source), &same_block));
        assert!(!default_snap_condition(Some(&source), &same_direction));
        assert!(default_snap_condition(Some(&source), &valid));
    }
}
