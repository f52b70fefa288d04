//! Per-entry state tracked by the spatial index.

use diagraph_types::{EntityId, Point, Rect};
use std::rc::Rc;

/// An interactive component's fine-grained hit predicate, consulted after
/// the index's coarse rect filter accepts a candidate — important for
/// thin targets like connection strokes where the AABB is much larger
/// than the actual paintable hit area.
pub trait HitTarget {
    fn on_hit_box(&self, point: Point) -> bool;
}

/// A target that accepts every point inside its registered rect — the
/// common case for blocks, where the hit box already is the precise
/// target shape.
pub struct AcceptAll;

impl HitTarget for AcceptAll {
    fn on_hit_box(&self, _point: Point) -> bool {
        true
    }
}

pub(crate) struct HitEntry {
    pub(crate) rect: Rect,
    pub(crate) z: i32,
    pub(crate) owner: Rc<dyn HitTarget>,
    pub(crate) insertion_seq: u64,
    pub(crate) hittable: bool,
    pub(crate) affects_usable_rect: bool,
}

/// One match from [`crate::HitTestIndex::test_point`] or
/// [`crate::HitTestIndex::test_box`].
#[derive(Clone)]
pub struct Hit {
    pub id: EntityId,
    pub owner: Rc<dyn HitTarget>,
    pub z: i32,
}
