//! The hit-test index itself.

use crate::entry::{Hit, HitEntry, HitTarget};
use crate::grid::UniformGrid;
use diagraph_types::{EntityId, Point, Rect};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Default cell size in world units. Chosen so a typical block (tens of
/// world units across) touches a handful of cells, not hundreds.
const DEFAULT_CELL_SIZE: f64 = 128.0;

pub struct HitTestIndex {
    grid: RefCell<UniformGrid>,
    entries: RefCell<ahash::HashMap<EntityId, HitEntry>>,
    insertion_counter: Cell<u64>,
    dirty: Cell<bool>,
    once_update: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Default for HitTestIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl HitTestIndex {
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE)
    }

    pub fn with_cell_size(cell_size: f64) -> Self {
        Self {
            grid: RefCell::new(UniformGrid::new(cell_size)),
            entries: RefCell::new(ahash::HashMap::default()),
            insertion_counter: Cell::new(0),
            dirty: Cell::new(false),
            once_update: RefCell::new(Vec::new()),
        }
    }

    fn next_insertion_seq(&self) -> u64 {
        let seq = self.insertion_counter.get();
        self.insertion_counter.set(seq + 1);
        seq
    }

    /// Register a new hittable entry. Re-inserting an existing `id`
    /// replaces it (equivalent to `remove` then `insert`).
    pub fn insert(&self, id: EntityId, rect: Rect, z: i32, owner: Rc<dyn HitTarget>) {
        self.insert_with_flags(id, rect, z, owner, true, true);
    }

    pub fn insert_with_flags(
        &self,
        id: EntityId,
        rect: Rect,
        z: i32,
        owner: Rc<dyn HitTarget>,
        hittable: bool,
        affects_usable_rect: bool,
    ) {
        if self.entries.borrow().contains_key(&id) {
            self.remove(&id);
        }
        self.grid.borrow_mut().insert(&id, &rect);
        let entry = HitEntry {
            rect,
            z,
            owner,
            insertion_seq: self.next_insertion_seq(),
            hittable,
            affects_usable_rect,
        };
        self.entries.borrow_mut().insert(id, entry);
        self.dirty.set(true);
    }

    /// Update an existing entry's rect, preserving its z/owner/flags and
    /// insertion order.
    pub fn update(&self, id: &EntityId, rect: Rect) {
        let mut entries = self.entries.borrow_mut();
        let Some(entry) = entries.get_mut(id) else {
            tracing::debug!(%id, "hit-test update for unknown id ignored");
            return;
        };
        let old_rect = entry.rect;
        entry.rect = rect;
        drop(entries);
        let mut grid = self.grid.borrow_mut();
        grid.remove(id, &old_rect);
        grid.insert(id, &rect);
        drop(grid);
        self.dirty.set(true);
    }

    pub fn remove(&self, id: &EntityId) {
        if let Some(entry) = self.entries.borrow_mut().remove(id) {
            self.grid.borrow_mut().remove(id, &entry.rect);
            self.dirty.set(true);
        }
    }

    /// Hits at `(x, y)`, topmost first: `(z desc, insertion desc)`, after
    /// both the rect containment check and each candidate's
    /// `on_hit_box` predicate pass.
    pub fn test_point(&self, x: f64, y: f64) -> Vec<Hit> {
        let point = Point::new(x, y);
        let candidates = self.grid.borrow().candidates_for_point(x, y);
        self.resolve(candidates, |entry| {
            entry.hittable && entry.rect.contains_point(point) && entry.owner.on_hit_box(point)
        })
    }

    /// Hits whose rect intersects `rect`, same ordering as [`Self::test_point`].
    /// `on_hit_box` is consulted with the rect's center as a representative
    /// point — box queries are a coarser operation than point queries by
    /// nature, and callers that need stroke-accurate results should fall
    /// back to `test_point` over the candidate set themselves.
    pub fn test_box(&self, rect: Rect) -> Vec<Hit> {
        let candidates = self.grid.borrow().candidates_for_rect(&rect);
        let center = rect.center();
        self.resolve(candidates, |entry| {
            entry.hittable && entry.rect.intersects(&rect) && entry.owner.on_hit_box(center)
        })
    }

    fn resolve(&self, candidates: Vec<EntityId>, accept: impl Fn(&HitEntry) -> bool) -> Vec<Hit> {
        let entries = self.entries.borrow();
        let mut hits: Vec<Hit> = candidates
            .into_iter()
            .filter_map(|id| {
                let entry = entries.get(&id)?;
                if accept(entry) {
                    Some((
                        entry.insertion_seq,
                        Hit {
                            id,
                            owner: entry.owner.clone(),
                            z: entry.z,
                        },
                    ))
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|(seq, hit)| (seq, hit))
            .collect();

        hits.sort_by(|(seq_a, hit_a), (seq_b, hit_b)| {
            hit_b.z.cmp(&hit_a.z).then(seq_b.cmp(seq_a))
        });
        hits.into_iter().map(|(_, hit)| hit).collect()
    }

    /// The bounding union of every entry with `affects_usable_rect = true`
    /// ("Affect on usable-rect") — feeds `zoom_to("center")`.
    pub fn usable_rect(&self) -> Option<Rect> {
        Rect::union_all(
            self.entries
                .borrow()
                .values()
                .filter(|entry| entry.affects_usable_rect)
                .map(|entry| entry.rect),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a callback to run once, the next time [`Self::flush`]
    /// observes pending structural edits (`once("update", cb)`).
    pub fn once_update(&self, callback: impl FnOnce() + 'static) {
        self.once_update.borrow_mut().push(Box::new(callback));
    }

    /// Drain and invoke queued `once("update")` callbacks if any
    /// insert/update/remove happened since the last flush. Called once per
    /// frame by the scheduler's hit-index-maintenance phase.
    pub fn flush(&self) {
        if !self.dirty.replace(false) {
            return;
        }
        let callbacks = std::mem::take(&mut *self.once_update.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AcceptAll;

    #[test]
    fn test_point_respects_z_desc_then_insertion_desc() {
        let index = HitTestIndex::new();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);

        index.insert(EntityId::from_str("low-z"), rect, 0, Rc::new(AcceptAll));
        index.insert(EntityId::from_str("high-z"), rect, 5, Rc::new(AcceptAll));
        index.insert(EntityId::from_str("same-z-later"), rect, 5, Rc::new(AcceptAll));

        let hits = index.test_point(5.0, 5.0);
        let ids: Vec<_> = hits.iter().map(|h| h.id.to_string()).collect();
        assert_eq!(ids, vec!["same-z-later", "high-z", "low-z"]);
    }

    #[test]
    fn on_hit_box_predicate_rejects_false_positives() {
        struct NeverHits;
        impl HitTarget for NeverHits {
            fn on_hit_box(&self, _point: Point) -> bool {
                false
            }
        }

        let index = HitTestIndex::new();
        index.insert(
            EntityId::from_str("a"),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            0,
            Rc::new(NeverHits),
        );

        assert!(index.test_point(5.0, 5.0).is_empty());
    }

    #[test]
    fn update_moves_entry_to_its_new_cells() {
        let index = HitTestIndex::new();
        let id = EntityId::from_str("a");
        index.insert(id.clone(), Rect::new(0.0, 0.0, 10.0, 10.0), 0, Rc::new(AcceptAll));
        assert!(!index.test_point(5.0, 5.0).is_empty());

        index.update(&id, Rect::new(1000.0, 1000.0, 10.0, 10.0));
        assert!(index.test_point(5.0, 5.0).is_empty());
        assert!(!index.test_point(1005.0, 1005.0).is_empty());
    }

    #[test]
    fn usable_rect_excludes_non_contributing_entries() {
        let index = HitTestIndex::new();
        index.insert_with_flags(
            EntityId::from_str("contributes"),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            0,
            Rc::new(AcceptAll),
            true,
            true,
        );
        index.insert_with_flags(
            EntityId::from_str("excluded"),
            Rect::new(1000.0, 1000.0, 10.0, 10.0),
            0,
            Rc::new(AcceptAll),
            true,
            false,
        );

        assert_eq!(index.usable_rect(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn once_update_fires_only_after_a_structural_edit_and_only_once() {
        let index = HitTestIndex::new();
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        index.once_update(move || f.set(f.get() + 1));

        index.flush();
        assert_eq!(fired.get(), 0, "no edits yet, callback must not fire");

        index.insert(EntityId::from_str("a"), Rect::new(0.0, 0.0, 1.0, 1.0), 0, Rc::new(AcceptAll));
        index.flush();
        assert_eq!(fired.get(), 1);

        index.flush();
        assert_eq!(fired.get(), 1, "second flush with no new edits must not re-fire");
    }
}
