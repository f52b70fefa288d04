//! A generic reactive entity table: an id-list signal plus one per-entity
//! signal, shared by the block/connection/anchor/group stores.

use crate::entity::Identified;
use crate::fingerprint::ids_changed;
use diagraph_reactive::Signal;
use diagraph_types::EntityId;
use std::cell::RefCell;
use std::rc::Rc;

pub struct EntityTable<T: Identified + Clone + PartialEq + 'static> {
    ids: Signal<Vec<EntityId>>,
    entities: Rc<RefCell<ahash::HashMap<EntityId, Signal<T>>>>,
    id_set: Rc<RefCell<ahash::HashSet<EntityId>>>,
}

impl<T: Identified + Clone + PartialEq + 'static> Clone for EntityTable<T> {
    fn clone(&self) -> Self {
        Self {
            ids: self.ids.clone(),
            entities: self.entities.clone(),
            id_set: self.id_set.clone(),
        }
    }
}

impl<T: Identified + Clone + PartialEq + 'static> Default for EntityTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identified + Clone + PartialEq + 'static> EntityTable<T> {
    pub fn new() -> Self {
        Self {
            ids: Signal::new(Vec::new()),
            entities: Rc::new(RefCell::new(ahash::HashMap::default())),
            id_set: Rc::new(RefCell::new(ahash::HashSet::default())),
        }
    }

    /// The id list as a signal — subscribe to react to membership changes
    /// (insertions/removals), not per-entity field changes.
    pub fn ids(&self) -> Signal<Vec<EntityId>> {
        self.ids.clone()
    }

    pub fn get(&self, id: &EntityId) -> Option<Signal<T>> {
        self.entities.borrow().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.borrow().contains_key(id)
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.ids
            .peek()
            .iter()
            .filter_map(|id| self.entities.borrow().get(id).map(Signal::peek))
            .collect()
    }

    /// Replace the entire table with `list`. Existing entities present in
    /// both the old and new lists are updated in place through their own
    /// signal (so unrelated field changes still notify per-entity
    /// subscribers even when the id set itself didn't change); removed
    /// entities are dropped. The id-list signal only notifies when the
    /// membership fingerprint actually changed — reordering the same ids
    /// is not a change.
    ///
    /// Returns whether the membership fingerprint changed.
    pub fn set_all(&self, list: Vec<T>) -> bool {
        let new_ids: Vec<EntityId> = list.iter().map(|item| item.entity_id().clone()).collect();
        let new_id_set: ahash::HashSet<EntityId> = new_ids.iter().cloned().collect();
        let changed = ids_changed(&self.id_set.borrow(), &new_id_set);

        {
            let mut entities = self.entities.borrow_mut();
            for item in list {
                let id = item.entity_id().clone();
                match entities.get(&id) {
                    Some(signal) => signal.set(item),
                    None => {
                        entities.insert(id, Signal::new(item));
                    }
                }
            }
            entities.retain(|id, _| new_id_set.contains(id));
        }

        if changed {
            *self.id_set.borrow_mut() = new_id_set;
            self.ids.set(new_ids);
        }

        changed
    }

    /// Apply `f` to the existing entity `id`'s current value and write the
    /// result back through its signal. Never changes table membership —
    /// this is `update_*(list_partial)`'s per-entity half; a no-op
    /// (returns `false`) if `id` is not present.
    pub fn patch(&self, id: &EntityId, f: impl FnOnce(&mut T)) -> bool {
        let Some(signal) = self.entities.borrow().get(id).cloned() else {
            return false;
        };
        let mut value = signal.peek();
        f(&mut value);
        signal.set(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagraph_types::EntityId;

    #[derive(Debug, Clone, PartialEq)]
    struct Dummy {
        id: EntityId,
        value: i32,
    }

    impl Identified for Dummy {
        fn entity_id(&self) -> &EntityId {
            &self.id
        }
    }

    #[test]
    fn set_all_notifies_ids_signal_only_on_membership_change() {
        let table: EntityTable<Dummy> = EntityTable::new();
        let events = Rc::new(RefCell::new(0));
        let e = events.clone();
        table.ids().subscribe(move || *e.borrow_mut() += 1);

        table.set_all(vec![
            Dummy { id: EntityId::from_str("a"), value: 1 },
            Dummy { id: EntityId::from_str("b"), value: 2 },
        ]);
        assert_eq!(*events.borrow(), 1);

        // Same ids, different order + different field values: membership
        // unchanged, so the ids signal must not fire again...
        table.set_all(vec![
            Dummy { id: EntityId::from_str("b"), value: 20 },
            Dummy { id: EntityId::from_str("a"), value: 10 },
        ]);
        assert_eq!(*events.borrow(), 1);

        // ...but the per-entity signal for "a" must reflect the new value.
        let a = table.get(&EntityId::from_str("a")).unwrap();
        assert_eq!(a.peek().value, 10);
    }

    #[test]
    fn set_all_drops_removed_entities() {
        let table: EntityTable<Dummy> = EntityTable::new();
        table.set_all(vec![Dummy { id: EntityId::from_str("a"), value: 1 }]);
        assert!(table.contains(&EntityId::from_str("a")));

        table.set_all(vec![Dummy { id: EntityId::from_str("b"), value: 2 }]);
        assert!(!table.contains(&EntityId::from_str("a")));
        assert!(table.contains(&EntityId::from_str("b")));
    }

    #[test]
    fn patch_updates_without_touching_membership() {
        let table: EntityTable<Dummy> = EntityTable::new();
        table.set_all(vec![Dummy { id: EntityId::from_str("a"), value: 1 }]);

        let events = Rc::new(RefCell::new(0));
        let e = events.clone();
        table.ids().subscribe(move || *e.borrow_mut() += 1);

        let patched = table.patch(&EntityId::from_str("a"), |d| d.value = 99);
        assert!(patched);
        assert_eq!(table.get(&EntityId::from_str("a")).unwrap().peek().value, 99);
        assert_eq!(*events.borrow(), 0, "patch must not touch the id-list signal");
    }
}
