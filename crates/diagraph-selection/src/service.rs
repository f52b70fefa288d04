//! The selection service: one bucket per entity type plus the cross-bucket
//! `REPLACE` policy and the aggregated `$selection` computed.

use crate::bucket::SelectionBucket;
use crate::cardinality::Cardinality;
use crate::strategy::Strategy;
use diagraph_reactive::Computed;
use diagraph_types::EntityId;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Owns every entity type's [`SelectionBucket`] and enforces the one
/// cross-bucket rule: a `REPLACE` on one bucket clears every other one.
pub struct SelectionService {
    buckets: RefCell<IndexMap<&'static str, Rc<SelectionBucket>>>,
    // Rebuilt lazily the next time `selection()` is called after a
    // bucket registration invalidates it.
    aggregated: RefCell<Option<Computed<IndexMap<&'static str, Vec<EntityId>>>>>,
}

impl SelectionService {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            buckets: RefCell::new(IndexMap::new()),
            aggregated: RefCell::new(None),
        })
    }

    /// Register a bucket for `entity_type`. Re-registering an existing type
    /// replaces its bucket (and its selection) and invalidates `$selection`.
    pub fn register_bucket(&self, entity_type: &'static str, cardinality: Cardinality) -> Rc<SelectionBucket> {
        let bucket = SelectionBucket::new(entity_type, cardinality);
        self.buckets.borrow_mut().insert(entity_type, bucket.clone());
        *self.aggregated.borrow_mut() = None;
        bucket
    }

    pub fn bucket(&self, entity_type: &str) -> Option<Rc<SelectionBucket>> {
        self.buckets.borrow().get(entity_type).cloned()
    }

    pub fn entity_types(&self) -> Vec<&'static str> {
        self.buckets.borrow().keys().copied().collect()
    }

    /// `select(entity_type, ids, strategy)` (): applies the
    /// mutation to `entity_type`'s bucket, and when `strategy` is
    /// [`Strategy::Replace`], additionally clears every other bucket.
    /// `SUBTRACT`/`APPEND`/`TOGGLE` never touch other buckets.
    pub fn select(&self, entity_type: &str, ids: &[EntityId], select: bool, strategy: Strategy) -> bool {
        let Some(bucket) = self.bucket(entity_type) else {
            tracing::warn!(entity_type, "select() on an unregistered bucket");
            return false;
        };

        let changed = bucket.update_selection(ids, select, strategy);

        if strategy == Strategy::Replace {
            let others: Vec<Rc<SelectionBucket>> = self
                .buckets
                .borrow()
                .iter()
                .filter(|(ty, _)| **ty != bucket.entity_type())
                .map(|(_, b)| b.clone())
                .collect();
            for other in others {
                other.update_selection(&[], true, Strategy::Replace);
            }
        }

        changed
    }

    /// The aggregated `$selection` computed over every registered bucket.
    /// Built lazily and cached until the next `register_bucket` call.
    pub fn selection(&self) -> Computed<IndexMap<&'static str, Vec<EntityId>>> {
        if let Some(existing) = self.aggregated.borrow().as_ref() {
            return existing.clone();
        }

        let buckets: Vec<Rc<SelectionBucket>> = self.buckets.borrow().values().cloned().collect();
        let computed = Computed::new(move || {
            buckets
                .iter()
                .map(|bucket| (bucket.entity_type(), bucket.selection_tracked()))
                .collect::<IndexMap<_, _>>()
        });

        *self.aggregated.borrow_mut() = Some(computed.clone());
        computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::from_str(s)
    }

    #[test]
    fn replace_on_one_bucket_clears_every_other_bucket() {
        let service = SelectionService::new();
        service.register_bucket("block", Cardinality::Multiple);
        service.register_bucket("connection", Cardinality::Multiple);

        service.select("block", &[id("b1")], true, Strategy::Replace);
        service.select("connection", &[id("c1")], true, Strategy::Replace);

        assert!(service.bucket("block").unwrap().selection().is_empty());
        assert_eq!(service.bucket("connection").unwrap().selection(), vec![id("c1")]);
    }

    #[test]
    fn append_does_not_touch_other_buckets() {
        let service = SelectionService::new();
        service.register_bucket("block", Cardinality::Multiple);
        service.register_bucket("connection", Cardinality::Multiple);

        service.select("block", &[id("b1")], true, Strategy::Replace);
        service.select("connection", &[id("c1")], true, Strategy::Append);

        assert_eq!(service.bucket("block").unwrap().selection(), vec![id("b1")]);
        assert_eq!(service.bucket("connection").unwrap().selection(), vec![id("c1")]);
    }

    #[test]
    fn aggregated_selection_reflects_every_bucket() {
        let service = SelectionService::new();
        service.register_bucket("block", Cardinality::Multiple);
        service.register_bucket("connection", Cardinality::Single);

        service.select("block", &[id("b1"), id("b2")], true, Strategy::Replace);
        service.select("connection", &[id("c1")], true, Strategy::Replace);

        let aggregated = service.selection();
        let snapshot = aggregated.get();
        assert_eq!(snapshot["block"].len(), 2);
        assert_eq!(snapshot["connection"], vec![id("c1")]);
    }

    #[test]
    fn registering_a_new_bucket_invalidates_the_aggregated_computed() {
        let service = SelectionService::new();
        service.register_bucket("block", Cardinality::Multiple);
        let first = service.selection();
        let _ = first.get();

        service.register_bucket("group", Cardinality::Multiple);
        let second = service.selection();
        let snapshot = second.get();
        assert!(snapshot.contains_key("group"));
    }
}
