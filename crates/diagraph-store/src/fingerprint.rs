//! Cheap collection change-detection ("fingerprinting") used by
//! [`crate::EntityTable::set_all`] in place of a sort-and-deep-equality
//! check.

use diagraph_types::EntityId;

/// A change exists iff `|new| != |old|` OR some `id in new`
/// is not in `old`. Order-insensitive: a permutation of the same id set is
/// not a change.
pub fn ids_changed(old: &ahash::HashSet<EntityId>, new: &ahash::HashSet<EntityId>) -> bool {
    if old.len() != new.len() {
        return true;
    }
    new.iter().any(|id| !old.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> ahash::HashSet<EntityId> {
        ids.iter().map(|s| EntityId::from_str(*s)).collect()
    }

    #[test]
    fn permutation_of_the_same_ids_is_not_a_change() {
        let old = set(&["a", "b", "c"]);
        let new = set(&["c", "a", "b"]);
        assert!(!ids_changed(&old, &new));
    }

    #[test]
    fn replacing_one_id_is_a_change() {
        let old: ahash::HashSet<EntityId> = (0..100).map(|i| EntityId::Int(i)).collect();
        let mut new = old.clone();
        new.remove(&EntityId::Int(50));
        new.insert(EntityId::Int(1000));
        assert!(ids_changed(&old, &new));
    }

    #[test]
    fn different_cardinality_is_a_change() {
        let old = set(&["a", "b"]);
        let new = set(&["a", "b", "c"]);
        assert!(ids_changed(&old, &new));
    }
}
