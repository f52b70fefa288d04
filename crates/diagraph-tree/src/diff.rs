//! Keyed child-list reconciliation:
//!
//! > same key, same type -> keep instance and call `set_props`; same key,
//! > different type -> unmount old, mount new; key present in new only ->
//! > mount; key present in old only -> unmount.
//!
//! Reduced to the three outcomes this kernel's flat (non-moving) child
//! list actually needs — never asks for a `Move` op, since
//! children are always re-ordered into the stable render sort rather than
//! an in-place DOM-style reorder.

use crate::key::ChildKey;
use indexmap::IndexMap;

/// One reconciliation outcome for a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOp {
    /// Existing instance at this key is reusable; call `set_props`.
    Reuse,
    /// Existing instance's type changed; unmount then mount a new one.
    Replace,
    /// No existing instance at this key; mount.
    Mount,
    /// Existing instance not present in the new list; unmount.
    Unmount,
}

/// Compute the reconciliation plan for one node's children.
///
/// `old` is `(key, type_tag)` pairs for the currently-mounted children, in
/// their existing order. `new` is the same shape for the
/// `update_children()` result. Returns an ordered map (new list order,
/// including keys slated for `Unmount` appended at the end since they have
/// no position in the new order) from key to [`ReconcileOp`].
pub fn reconcile_keys<'a>(
    old: impl IntoIterator<Item = (&'a ChildKey, &'static str)>,
    new: impl IntoIterator<Item = (&'a ChildKey, &'static str)>,
) -> IndexMap<ChildKey, ReconcileOp> {
    let old_types: std::collections::HashMap<&ChildKey, &'static str> = old.into_iter().collect();
    let mut plan = IndexMap::new();

    for (key, type_tag) in new {
        let op = match old_types.get(key) {
            Some(&old_tag) if old_tag == type_tag => ReconcileOp::Reuse,
            Some(_) => ReconcileOp::Replace,
            None => ReconcileOp::Mount,
        };
        plan.insert(key.clone(), op);
    }

    for key in old_types.keys() {
        if !plan.contains_key(*key) {
            plan.insert((*key).clone(), ReconcileOp::Unmount);
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(s: &str) -> ChildKey {
        ChildKey::new(s)
    }

    #[test]
    fn same_key_same_type_is_reuse() {
        let old = vec![(k("a"), "block")];
        let new = vec![(k("a"), "block")];
        let plan = reconcile_keys(old.iter().map(|(k, t)| (k, *t)), new.iter().map(|(k, t)| (k, *t)));
        assert_eq!(plan[&k("a")], ReconcileOp::Reuse);
    }

    #[test]
    fn same_key_different_type_is_replace() {
        let old = vec![(k("a"), "block")];
        let new = vec![(k("a"), "group")];
        let plan = reconcile_keys(old.iter().map(|(k, t)| (k, *t)), new.iter().map(|(k, t)| (k, *t)));
        assert_eq!(plan[&k("a")], ReconcileOp::Replace);
    }

    #[test]
    fn key_only_in_new_is_mount() {
        let old: Vec<(ChildKey, &str)> = vec![];
        let new = vec![(k("a"), "block")];
        let plan = reconcile_keys(old.iter().map(|(k, t)| (k, *t)), new.iter().map(|(k, t)| (k, *t)));
        assert_eq!(plan[&k("a")], ReconcileOp::Mount);
    }

    #[test]
    fn key_only_in_old_is_unmount() {
        let old = vec![(k("a"), "block")];
        let new: Vec<(ChildKey, &str)> = vec![];
        let plan = reconcile_keys(old.iter().map(|(k, t)| (k, *t)), new.iter().map(|(k, t)| (k, *t)));
        assert_eq!(plan[&k("a")], ReconcileOp::Unmount);
    }
}
