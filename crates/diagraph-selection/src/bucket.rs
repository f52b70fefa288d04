//! A single entity-type selection bucket.

use crate::cardinality::Cardinality;
use crate::diff::SelectionDiff;
use crate::strategy::Strategy;
use diagraph_foundation::ListenerId;
use diagraph_reactive::Signal;
use diagraph_types::EntityId;
use indexmap::IndexSet;
use std::cell::RefCell;
use std::rc::Rc;

/// What `on_selection_change` decided to do with a pending mutation.
#[derive(Clone)]
pub enum ChangeDecision {
    /// Apply the diff as computed.
    Apply,
    /// Apply this set instead of the computed one.
    ApplyWith(IndexSet<EntityId>),
    /// Do not mutate the bucket; the event never happened.
    Cancel,
}

type ChangeHandler = Rc<dyn Fn(&SelectionDiff) -> ChangeDecision>;

/// One entity type's selection state (): a cardinality, the
/// current set of selected ids (reactive — components subscribed to it
/// re-render when it changes), and an optional change handler that gets a
/// chance to veto or rewrite every mutation before it lands.
pub struct SelectionBucket {
    entity_type: &'static str,
    cardinality: Cardinality,
    selected: Signal<IndexSet<EntityId>>,
    on_change: RefCell<Option<ChangeHandler>>,
}

impl SelectionBucket {
    pub fn new(entity_type: &'static str, cardinality: Cardinality) -> Rc<Self> {
        Rc::new(Self {
            entity_type,
            cardinality,
            selected: Signal::new(IndexSet::new()),
            on_change: RefCell::new(None),
        })
    }

    pub fn entity_type(&self) -> &'static str {
        self.entity_type
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn selection(&self) -> Vec<EntityId> {
        self.selected.peek().into_iter().collect()
    }

    /// Same as [`Self::selection`] but records a dependency when called
    /// while a [`diagraph_reactive::Computed`] is evaluating — used by the
    /// aggregated `$selection` computed so it invalidates on every bucket.
    pub fn selection_tracked(&self) -> Vec<EntityId> {
        self.selected.get().into_iter().collect()
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected.peek().contains(id)
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> ListenerId {
        self.selected.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.selected.unsubscribe(id)
    }

    /// Register the handler consulted before every non-silent mutation.
    /// Replaces any previously-registered handler.
    pub fn on_selection_change(&self, handler: impl Fn(&SelectionDiff) -> ChangeDecision + 'static) {
        *self.on_change.borrow_mut() = Some(Rc::new(handler));
    }

    pub fn clear_on_selection_change(&self) {
        *self.on_change.borrow_mut() = None;
    }

    /// `update_selection` that skips the change handler entirely.
    pub fn update_selection_silent(&self, ids: &[EntityId], select: bool, strategy: Strategy) -> bool {
        let current = self.selected.peek();
        let next = compute_next(&current, ids, select, strategy, self.cardinality);
        if next == current {
            return false;
        }
        self.selected.set(next);
        true
    }

    /// Compute the diff, run it past the change handler (if any), and apply
    /// whatever the handler decided. Returns whether the bucket actually
    /// changed.
    pub fn update_selection(&self, ids: &[EntityId], select: bool, strategy: Strategy) -> bool {
        let current = self.selected.peek();
        let next = compute_next(&current, ids, select, strategy, self.cardinality);
        let diff = SelectionDiff::between(&current, &next);
        if diff.is_noop() {
            return false;
        }

        let handler = self.on_change.borrow().clone();
        match handler {
            None => {
                self.selected.set(next);
                true
            }
            Some(handler) => match handler(&diff) {
                ChangeDecision::Apply => {
                    self.selected.set(next);
                    true
                }
                ChangeDecision::ApplyWith(explicit) => {
                    self.selected.set(explicit);
                    true
                }
                ChangeDecision::Cancel => false,
            },
        }
    }
}

fn compute_next(
    current: &IndexSet<EntityId>,
    ids: &[EntityId],
    select: bool,
    strategy: Strategy,
    cardinality: Cardinality,
) -> IndexSet<EntityId> {
    match cardinality {
        Cardinality::Single => compute_next_single(current, ids, select, strategy),
        Cardinality::Multiple => compute_next_multiple(current, ids, select, strategy),
    }
}

fn compute_next_multiple(
    current: &IndexSet<EntityId>,
    ids: &[EntityId],
    select: bool,
    strategy: Strategy,
) -> IndexSet<EntityId> {
    // Duplicate ids collapse (edge cases).
    let requested: IndexSet<EntityId> = ids.iter().cloned().collect();
    match strategy {
        Strategy::Replace => {
            if select {
                requested
            } else {
                IndexSet::new()
            }
        }
        Strategy::Append => {
            if select {
                current.union(&requested).cloned().collect()
            } else {
                current.difference(&requested).cloned().collect()
            }
        }
        Strategy::Subtract => current.difference(&requested).cloned().collect(),
        Strategy::Toggle => {
            if select {
                current.symmetric_difference(&requested).cloned().collect()
            } else {
                current.difference(&requested).cloned().collect()
            }
        }
    }
}

fn compute_next_single(
    current: &IndexSet<EntityId>,
    ids: &[EntityId],
    select: bool,
    strategy: Strategy,
) -> IndexSet<EntityId> {
    let first = ids.first();
    let selecting = select && matches!(strategy, Strategy::Replace | Strategy::Append | Strategy::Toggle);

    if selecting {
        return match first {
            Some(id) => {
                let mut set = IndexSet::new();
                set.insert(id.clone());
                set
            }
            None => IndexSet::new(),
        };
    }

    // SUBTRACT, or select=false: clear if any of the passed ids is
    // currently selected, otherwise leave untouched.
    if ids.iter().any(|id| current.contains(id)) {
        IndexSet::new()
    } else {
        current.clone()
    }
}
