//! A single component instance in the tree ("Component tree").

use crate::component::{ChildSpec, Component};
use crate::diff::{reconcile_keys, ReconcileOp};
use crate::key::ChildKey;
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// One instance in the tree: props/state live inside the boxed
/// [`Component`]; everything the kernel itself needs to track about the
/// slot (dirty flags, render-order fields, parent link, quarantine state)
/// lives alongside it here, per 's "Component tree" field list.
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) type_tag: &'static str,
    pub(crate) component: RefCell<Box<dyn Component>>,
    pub(crate) children: RefCell<IndexMap<ChildKey, Rc<Node>>>,
    pub(crate) needs_update: Cell<bool>,
    pub(crate) needs_render: Cell<bool>,
    pub(crate) children_dirty: Cell<bool>,
    pub(crate) z_index: Cell<i32>,
    pub(crate) order: Cell<i32>,
    /// Assigned once at mount time from a process-wide monotonic counter;
    /// never changes thereafter — the canonical render-order tie-break
    /// (Open Question a).
    pub(crate) insertion_index: u64,
    pub(crate) parent: RefCell<Weak<Node>>,
    /// Set when `will_iterate`/`update_children`/`did_iterate`/`render`
    /// panics; cleared the next time `set_props` or `set_state` runs —
    /// quarantined until one of those is called again. A component
    /// exposes no `set_state` hook of its own
    /// in this kernel — `set_props` is the one re-entry point that clears
    /// quarantine, matching how most concrete components fold state resets
    /// into a fresh props application.
    pub(crate) errored: Cell<bool>,
}

impl Node {
    pub(crate) fn new(type_tag: &'static str, component: Box<dyn Component>) -> Rc<Self> {
        let z = component.z_index();
        let order = component.order();
        Rc::new(Self {
            id: NodeId::next(),
            type_tag,
            component: RefCell::new(component),
            children: RefCell::new(IndexMap::new()),
            needs_update: Cell::new(true),
            needs_render: Cell::new(true),
            children_dirty: Cell::new(true),
            z_index: Cell::new(z),
            order: Cell::new(order),
            insertion_index: next_insertion_index(),
            parent: RefCell::new(Weak::new()),
            errored: Cell::new(false),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    pub fn is_errored(&self) -> bool {
        self.errored.get()
    }

    pub fn mark_needs_update(&self) {
        self.needs_update.set(true);
    }

    pub fn mark_needs_render(&self) {
        self.needs_render.set(true);
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update.get()
    }

    pub fn needs_render(&self) -> bool {
        self.needs_render.get()
    }

    pub fn z_index(&self) -> i32 {
        self.z_index.get()
    }

    pub fn order(&self) -> i32 {
        self.order.get()
    }

    pub fn insertion_index(&self) -> u64 {
        self.insertion_index
    }

    pub fn children(&self) -> Vec<Rc<Node>> {
        self.children.borrow().values().cloned().collect()
    }

    pub fn parent(&self) -> Option<Rc<Node>> {
        self.parent.borrow().upgrade()
    }

    /// Replace props on the underlying component and clear quarantine —
    /// 's re-entry point for a previously-errored component.
    pub fn set_props(&self, props: Box<dyn std::any::Any>) {
        self.component.borrow_mut().set_props(props);
        self.errored.set(false);
        self.needs_update.set(true);
    }

    /// Children sorted into stable render order: `(z_index asc, order asc,
    /// insertion_index asc)`.
    pub fn children_in_render_order(&self) -> Vec<Rc<Node>> {
        let mut children = self.children();
        children.sort_by(|a, b| {
            a.z_index()
                .cmp(&b.z_index())
                .then(a.order().cmp(&b.order()))
                .then(a.insertion_index().cmp(&b.insertion_index()))
        });
        children
    }

    /// Run `will_iterate -> update_children -> reconcile -> did_iterate`
    /// for this node only (not its descendants — the caller, `crate::Tree`,
    /// drives the recursive walk). Returns the panic message if any stage
    /// panicked; the caller is responsible for marking the node errored
    /// and reporting it.
    pub(crate) fn run_update_cycle(self: &Rc<Node>) -> Result<(), String> {
        let this = self.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            this.component.borrow_mut().will_iterate();
            let specs = this.component.borrow_mut().update_children();
            this.reconcile_children(specs);
            this.component.borrow_mut().did_iterate();
            this.z_index.set(this.component.borrow().z_index());
            this.order.set(this.component.borrow().order());
        }));
        result.map_err(|payload| panic_message(&payload))
    }

    fn reconcile_children(self: &Rc<Node>, specs: Vec<ChildSpec>) {
        let old_pairs: Vec<(ChildKey, &'static str)> = self
            .children
            .borrow()
            .iter()
            .map(|(k, n)| (k.clone(), n.type_tag))
            .collect();
        let new_pairs: Vec<(ChildKey, &'static str)> =
            specs.iter().map(|s| (s.key.clone(), s.type_tag)).collect();
        let plan = reconcile_keys(
            old_pairs.iter().map(|(k, t)| (k, *t)),
            new_pairs.iter().map(|(k, t)| (k, *t)),
        );

        let mut specs_by_key: HashMap<ChildKey, ChildSpec> =
            specs.into_iter().map(|s| (s.key.clone(), s)).collect();
        let mut new_children = IndexMap::new();

        for (key, op) in plan {
            match op {
                ReconcileOp::Reuse => {
                    let existing = self.children.borrow().get(&key).cloned().expect(
                        "reconcile plan marked Reuse for a key with no existing child",
                    );
                    let spec = specs_by_key.remove(&key).expect("Reuse op missing its spec");
                    existing.set_props(spec.props);
                    new_children.insert(key, existing);
                }
                ReconcileOp::Replace | ReconcileOp::Mount => {
                    let spec = specs_by_key
                        .remove(&key)
                        .expect("Mount/Replace op missing its spec");
                    let child = Node::new(spec.type_tag, (spec.factory)(spec.props));
                    *child.parent.borrow_mut() = Rc::downgrade(self);
                    new_children.insert(key, child);
                }
                ReconcileOp::Unmount => {
                    tracing::trace!(parent = %self.id, %key, "unmounting child");
                }
            }
        }

        *self.children.borrow_mut() = new_children;
        self.children_dirty.set(false);
    }
}

pub(crate) fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "component panicked with a non-string payload".to_string()
    }
}

fn next_insertion_index() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
