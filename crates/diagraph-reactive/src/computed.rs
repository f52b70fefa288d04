//! `Computed<T>` — a lazy, memoized derivation over signals.

use crate::signal::{ErasedSignal, SignalId};
use crate::tracking;
use diagraph_foundation::{next_listener_id, ListenerId};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComputedId(u64);

impl ComputedId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

thread_local! {
    static EVALUATING: RefCell<HashSet<ComputedId>> = RefCell::new(HashSet::new());
}

struct ComputedInner<T> {
    id: ComputedId,
    compute: RefCell<Box<dyn FnMut() -> T>>,
    cached: RefCell<Option<T>>,
    dirty: Cell<bool>,
    deps: RefCell<Vec<(SignalId, Rc<dyn ErasedSignal>, ListenerId)>>,
    // Listeners fire when the computed transitions clean -> dirty, not on
    // every recompute (mirrors `Signal`'s own listener list rather than
    // `diagraph_foundation::ChangeNotifier`, whose Send + Sync bound doesn't
    // fit this crate's Rc-based, single-threaded callbacks).
    listeners: RefCell<Vec<(ListenerId, Rc<dyn Fn()>)>>,
}

/// A pull-based derivation over one or more [`crate::Signal`]s.
///
/// Lazy: `compute` only runs again when [`Computed::get`] is called after an
/// upstream dependency changed. Memoized between invalidations. Cyclic
/// dependency graphs (a computed that, directly or transitively, reads
/// itself during evaluation) panic with a diagnostic including the
/// offending [`ComputedId`] — a fatal, non-recoverable condition the
/// caller's component kernel is expected to quarantine via `catch_unwind`
/// rather than something the reactive layer can repair.
pub struct Computed<T> {
    inner: Rc<ComputedInner<T>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Computed<T> {
    pub fn new(compute: impl FnMut() -> T + 'static) -> Self {
        Self {
            inner: Rc::new(ComputedInner {
                id: ComputedId::next(),
                compute: RefCell::new(Box::new(compute)),
                cached: RefCell::new(None),
                dirty: Cell::new(true),
                deps: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> ComputedId {
        self.inner.id
    }

    /// Read the (possibly cached) value, recording a dependency if called
    /// while an *outer* computed is evaluating.
    pub fn get(&self) -> T {
        let erased: Rc<dyn ErasedSignal> = Rc::new(self.clone());
        // Use a synthetic SignalId-less dependency key: computed-as-dependency
        // is tracked the same way a signal would be, via its own id space.
        tracking::record_access(SignalId::from_computed(self.inner.id), &erased);
        self.peek()
    }

    /// Read the (possibly cached) value without recording a dependency.
    pub fn peek(&self) -> T {
        self.ensure_fresh();
        self.inner
            .cached
            .borrow()
            .clone()
            .expect("computed value missing immediately after ensure_fresh")
    }

    fn ensure_fresh(&self) {
        if !self.inner.dirty.get() {
            return;
        }

        let already_evaluating = EVALUATING.with(|set| !set.borrow_mut().insert(self.inner.id));
        if already_evaluating {
            panic!(
                "cyclic Computed dependency detected: computed {:?} was read again while already evaluating",
                self.inner.id
            );
        }

        let compute_cell = &self.inner.compute;
        let (value, deps) = tracking::with_tracking(|| (compute_cell.borrow_mut())());

        EVALUATING.with(|set| {
            set.borrow_mut().remove(&self.inner.id);
        });

        self.rebind_dependencies(deps);
        self.inner.cached.replace(Some(value));
        self.inner.dirty.set(false);
    }

    fn rebind_dependencies(&self, new_deps: Vec<(SignalId, Rc<dyn ErasedSignal>)>) {
        let mut old_deps = self.inner.deps.borrow_mut();
        for (_, signal, listener_id) in old_deps.drain(..) {
            signal.unsubscribe_erased(listener_id);
        }

        let inner = self.inner.clone();
        for (signal_id, signal) in new_deps {
            let mark_dirty_inner = inner.clone();
            let listener_id = signal.subscribe_erased(Rc::new(move || {
                if !mark_dirty_inner.dirty.replace(true) {
                    let listeners = mark_dirty_inner.listeners.borrow().clone();
                    for (id, callback) in listeners {
                        if let Err(payload) =
                            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback()))
                        {
                            tracing::warn!(listener = %id, ?payload, "listener panicked on computed invalidation");
                        }
                    }
                }
            }));
            old_deps.push((signal_id, signal, listener_id));
        }
    }

    /// Subscribe to changes (fires once when the computed becomes dirty,
    /// not on every recompute — consistent with the framing of a
    /// `Computed` as "lazy... recomputes only when read").
    #[must_use = "store the ListenerId and unsubscribe, or use subscribe_scoped"]
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> ListenerId {
        let id = next_listener_id();
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }
}

impl<T: Clone + PartialEq + 'static> ErasedSignal for Computed<T> {
    fn subscribe_erased(&self, f: Rc<dyn Fn()>) -> ListenerId {
        let id = next_listener_id();
        self.inner.listeners.borrow_mut().push((id, f));
        id
    }

    fn unsubscribe_erased(&self, id: ListenerId) {
        self.unsubscribe(id);
    }
}

/// Free-function constructor, for call sites that prefer a bare function
/// over `Computed::new`.
pub fn computed<T: Clone + PartialEq + 'static>(f: impl FnMut() -> T + 'static) -> Computed<T> {
    Computed::new(f)
}

impl SignalId {
    /// Computed signals share the `SignalId` dependency-tracking space so a
    /// `Computed` can itself be read inside another `Computed`'s evaluation.
    /// The high bit distinguishes computed-derived ids from plain signal
    /// ids, which are allocated from a disjoint counter.
    fn from_computed(id: ComputedId) -> Self {
        Self::from_raw(id.0 | (1 << 63))
    }
}
