//! `Signal<T>` — a value-typed reactive cell.

use crate::batch;
use crate::tracking;
use diagraph_foundation::{next_listener_id, ListenerId};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a signal for dependency-tracking and notification-dedup
/// purposes. Two `Signal` handles pointing at the same cell share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(u64);

impl SignalId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Build a `SignalId` from a raw value outside the normal counter —
    /// used by `crate::computed` so a `Computed` can be tracked as a
    /// dependency in the same id space as plain signals.
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Object-safe handle used by [`crate::Computed`] to subscribe/unsubscribe
/// from a dependency without knowing its value type.
pub trait ErasedSignal {
    fn subscribe_erased(&self, f: Rc<dyn Fn()>) -> ListenerId;
    fn unsubscribe_erased(&self, id: ListenerId);
}

struct SignalInner<T> {
    value: T,
    subscribers: Vec<(ListenerId, Rc<dyn Fn()>)>,
}

/// A reactive cell holding a value of type `T`.
///
/// Setting a value that is equal under
/// `PartialEq` to the current value is a no-op (no notification, and no
/// dirtying of dependent computed signals). Reads performed while a
/// [`crate::Computed`] is evaluating are recorded as dependencies.
pub struct Signal<T> {
    id: SignalId,
    inner: Rc<RefCell<SignalInner<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: self.inner.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &self.inner.borrow().value)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Create a new signal holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            id: SignalId::next(),
            inner: Rc::new(RefCell::new(SignalInner {
                value: initial,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Read the current value, recording a dependency if called while a
    /// [`crate::Computed`] is evaluating.
    pub fn get(&self) -> T {
        let erased: Rc<dyn ErasedSignal> = Rc::new(self.clone());
        tracking::record_access(self.id, &erased);
        self.peek()
    }

    /// Read the current value without recording a dependency.
    pub fn peek(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replace the value. A no-op (no notification) if `value` equals the
    /// current value under `PartialEq`.
    pub fn set(&self, value: T) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                false
            } else {
                inner.value = value;
                true
            }
        };
        if changed {
            self.queue_notify();
        }
    }

    /// Update the value via a pure function of the current value.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.inner.borrow().value);
        self.set(next);
    }

    /// Update the value in place. Always notifies: the engine cannot
    /// equality-check a closure's effect without an extra clone, so
    /// `update_mut` is the escape hatch for callers who already know the
    /// value changed.
    pub fn update_mut(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.borrow_mut().value);
        self.queue_notify();
    }

    /// Subscribe to changes. Returns an id that must be passed to
    /// [`Signal::unsubscribe`] (or use [`Signal::subscribe_scoped`] for
    /// automatic cleanup).
    #[must_use = "store the ListenerId and unsubscribe, or use subscribe_scoped"]
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> ListenerId {
        let id = next_listener_id();
        self.inner
            .borrow_mut()
            .subscribers
            .push((id, Rc::new(listener)));
        id
    }

    /// Subscribe with automatic cleanup on drop.
    pub fn subscribe_scoped(&self, listener: impl Fn() + 'static) -> SignalSubscription<T> {
        let id = self.subscribe(listener);
        SignalSubscription {
            signal: self.clone(),
            id,
        }
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner
            .borrow_mut()
            .subscribers
            .retain(|(existing, _)| *existing != id);
    }

    fn queue_notify(&self) {
        let inner = self.inner.clone();
        let notify: Rc<dyn Fn()> = Rc::new(move || {
            let subscribers = inner.borrow().subscribers.clone();
            for (_, callback) in subscribers {
                callback();
            }
        });
        batch::queue_or_run(self.id, notify);
    }
}

impl<T: Clone + PartialEq + 'static> ErasedSignal for Signal<T> {
    fn subscribe_erased(&self, f: Rc<dyn Fn()>) -> ListenerId {
        let id = next_listener_id();
        self.inner.borrow_mut().subscribers.push((id, f));
        id
    }

    fn unsubscribe_erased(&self, id: ListenerId) {
        self.unsubscribe(id);
    }
}

/// RAII guard that unsubscribes from a [`Signal`] on drop.
pub struct SignalSubscription<T> {
    signal: Signal<T>,
    id: ListenerId,
}

impl<T> Drop for SignalSubscription<T> {
    fn drop(&mut self) {
        self.signal.unsubscribe(self.id);
    }
}

/// Free-function constructor, for call sites that prefer a bare function
/// over `Signal::new`.
pub fn signal<T: Clone + PartialEq + 'static>(initial: T) -> Signal<T> {
    Signal::new(initial)
}
