//! Fine-grained reactivity: signals, computed signals, and batched update
//! semantics.
//!
//! Single-threaded by design () — every type in this crate is
//! `Rc`-based and `!Send`. Callers that need to hand a handle across an
//! await point or thread boundary are outside the scope this crate serves;
//! the engine as a whole owns one cooperative scheduler thread.

mod batch;
mod computed;
mod signal;
mod tracking;

pub use batch::{batch, is_batching, BatchGuard};
pub use computed::{computed, Computed, ComputedId};
pub use signal::{signal, ErasedSignal, Signal, SignalId, SignalSubscription};

use diagraph_foundation::ListenerId;

/// Subscribe a plain callback to a signal, matching 's
/// `subscribe(signal, listener) -> unsubscribe` shape. Prefer
/// [`Signal::subscribe_scoped`] when the subscription's lifetime can be
/// tied to an owning value instead of a manually-invoked closure.
pub fn subscribe<T>(target: &Signal<T>, listener: impl Fn() + 'static) -> impl FnOnce()
where
    T: Clone + PartialEq + 'static,
{
    let id = target.subscribe(listener);
    let target = target.clone();
    move || target.unsubscribe(id)
}

/// Same as [`subscribe`] but for a [`Computed`].
pub fn subscribe_computed<T>(
    target: &Computed<T>,
    listener: impl Fn() + 'static,
) -> impl FnOnce()
where
    T: Clone + PartialEq + 'static,
{
    let id = target.subscribe(listener);
    let target = target.clone();
    move || target.unsubscribe(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_subscribe_function_returns_working_unsubscriber() {
        use std::cell::Cell;
        use std::rc::Rc;

        let sig = signal(1);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let unsubscribe = subscribe(&sig, move || c.set(c.get() + 1));

        sig.set(2);
        assert_eq!(count.get(), 1);

        unsubscribe();
        sig.set(3);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn listener_id_type_is_reexported_from_foundation() {
        fn accepts_id(_id: ListenerId) {}
        let sig = signal(0);
        let id = sig.subscribe(|| {});
        accepts_id(id);
    }
}
