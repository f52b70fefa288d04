//! A minimal `Listenable`/`ChangeNotifier` pair. Used wherever a type
//! needs plain "something changed" fan-out without the equality-aware
//! machinery of a full `Signal` (see `diagraph-reactive`).

use crate::id::{next_listener_id, ListenerId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A listener callback.
pub type ListenerCallback = Arc<dyn Fn() + Send + Sync>;

/// An object that maintains a set of listeners, notified in registration
/// order (matching the deterministic-ordering requirement placed
/// on batched signal notifications).
pub trait Listenable {
    fn add_listener(&self, listener: ListenerCallback) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
    fn remove_all_listeners(&self);
}

/// Ordered listener fan-out, implemented with an insertion-order-preserving
/// map (a `Vec` of (id, callback) pairs — cheap at the listener counts this
/// engine deals with, and trivially preserves insertion order on removal).
#[derive(Clone)]
pub struct ChangeNotifier {
    listeners: Arc<Mutex<Vec<(ListenerId, ListenerCallback)>>>,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listener_count", &self.listeners.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Call every registered listener, in registration order. Panics inside
    /// a listener are caught so one bad subscriber cannot poison the rest
    /// of the notification pass.
    pub fn notify_listeners(&self) {
        let listeners = self.listeners.lock().clone();
        for (id, callback) in listeners {
            if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback())) {
                tracing::warn!(listener = %id, ?payload, "listener panicked during notify_listeners");
            }
        }
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Listenable for ChangeNotifier {
    fn add_listener(&self, listener: ListenerCallback) -> ListenerId {
        let id = next_listener_id();
        self.listeners.lock().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }

    fn remove_all_listeners(&self) {
        self.listeners.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn notifies_in_registration_order() {
        let notifier = ChangeNotifier::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            notifier.add_listener(Arc::new(move || order.lock().push(i)));
        }

        notifier.notify_listeners();
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn remove_listener_stops_notifications() {
        let notifier = ChangeNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let id = notifier.add_listener(Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        notifier.notify_listeners();
        notifier.remove_listener(id);
        notifier.notify_listeners();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn one_panicking_listener_does_not_block_others() {
        let notifier = ChangeNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));

        notifier.add_listener(Arc::new(|| panic!("boom")));
        let c = count.clone();
        notifier.add_listener(Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        notifier.notify_listeners();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
