use std::sync::atomic::{AtomicU64, Ordering};

/// A process-wide unique id for a listener/subscription, shared by every
/// `subscribe`-shaped API in the workspace (signals, the event bus, layer
/// wrappers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

/// Allocate a fresh, globally unique `ListenerId`.
pub fn next_listener_id() -> ListenerId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    ListenerId(COUNTER.fetch_add(1, Ordering::Relaxed))
}
