//! Scoped subscriptions ("Cancellation & timeouts"): "every
//! subscription... is attached to a cancellation token. Detaching... aborts
//! its token, which unsubscribes all bus handlers."

use std::sync::atomic::{AtomicU64, Ordering};

/// A handle identifying one detach scope (one component instance, one
/// layer). Create with [`crate::EventBus::create_scope`], pass to
/// [`crate::EventBus::on_scoped`], and call
/// [`crate::EventBus::abort_scope`] on detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}
