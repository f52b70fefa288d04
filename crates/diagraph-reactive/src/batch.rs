//! Batched update semantics: writes inside a `batch`
//! stage their notifications; on the outermost batch's exit, each changed
//! signal notifies its listeners exactly once, in insertion order.

use crate::signal::SignalId;
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Batches deeper than this are almost certainly a recursive-batching bug
/// rather than intentional nesting; we warn well before this and refuse to
/// continue past it.
const MAX_BATCH_DEPTH: usize = 64;
const WARN_BATCH_DEPTH: usize = 16;

thread_local! {
    static BATCHING: Cell<bool> = const { Cell::new(false) };
    static BATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PENDING: RefCell<IndexMap<SignalId, Rc<dyn Fn()>>> = RefCell::new(IndexMap::new());
}

pub fn is_batching() -> bool {
    BATCHING.with(Cell::get)
}

/// Queue `notify` to run once the outermost batch completes, deduplicated
/// by `signal_id` (later calls for the same signal replace the callback but
/// do not move its position — first access order is what's observable, per
/// the "insertion order" requirement). Runs immediately if no batch
/// is active.
pub(crate) fn queue_or_run(signal_id: SignalId, notify: Rc<dyn Fn()>) {
    if is_batching() {
        PENDING.with(|pending| {
            pending.borrow_mut().insert(signal_id, notify);
        });
    } else {
        notify();
    }
}

/// Run `f` inside a batch. Nested calls join the outer batch; only the
/// outermost call flushes queued notifications.
pub fn batch<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let depth = BATCH_DEPTH.with(|d| {
        let next = d.get() + 1;
        d.set(next);
        next
    });

    if depth > MAX_BATCH_DEPTH {
        panic!("diagraph_reactive::batch nesting depth ({depth}) exceeded {MAX_BATCH_DEPTH}; this is almost certainly a recursive batching bug");
    }
    if depth == WARN_BATCH_DEPTH {
        tracing::warn!(depth, "batch nesting is unusually deep");
    }

    let was_batching = BATCHING.with(|b| {
        let prev = b.get();
        b.set(true);
        prev
    });

    let result = f();

    BATCH_DEPTH.with(|d| d.set(d.get() - 1));

    if was_batching {
        // Still inside an outer batch: leave BATCHING set and defer flush.
        return result;
    }

    BATCHING.with(|b| b.set(false));
    let pending = PENDING.with(|p| std::mem::take(&mut *p.borrow_mut()));
    tracing::trace!(count = pending.len(), "flushing batched signal notifications");
    for (signal_id, notify) in pending {
        if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| notify())) {
            tracing::warn!(?signal_id, ?payload, "listener panicked during batch flush");
        }
    }

    result
}

/// RAII alternative to [`batch`] for call sites that can't easily wrap a
/// closure.
pub struct BatchGuard {
    was_batching: bool,
}

impl Default for BatchGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchGuard {
    pub fn new() -> Self {
        let was_batching = BATCHING.with(|b| {
            let prev = b.get();
            b.set(true);
            prev
        });
        BATCH_DEPTH.with(|d| d.set(d.get() + 1));
        Self { was_batching }
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        BATCH_DEPTH.with(|d| d.set(d.get() - 1));
        if self.was_batching {
            return;
        }
        BATCHING.with(|b| b.set(false));
        let pending = PENDING.with(|p| std::mem::take(&mut *p.borrow_mut()));
        for (_, notify) in pending {
            notify();
        }
    }
}
