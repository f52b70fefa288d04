//! Dependency tracking for [`crate::Computed`].
//!
//! Reads inside a computed context are recorded as
//! dependencies; re-evaluation happens on the next read after any
//! dependency changes. This module implements that via a thread-local
//! stack of "currently recording" frames — every [`crate::Signal::get`] (and
//! `Computed::get`) call consults the top frame and, if present, records
//! itself as a dependency of whatever computation is being evaluated.
//!
//! The whole reactive engine is single-threaded and cooperative — there
//! are no parallel worker threads in the core — so this uses `Rc`/`RefCell`
//! rather than `Arc`/`Mutex`, the simpler tool for the concurrency model
//! actually in play here.

use crate::signal::{ErasedSignal, SignalId};
use std::cell::RefCell;
use std::rc::Rc;

type Frame = RefCell<Vec<(SignalId, Rc<dyn ErasedSignal>)>>;

thread_local! {
    static STACK: RefCell<Vec<Rc<Frame>>> = const { RefCell::new(Vec::new()) };
}

/// Run `f`, collecting every signal/computed read during its execution.
/// Returns `f`'s result alongside the deduplicated list of dependencies
/// touched (first-access order, matching the deterministic ordering the
/// rest of the reactive layer relies on).
pub fn with_tracking<R>(f: impl FnOnce() -> R) -> (R, Vec<(SignalId, Rc<dyn ErasedSignal>)>) {
    let frame: Rc<Frame> = Rc::new(RefCell::new(Vec::new()));
    STACK.with(|stack| stack.borrow_mut().push(frame.clone()));
    let result = f();
    STACK.with(|stack| {
        stack.borrow_mut().pop();
    });

    let mut seen = std::collections::HashSet::new();
    let deps = frame
        .borrow()
        .iter()
        .filter(|(id, _)| seen.insert(*id))
        .cloned()
        .collect();
    (result, deps)
}

/// Record that `id` (with erased handle `signal`) was read. Called by
/// [`crate::Signal::get`] and [`crate::Computed::get`]; a no-op outside any
/// tracking context (a plain, untracked read).
pub fn record_access(id: SignalId, signal: &Rc<dyn ErasedSignal>) {
    STACK.with(|stack| {
        if let Some(top) = stack.borrow().last() {
            top.borrow_mut().push((id, signal.clone()));
        }
    });
}

/// Whether a computation is currently being tracked (used by `peek` to
/// assert it is never itself tracked, and by diagnostics).
pub fn is_tracking() -> bool {
    STACK.with(|stack| !stack.borrow().is_empty())
}
