//! The frame-driven cooperative task queue itself.
//!
//! Exposed as an explicit, per-graph resource rather than a process-wide
//! singleton — calls out the global scheduler of prior art as
//! a deliberate redesign: share it across graphs only by explicit
//! injection.

use crate::frame::{FrameBudget, FrameReport};
use crate::task::{Priority, Task, TaskHandle};
use std::cell::RefCell;
use std::collections::VecDeque;

/// A single-threaded, priority-banded task queue tied to one display
/// refresh cycle per [`Scheduler::run_frame`] call.
///
/// Each priority band is its own FIFO queue. A frame drains `Input` fully,
/// then `Update`, then `Render`, then `Idle` — tasks queued *during* the
/// drain of their own band do not run until the *next* frame, which is
/// what gives re-queueing well-defined, non-reentrant semantics.
pub struct Scheduler {
    queues: RefCell<[VecDeque<Task>; 4]>,
    budget: RefCell<FrameBudget>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            queues: RefCell::new([
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
            ]),
            budget: RefCell::new(FrameBudget::disabled()),
        }
    }

    pub fn with_budget(budget: FrameBudget) -> Self {
        let scheduler = Self::new();
        *scheduler.budget.borrow_mut() = budget;
        scheduler
    }

    fn band_index(priority: Priority) -> usize {
        match priority {
            Priority::Idle => 0,
            Priority::Render => 1,
            Priority::Update => 2,
            Priority::Input => 3,
        }
    }

    /// Queue `callback` to run at `priority` on the next [`Scheduler::run_frame`].
    /// The task runs to completion uninterrupted — it must be short and
    /// must not block.
    pub fn request_frame(&self, priority: Priority, callback: impl FnOnce() + 'static) -> TaskHandle {
        self.request_frame_inner(priority, false, callback)
    }

    /// Like [`Scheduler::request_frame`], but the task may be silently
    /// dropped (never invoked) if [`Scheduler::shutdown`] runs before it
    /// gets a chance to execute.
    pub fn request_frame_cancellable(
        &self,
        priority: Priority,
        callback: impl FnOnce() + 'static,
    ) -> TaskHandle {
        self.request_frame_inner(priority, true, callback)
    }

    fn request_frame_inner(
        &self,
        priority: Priority,
        droppable_on_shutdown: bool,
        callback: impl FnOnce() + 'static,
    ) -> TaskHandle {
        let (task, handle) = Task::new(priority, droppable_on_shutdown, callback);
        self.queues.borrow_mut()[Self::band_index(priority)].push_back(task);
        handle
    }

    /// Mark a pending task as cancelled. A cancelled task is dropped
    /// without running when its turn comes, and without re-checking its
    /// `TaskId` against the queue — cancellation is just a flag the task
    /// checks at execute time.
    pub fn cancel(&self, handle: &TaskHandle) {
        handle.cancelled.set(true);
    }

    pub fn is_idle(&self) -> bool {
        self.queues.borrow().iter().all(VecDeque::is_empty)
    }

    pub fn pending_count(&self) -> usize {
        self.queues.borrow().iter().map(VecDeque::len).sum()
    }

    /// Drain and execute every priority band once, highest first.
    pub fn run_frame(&self) -> FrameReport {
        self.budget.borrow_mut().begin_frame();

        let mut report = FrameReport::default();
        for &priority in Priority::ALL.iter().rev() {
            let count = self.drain_band(priority);
            report.record(priority, count);
            tracing::trace!(%priority, count, "drained scheduler band");
        }

        self.budget.borrow_mut().end_frame(&report);
        report
    }

    fn drain_band(&self, priority: Priority) -> usize {
        let worklist = std::mem::take(&mut self.queues.borrow_mut()[Self::band_index(priority)]);
        let count = worklist.len();
        for task in worklist {
            task.execute();
        }
        count
    }

    /// Drop every pending task whose priority band is droppable on
    /// shutdown without running it; run the rest. After this call the
    /// scheduler is idle.
    pub fn shutdown(&self) -> FrameReport {
        let mut report = FrameReport::default();
        for &priority in Priority::ALL.iter().rev() {
            let worklist =
                std::mem::take(&mut self.queues.borrow_mut()[Self::band_index(priority)]);
            let mut ran = 0;
            for task in worklist {
                if task.droppable_on_shutdown {
                    tracing::debug!(id = %task.id, %priority, "dropping cancellable task on shutdown");
                    continue;
                }
                task.execute();
                ran += 1;
            }
            report.record(priority, ran);
        }
        report
    }

    /// Remove every task from every band, cancelled or not, without
    /// running any of them. For tests and hard resets; prefer
    /// [`Scheduler::shutdown`] in normal operation.
    pub fn clear(&self) {
        for queue in self.queues.borrow_mut().iter_mut() {
            queue.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;
    use std::rc::Rc;

    #[test]
    fn runs_in_priority_order_within_a_frame() {
        let scheduler = Scheduler::new();
        let order = Rc::new(StdRefCell::new(Vec::new()));

        let o = order.clone();
        scheduler.request_frame(Priority::Idle, move || o.borrow_mut().push("idle"));
        let o = order.clone();
        scheduler.request_frame(Priority::Input, move || o.borrow_mut().push("input"));
        let o = order.clone();
        scheduler.request_frame(Priority::Render, move || o.borrow_mut().push("render"));
        let o = order.clone();
        scheduler.request_frame(Priority::Update, move || o.borrow_mut().push("update"));

        scheduler.run_frame();
        assert_eq!(*order.borrow(), vec!["input", "update", "render", "idle"]);
    }

    #[test]
    fn equal_priority_tasks_run_in_submission_order() {
        let scheduler = Scheduler::new();
        let order = Rc::new(StdRefCell::new(Vec::new()));

        for i in 0..5 {
            let o = order.clone();
            scheduler.request_frame(Priority::Update, move || o.borrow_mut().push(i));
        }

        scheduler.run_frame();
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn cancelled_task_does_not_run() {
        let scheduler = Scheduler::new();
        let ran = Rc::new(StdRefCell::new(false));
        let r = ran.clone();
        let handle = scheduler.request_frame(Priority::Update, move || *r.borrow_mut() = true);

        scheduler.cancel(&handle);
        scheduler.run_frame();

        assert!(!*ran.borrow());
    }

    #[test]
    fn requeue_during_drain_runs_on_the_next_frame_not_the_current_one() {
        let scheduler = Rc::new(Scheduler::new());
        let runs = Rc::new(StdRefCell::new(0));

        let sched = scheduler.clone();
        let r = runs.clone();
        scheduler.request_frame(Priority::Update, move || {
            *r.borrow_mut() += 1;
            let r2 = r.clone();
            sched.request_frame(Priority::Update, move || *r2.borrow_mut() += 1);
        });

        scheduler.run_frame();
        assert_eq!(*runs.borrow(), 1, "re-queued task must not run in the same frame");

        scheduler.run_frame();
        assert_eq!(*runs.borrow(), 2);
    }

    #[test]
    fn shutdown_drops_cancellable_tasks_without_running_them() {
        let scheduler = Scheduler::new();
        let ran_critical = Rc::new(StdRefCell::new(false));
        let ran_droppable = Rc::new(StdRefCell::new(false));

        let r = ran_critical.clone();
        scheduler.request_frame(Priority::Update, move || *r.borrow_mut() = true);
        let r = ran_droppable.clone();
        scheduler.request_frame_cancellable(Priority::Idle, move || *r.borrow_mut() = true);

        scheduler.shutdown();

        assert!(*ran_critical.borrow(), "non-droppable tasks still run on shutdown");
        assert!(!*ran_droppable.borrow(), "droppable tasks must not run on shutdown");
        assert!(scheduler.is_idle());
    }

    #[test]
    fn pending_count_and_is_idle_track_queue_state() {
        let scheduler = Scheduler::new();
        assert!(scheduler.is_idle());

        scheduler.request_frame(Priority::Render, || {});
        assert_eq!(scheduler.pending_count(), 1);
        assert!(!scheduler.is_idle());

        scheduler.run_frame();
        assert!(scheduler.is_idle());
    }
}
