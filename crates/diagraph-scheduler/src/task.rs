//! Priority levels and scheduled tasks.
//!
//! Priority bands, highest first: `Input > Update > Render > Idle`. Tasks
//! of equal priority run in submission order within a frame.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Priority {
    /// Background/idle work.
    Idle = 0,
    /// Render/paint passes.
    Render = 1,
    /// Reactive/component tree updates.
    #[default]
    Update = 2,
    /// Pointer, keyboard, and gesture input — must run this frame.
    Input = 3,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Idle,
        Priority::Render,
        Priority::Update,
        Priority::Input,
    ];
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Render => write!(f, "Render"),
            Self::Update => write!(f, "Update"),
            Self::Input => write!(f, "Input"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// A live handle to a queued task, returned by
/// [`crate::Scheduler::request_frame`]. Dropping it does nothing — call
/// [`crate::Scheduler::cancel`] explicitly to cancel.
#[derive(Clone)]
pub struct TaskHandle {
    pub(crate) id: TaskId,
    pub(crate) cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) priority: Priority,
    pub(crate) cancelled: Rc<Cell<bool>>,
    /// Whether a shutdown may drop this task without running it. Input
    /// handlers default to non-droppable (the event already happened and
    /// callers expect effects); `request_frame_cancellable` opts a task
    /// into the droppable set for background/idle-style work.
    pub(crate) droppable_on_shutdown: bool,
    callback: Box<dyn FnOnce()>,
}

impl Task {
    pub(crate) fn new(
        priority: Priority,
        droppable_on_shutdown: bool,
        callback: impl FnOnce() + 'static,
    ) -> (Self, TaskHandle) {
        let id = TaskId::next();
        let cancelled = Rc::new(Cell::new(false));
        let task = Self {
            id,
            priority,
            cancelled: cancelled.clone(),
            droppable_on_shutdown,
            callback: Box::new(callback),
        };
        let handle = TaskHandle { id, cancelled };
        (task, handle)
    }

    pub(crate) fn execute(self) {
        if !self.cancelled.get() {
            (self.callback)();
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
