//! Pointer input types.

use std::sync::atomic::{AtomicU64, Ordering};

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Identifies one finger/pointer in a (possibly multi-touch) input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

impl PointerId {
    /// Convenience id generator for single-pointer (mouse) hosts that have
    /// no natural pointer id of their own.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// One `down`/`move`/`up`/`cancel` sample, in screen space. `timestamp` is
/// caller-supplied seconds (monotonic, arbitrary origin) — the controller
/// never reads a wall clock itself — there are no wall-clock timeouts
/// in the core — it only compares timestamps the host hands it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub pointer_id: PointerId,
    pub x: f64,
    pub y: f64,
    pub timestamp: f64,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn new(pointer_id: PointerId, x: f64, y: f64, timestamp: f64) -> Self {
        Self {
            pointer_id,
            x,
            y,
            timestamp,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
