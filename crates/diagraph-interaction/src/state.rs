//! The gesture state machine's phases:
//!
//! ```text
//! Idle -> Pressed -> {Tap | Panning | Pinching | Dragging} -> Idle
//! ```
//!
//! `Tap` is not a resident phase — it is decided and emitted on release and
//! the machine returns straight to `Idle` — so it never appears here as a
//! variant.

use crate::input::{Modifiers, PointerId};
use diagraph_types::{EntityId, Point};

#[derive(Debug, Clone)]
pub(crate) struct PressedInfo {
    pub pointer_id: PointerId,
    pub start_x: f64,
    pub start_y: f64,
    pub start_time: f64,
    #[allow(dead_code)]
    pub modifiers: Modifiers,
    pub hit: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub(crate) struct PanningInfo {
    pub pointer_id: PointerId,
    pub last_x: f64,
    pub last_y: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct PinchingInfo {
    pub pointers: [PointerId; 2],
    pub last_distance: f64,
    pub start_scale: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct DraggingInfo {
    pub pointer_id: PointerId,
    pub target: EntityId,
    /// The target's world position when the drag began, before any delta.
    pub origin_position: Point,
    /// The pointer's world position when the drag began.
    pub origin_pointer: Point,
    /// Position emitted in the most recent `block-drag` event, so
    /// `block-drag-end` can report the final value even if a later
    /// pointer sample was never turned into its own event.
    pub last_position: Point,
}

#[derive(Debug, Clone)]
pub(crate) enum GesturePhase {
    Idle,
    Pressed(PressedInfo),
    Panning(PanningInfo),
    Pinching(PinchingInfo),
    Dragging(DraggingInfo),
}
