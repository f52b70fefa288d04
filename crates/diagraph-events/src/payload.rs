//! Payload shapes for the minimum named events (). Emitters are
//! free to use any `'static` type as a payload — [`crate::EventBus`] itself
//! only ever sees `&dyn Any` — these are just the shapes the core itself
//! emits.

use diagraph_types::{EntityId, Point};

/// `selection-change`: the diff that was applied to a selection bucket
/// (scenario 1's `diff={list,changes:{add,removed}}`).
#[derive(Debug, Clone)]
pub struct SelectionChangePayload {
    pub entity_type: &'static str,
    pub list: Vec<EntityId>,
    pub added: Vec<EntityId>,
    pub removed: Vec<EntityId>,
}

/// `block-drag-start` / `block-drag` / `block-drag-end`.
#[derive(Debug, Clone)]
pub struct BlockDragPayload {
    pub block_id: EntityId,
    pub x: f64,
    pub y: f64,
    pub cancelled: bool,
}

/// `pan-start` / `pan-move` / `pan-end`: screen-space delta since the last
/// event in the same gesture.
#[derive(Debug, Clone, Copy)]
pub struct PanPayload {
    pub dx: f64,
    pub dy: f64,
    pub cancelled: bool,
}

/// `pinch-start` / `pinch-move` / `pinch-end`: midpoint (screen space) and
/// the scale factor relative to the gesture's start.
#[derive(Debug, Clone, Copy)]
pub struct PinchPayload {
    pub midpoint: Point,
    pub scale: f64,
    pub cancelled: bool,
}

/// `tap`.
#[derive(Debug, Clone, Copy)]
pub struct TapPayload {
    pub screen: Point,
    pub world: Point,
}

/// `mouseenter` / `mouseleave`.
#[derive(Debug, Clone, Copy)]
pub struct PointerMovePayload {
    pub screen: Point,
    pub world: Point,
}

/// `internal-error`: 's consistency-error surfacing.
#[derive(Debug, Clone)]
pub struct InternalErrorPayload {
    pub context: String,
    pub message: String,
}
