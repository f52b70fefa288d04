//! Typed, cancellable, default-action domain event bus.
//!
//! One [`EventBus`] per graph. Handlers return a [`Propagation`] decision
//! instead of mutating a shared "cancelled" flag — the bus itself never
//! calls a default action the handlers cancelled.

mod bus;
mod name;
mod payload;
mod propagation;
mod scope;

pub use bus::{EventBus, SubscribeOptions};
pub use name::EventName;
pub use payload::{
    BlockDragPayload, InternalErrorPayload, PanPayload, PinchPayload, PointerMovePayload,
    SelectionChangePayload, TapPayload,
};
pub use propagation::Propagation;
pub use scope::ScopeId;
