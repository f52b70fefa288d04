//! Event names ("Event names (minimum)").

/// A typed event name. Built from a `&'static str` so host applications can
/// register custom event names beyond the minimum set below, the same way
/// `diagraph_tree`'s `type_tag` is open-ended rather than a closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventName(pub &'static str);

impl EventName {
    pub const STATE_CHANGE: EventName = EventName("state-change");
    pub const CAMERA_CHANGE: EventName = EventName("camera-change");
    pub const COLORS_CHANGED: EventName = EventName("colors-changed");
    pub const CONSTANTS_CHANGED: EventName = EventName("constants-changed");
    pub const BLOCK_DRAG_START: EventName = EventName("block-drag-start");
    pub const BLOCK_DRAG: EventName = EventName("block-drag");
    pub const BLOCK_DRAG_END: EventName = EventName("block-drag-end");
    pub const MOUSEENTER: EventName = EventName("mouseenter");
    pub const MOUSELEAVE: EventName = EventName("mouseleave");
    pub const SELECTION_CHANGE: EventName = EventName("selection-change");
    pub const PAN_START: EventName = EventName("pan-start");
    pub const PAN_MOVE: EventName = EventName("pan-move");
    pub const PAN_END: EventName = EventName("pan-end");
    pub const PINCH_START: EventName = EventName("pinch-start");
    pub const PINCH_MOVE: EventName = EventName("pinch-move");
    pub const PINCH_END: EventName = EventName("pinch-end");
    pub const TAP: EventName = EventName("tap");
    /// Not in the minimum list but required by the error-handling design
    /// (): consistency errors surface asynchronously as this
    /// bus event rather than unwinding past the scheduler.
    pub const INTERNAL_ERROR: EventName = EventName("internal-error");

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for EventName {
    fn from(s: &'static str) -> Self {
        EventName(s)
    }
}
