//! The gesture/drag state machine itself.

use crate::config::GestureConfig;
use crate::input::{PointerId, PointerInput};
use crate::state::{DraggingInfo, GesturePhase, PanningInfo, PinchingInfo, PressedInfo};
use diagraph_camera::Camera;
use diagraph_events::{
    BlockDragPayload, EventBus, EventName, PanPayload, PinchPayload, Propagation, TapPayload,
};
use diagraph_hittest::HitTestIndex;
use diagraph_store::GraphStore;
use diagraph_types::{CanChangeBlockGeometry, Point};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Drives one (possibly multi-touch) pointer stream through
/// `Idle -> Pressed -> {Tap | Panning | Pinching | Dragging} -> Idle`,
/// firing cancellable bus events and applying the default
/// camera-pan / camera-zoom / block-geometry actions when nobody cancels.
pub struct GestureController {
    camera: Rc<Camera>,
    hit_index: Rc<HitTestIndex>,
    store: Rc<GraphStore>,
    bus: Rc<EventBus>,
    config: RefCell<GestureConfig>,
    phase: RefCell<GesturePhase>,
    pointers: RefCell<HashMap<PointerId, Point>>,
}

impl GestureController {
    pub fn new(camera: Rc<Camera>, hit_index: Rc<HitTestIndex>, store: Rc<GraphStore>, bus: Rc<EventBus>) -> Self {
        Self::with_config(camera, hit_index, store, bus, GestureConfig::default())
    }

    pub fn with_config(
        camera: Rc<Camera>,
        hit_index: Rc<HitTestIndex>,
        store: Rc<GraphStore>,
        bus: Rc<EventBus>,
        config: GestureConfig,
    ) -> Self {
        Self {
            camera,
            hit_index,
            store,
            bus,
            config: RefCell::new(config),
            phase: RefCell::new(GesturePhase::Idle),
            pointers: RefCell::new(HashMap::new()),
        }
    }

    /// Current tunables, for callers that want to change a subset of them
    /// via `set_config` without clobbering the rest.
    pub fn config(&self) -> GestureConfig {
        *self.config.borrow()
    }

    /// Replace the live tunables. Takes effect on the next gesture the
    /// controller advances; an in-flight pan/pinch/drag already holds its
    /// own snapshot for the step it's mid-way through.
    pub fn set_config(&self, config: GestureConfig) {
        *self.config.borrow_mut() = config;
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        matches!(*self.phase.borrow(), GesturePhase::Idle)
    }

    pub fn pointer_down(&self, input: PointerInput) {
        self.pointers.borrow_mut().insert(input.pointer_id, Point::new(input.x, input.y));

        let phase = self.phase.borrow().clone();
        match phase {
            GesturePhase::Idle => {
                let world = self.camera.apply_to_point(input.x, input.y);
                let hit = self.hit_index.test_point(world.x, world.y).into_iter().next().map(|h| h.id);
                *self.phase.borrow_mut() = GesturePhase::Pressed(PressedInfo {
                    pointer_id: input.pointer_id,
                    start_x: input.x,
                    start_y: input.y,
                    start_time: input.timestamp,
                    modifiers: input.modifiers,
                    hit,
                });
            }
            GesturePhase::Pressed(info) if info.pointer_id != input.pointer_id => {
                self.begin_pinch(info.pointer_id, input.pointer_id);
            }
            _ => {
                // A press/pinch already covers this stream or a third
                // pointer arrived mid-gesture; track its position for a
                // future pinch but don't reclassify the current gesture.
            }
        }
    }

    pub fn pointer_move(&self, input: PointerInput) {
        self.pointers.borrow_mut().insert(input.pointer_id, Point::new(input.x, input.y));

        let phase = self.phase.borrow().clone();
        match phase {
            GesturePhase::Idle => {}
            GesturePhase::Pressed(info) if info.pointer_id == input.pointer_id => {
                self.advance_pressed(info, input);
            }
            GesturePhase::Pressed(_) => {}
            GesturePhase::Panning(info) if info.pointer_id == input.pointer_id => {
                self.continue_pan(info, input);
            }
            GesturePhase::Panning(_) => {}
            GesturePhase::Pinching(info) => {
                self.continue_pinch(info, input);
            }
            GesturePhase::Dragging(info) if info.pointer_id == input.pointer_id => {
                self.continue_drag(info, input);
            }
            GesturePhase::Dragging(_) => {}
        }
    }

    pub fn pointer_up(&self, input: PointerInput) {
        self.pointers.borrow_mut().remove(&input.pointer_id);

        let phase = self.phase.borrow().clone();
        match phase {
            GesturePhase::Pressed(info) if info.pointer_id == input.pointer_id => {
                self.finish_pressed_as_tap_or_nothing(info, input);
                *self.phase.borrow_mut() = GesturePhase::Idle;
            }
            GesturePhase::Panning(info) if info.pointer_id == input.pointer_id => {
                self.emit_pan_end(false);
                *self.phase.borrow_mut() = GesturePhase::Idle;
            }
            GesturePhase::Pinching(info) if info.pointers.contains(&input.pointer_id) => {
                self.emit_pinch_end(&info, false);
                *self.phase.borrow_mut() = GesturePhase::Idle;
            }
            GesturePhase::Dragging(info) if info.pointer_id == input.pointer_id => {
                self.emit_drag_end(&info, false);
                *self.phase.borrow_mut() = GesturePhase::Idle;
            }
            _ => {}
        }
    }

    /// Pointer-cancel or foreground loss ("Cancellation").
    pub fn pointer_cancel(&self, pointer_id: PointerId) {
        self.pointers.borrow_mut().remove(&pointer_id);

        let phase = self.phase.borrow().clone();
        match phase {
            GesturePhase::Panning(info) if info.pointer_id == pointer_id => {
                self.emit_pan_end(true);
                *self.phase.borrow_mut() = GesturePhase::Idle;
            }
            GesturePhase::Pinching(info) if info.pointers.contains(&pointer_id) => {
                self.emit_pinch_end(&info, true);
                *self.phase.borrow_mut() = GesturePhase::Idle;
            }
            GesturePhase::Dragging(info) if info.pointer_id == pointer_id => {
                self.emit_drag_end(&info, true);
                *self.phase.borrow_mut() = GesturePhase::Idle;
            }
            GesturePhase::Pressed(info) if info.pointer_id == pointer_id => {
                *self.phase.borrow_mut() = GesturePhase::Idle;
            }
            _ => {}
        }
    }

    fn advance_pressed(&self, info: PressedInfo, input: PointerInput) {
        let dx = input.x - info.start_x;
        let dy = input.y - info.start_y;
        let moved = (dx * dx + dy * dy).sqrt();

        if moved <= self.config.borrow().tap_slop {
            *self.phase.borrow_mut() = GesturePhase::Pressed(info);
            return;
        }

        match info.hit {
            Some(target) if self.store.blocks.get(&target).is_some() => {
                let origin_position = {
                    let block = self.store.blocks.get(&target).expect("checked above").peek();
                    Point::new(block.x, block.y)
                };
                let origin_pointer = self.camera.apply_to_point(info.start_x, info.start_y);
                let dragging = DraggingInfo {
                    pointer_id: info.pointer_id,
                    target,
                    origin_position,
                    origin_pointer,
                    last_position: origin_position,
                };
                self.emit_drag_start(&dragging);
                *self.phase.borrow_mut() = GesturePhase::Dragging(dragging);
                self.continue_drag_from_current(input);
            }
            _ => {
                let panning = PanningInfo {
                    pointer_id: info.pointer_id,
                    last_x: info.start_x,
                    last_y: info.start_y,
                };
                self.emit_pan_start();
                *self.phase.borrow_mut() = GesturePhase::Panning(panning);
                self.continue_pan_from_current(input);
            }
        }
    }

    fn continue_drag_from_current(&self, input: PointerInput) {
        if let GesturePhase::Dragging(info) = self.phase.borrow().clone() {
            self.continue_drag(info, input);
        }
    }

    fn continue_pan_from_current(&self, input: PointerInput) {
        if let GesturePhase::Panning(info) = self.phase.borrow().clone() {
            self.continue_pan(info, input);
        }
    }

    fn continue_pan(&self, info: PanningInfo, input: PointerInput) {
        let dx = input.x - info.last_x;
        let dy = input.y - info.last_y;
        let payload = PanPayload { dx, dy, cancelled: false };
        let camera = self.camera.clone();
        let can_drag_camera = self.config.borrow().can_drag_camera;
        self.bus.execute_default_action(EventName::PAN_MOVE, &payload, move |_| {
            if can_drag_camera {
                camera.pan(dx, dy);
            }
        });
        *self.phase.borrow_mut() = GesturePhase::Panning(PanningInfo {
            pointer_id: info.pointer_id,
            last_x: input.x,
            last_y: input.y,
        });
    }

    fn emit_pan_start(&self) {
        let payload = PanPayload { dx: 0.0, dy: 0.0, cancelled: false };
        self.bus.emit(EventName::PAN_START, &payload);
    }

    fn emit_pan_end(&self, cancelled: bool) {
        let payload = PanPayload { dx: 0.0, dy: 0.0, cancelled };
        self.bus.emit(EventName::PAN_END, &payload);
    }

    fn begin_pinch(&self, a: PointerId, b: PointerId) {
        let pointers = self.pointers.borrow();
        let (Some(&pa), Some(&pb)) = (pointers.get(&a), pointers.get(&b)) else {
            return;
        };
        let distance = pa.distance_to(pb).max(1e-6);
        drop(pointers);

        let info = PinchingInfo {
            pointers: [a, b],
            last_distance: distance,
            start_scale: self.camera.scale(),
        };
        let payload = PinchPayload {
            midpoint: self.midpoint(&info),
            scale: 1.0,
            cancelled: false,
        };
        self.bus.emit(EventName::PINCH_START, &payload);
        *self.phase.borrow_mut() = GesturePhase::Pinching(info);
    }

    fn continue_pinch(&self, info: PinchingInfo, input: PointerInput) {
        self.pointers.borrow_mut().insert(input.pointer_id, Point::new(input.x, input.y));
        if !info.pointers.contains(&input.pointer_id) {
            return;
        }

        let pointers = self.pointers.borrow();
        let (Some(&pa), Some(&pb)) = (pointers.get(&info.pointers[0]), pointers.get(&info.pointers[1])) else {
            return;
        };
        let distance = pa.distance_to(pb).max(1e-6);
        drop(pointers);

        let ratio = distance / info.last_distance;
        let payload = PinchPayload {
            midpoint: self.midpoint(&info),
            scale: ratio,
            cancelled: false,
        };
        let camera = self.camera.clone();
        let target_scale = info.start_scale * ratio;
        let midpoint = self.midpoint(&info);
        let can_zoom_camera = self.config.borrow().can_zoom_camera;
        self.bus.execute_default_action(EventName::PINCH_MOVE, &payload, move |_| {
            if can_zoom_camera {
                camera.zoom(target_scale, Some(midpoint));
            }
        });

        *self.phase.borrow_mut() = GesturePhase::Pinching(PinchingInfo {
            pointers: info.pointers,
            last_distance: info.last_distance,
            start_scale: info.start_scale,
        });
    }

    fn emit_pinch_end(&self, info: &PinchingInfo, cancelled: bool) {
        let payload = PinchPayload {
            midpoint: self.midpoint(info),
            scale: 1.0,
            cancelled,
        };
        self.bus.emit(EventName::PINCH_END, &payload);
    }

    fn midpoint(&self, info: &PinchingInfo) -> Point {
        let pointers = self.pointers.borrow();
        let pa = pointers.get(&info.pointers[0]).copied().unwrap_or(Point::ZERO);
        let pb = pointers.get(&info.pointers[1]).copied().unwrap_or(Point::ZERO);
        Point::new((pa.x + pb.x) / 2.0, (pa.y + pb.y) / 2.0)
    }

    fn emit_drag_start(&self, info: &DraggingInfo) {
        let payload = BlockDragPayload {
            block_id: info.target.clone(),
            x: info.origin_position.x,
            y: info.origin_position.y,
            cancelled: false,
        };
        self.bus.emit(EventName::BLOCK_DRAG_START, &payload);
    }

    fn continue_drag(&self, info: DraggingInfo, input: PointerInput) {
        let current_world = self.camera.apply_to_point(input.x, input.y);
        let delta = current_world - info.origin_pointer;
        let raw = Point::new(info.origin_position.x + delta.x, info.origin_position.y + delta.y);
        let snapped = raw.snap_to_grid(self.config.borrow().snap_grid_size);

        let payload = BlockDragPayload {
            block_id: info.target.clone(),
            x: snapped.x,
            y: snapped.y,
            cancelled: false,
        };
        let store = self.store.clone();
        let target = info.target.clone();
        // Every drag this controller produces targets a whole block (anchors
        // are hit-tested under their own id and never start a Dragging
        // phase), so OnlyAnchor has nothing to let through any more than
        // None does until an anchor-drag path exists.
        let may_move = matches!(self.config.borrow().can_change_block_geometry, CanChangeBlockGeometry::All);
        self.bus.execute_default_action(EventName::BLOCK_DRAG, &payload, move |_| {
            if may_move {
                store.set_xy(&target, snapped.x, snapped.y);
            }
        });

        *self.phase.borrow_mut() = GesturePhase::Dragging(DraggingInfo {
            pointer_id: info.pointer_id,
            target: info.target,
            origin_position: info.origin_position,
            origin_pointer: info.origin_pointer,
            last_position: snapped,
        });
    }

    fn emit_drag_end(&self, info: &DraggingInfo, cancelled: bool) {
        let payload = BlockDragPayload {
            block_id: info.target.clone(),
            x: info.last_position.x,
            y: info.last_position.y,
            cancelled,
        };
        self.bus.emit(EventName::BLOCK_DRAG_END, &payload);
    }

    fn finish_pressed_as_tap_or_nothing(&self, info: PressedInfo, input: PointerInput) {
        let dx = input.x - info.start_x;
        let dy = input.y - info.start_y;
        let moved = (dx * dx + dy * dy).sqrt();
        let elapsed = input.timestamp - info.start_time;

        let config = self.config.borrow();
        if moved <= config.tap_slop && elapsed <= config.tap_timeout {
            let world = self.camera.apply_to_point(input.x, input.y);
            let payload = TapPayload {
                screen: Point::new(input.x, input.y),
                world,
            };
            self.bus.emit(EventName::TAP, &payload);
        }
    }
}
