//! A single scene layer.
//!
//! "A layer owns (optionally) a raster surface and (optionally) an HTML
//! overlay... Implementations must guarantee: all event listeners and
//! signal subscriptions registered via the wrappers are released on
//! `detach`, with no leaks across reattach cycles." The surfaces
//! themselves are opaque host objects the engine never draws into or
//! reads from — they're carried as `Rc<dyn Any>` exactly the way
//! `diagraph-tree`'s `RenderContext` carries an opaque paint target, so
//! a host can downcast to whatever its platform's canvas/DOM handle type
//! actually is.

use diagraph_camera::Camera;
use diagraph_events::{EventBus, EventName, Propagation, ScopeId, SubscribeOptions};
use diagraph_foundation::ListenerId;
use diagraph_types::Transform2D;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

struct CameraBinding {
    camera: Rc<Camera>,
    listener: ListenerId,
}

/// One stacked layer. `z_index` determines draw/event order within a
/// [`crate::LayerStack`]; `insertion_index` (assigned once, at
/// construction) is the stable tie-break, mirroring the component
/// kernel's `(z_index, insertion_index)` render ordering.
pub struct Layer {
    id: LayerId,
    z_index: Cell<i32>,
    insertion_index: u64,
    width: Cell<f64>,
    height: Cell<f64>,
    canvas: RefCell<Option<Rc<dyn Any>>>,
    html: RefCell<Option<Rc<dyn Any>>>,
    attached: Cell<bool>,
    bus_scope: Cell<Option<ScopeId>>,
    camera_binding: RefCell<Option<CameraBinding>>,
}

impl Layer {
    pub fn new(z_index: i32) -> Rc<Self> {
        Rc::new(Self {
            id: LayerId::next(),
            z_index: Cell::new(z_index),
            insertion_index: next_insertion_index(),
            width: Cell::new(0.0),
            height: Cell::new(0.0),
            canvas: RefCell::new(None),
            html: RefCell::new(None),
            attached: Cell::new(false),
            bus_scope: Cell::new(None),
            camera_binding: RefCell::new(None),
        })
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn z_index(&self) -> i32 {
        self.z_index.get()
    }

    pub fn set_z_index(&self, z_index: i32) {
        self.z_index.set(z_index);
    }

    pub fn insertion_index(&self) -> u64 {
        self.insertion_index
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// `set_props` (): install the opaque surface handles a
    /// host constructed for this layer. Either may be absent — "a layer
    /// owns *(optionally)* a raster surface and *(optionally)* an HTML
    /// overlay".
    pub fn set_props(&self, canvas: Option<Rc<dyn Any>>, html: Option<Rc<dyn Any>>) {
        *self.canvas.borrow_mut() = canvas;
        *self.html.borrow_mut() = html;
    }

    pub fn get_canvas(&self) -> Option<Rc<dyn Any>> {
        self.canvas.borrow().clone()
    }

    pub fn get_html(&self) -> Option<Rc<dyn Any>> {
        self.html.borrow().clone()
    }

    pub fn update_size(&self, width: f64, height: f64) {
        self.width.set(width);
        self.height.set(height);
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width.get(), self.height.get())
    }

    /// Open this layer's detach scope on `bus`. Idempotent: attaching an
    /// already-attached layer is a no-op, since a fresh scope would orphan
    /// the previous one's subscriptions without ever aborting them.
    pub fn attach(&self, bus: &EventBus) {
        if self.attached.get() {
            return;
        }
        self.bus_scope.set(Some(bus.create_scope()));
        self.attached.set(true);
    }

    /// Subscribe to a bus event for the lifetime of this attach cycle.
    /// Must be called after [`Layer::attach`]; the subscription is
    /// released automatically on [`Layer::detach`].
    pub fn on_bus_event(
        &self,
        bus: &EventBus,
        name: EventName,
        handler: impl Fn(&dyn Any) -> Propagation + 'static,
    ) -> Option<ListenerId> {
        let scope = self.bus_scope.get()?;
        Some(bus.on_opts(name, handler, SubscribeOptions::scoped(scope)))
    }

    /// Mirror the camera's world->screen transform onto this layer's HTML
    /// overlay — "the camera-change listener optionally multiplies an
    /// HTML overlay's affine transform so it follows world space exactly"
    /// (). Rebinding replaces any previous binding rather
    /// than stacking listeners.
    pub fn bind_camera(&self, camera: Rc<Camera>, on_change: impl Fn(Transform2D) + 'static) {
        self.unbind_camera();
        let bound_camera = camera.clone();
        let listener = camera.on_camera_change(move || on_change(bound_camera.transform()));
        *self.camera_binding.borrow_mut() = Some(CameraBinding { camera, listener });
    }

    fn unbind_camera(&self) {
        if let Some(binding) = self.camera_binding.borrow_mut().take() {
            binding.camera.remove_camera_change_listener(binding.listener);
        }
    }

    /// Release every bus subscription and the camera binding registered
    /// since the last `attach`. Safe to call on an already-detached
    /// layer. Reattaching afterward starts from a clean scope, so nothing
    /// registered before this call can fire again.
    pub fn detach(&self, bus: &EventBus) {
        if !self.attached.get() {
            return;
        }
        if let Some(scope) = self.bus_scope.take() {
            bus.abort_scope(scope);
        }
        self.unbind_camera();
        self.attached.set(false);
    }
}

fn next_insertion_index() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagraph_camera::Camera;
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn detach_releases_bus_subscriptions_registered_since_attach() {
        let bus = EventBus::new();
        let layer = Layer::new(0);
        layer.attach(&bus);

        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        layer.on_bus_event(&bus, EventName::TAP, move |_| {
            f.set(true);
            Propagation::Continue
        });

        layer.detach(&bus);
        bus.emit(EventName::TAP, &());
        assert!(!fired.get(), "detach must unsubscribe every handler registered via the layer");
    }

    #[test]
    fn reattach_after_detach_does_not_leak_the_old_scope() {
        let bus = EventBus::new();
        let layer = Layer::new(0);

        layer.attach(&bus);
        let first_calls = Rc::new(Cell::new(0));
        let f = first_calls.clone();
        layer.on_bus_event(&bus, EventName::TAP, move |_| {
            f.set(f.get() + 1);
            Propagation::Continue
        });
        layer.detach(&bus);

        layer.attach(&bus);
        let second_calls = Rc::new(Cell::new(0));
        let s = second_calls.clone();
        layer.on_bus_event(&bus, EventName::TAP, move |_| {
            s.set(s.get() + 1);
            Propagation::Continue
        });

        bus.emit(EventName::TAP, &());
        assert_eq!(first_calls.get(), 0, "handlers from the first attach cycle must stay dead");
        assert_eq!(second_calls.get(), 1, "handlers from the current attach cycle must fire");
    }

    #[test]
    fn camera_binding_syncs_on_every_camera_change_and_rebinding_replaces_it() {
        let layer = Layer::new(0);
        let camera = Rc::new(Camera::new(200.0, 200.0));

        let seen_a = Rc::new(StdRefCell::new(0));
        let s = seen_a.clone();
        layer.bind_camera(camera.clone(), move |_t| *s.borrow_mut() += 1);

        camera.pan(5.0, 0.0);
        assert_eq!(*seen_a.borrow(), 1);

        let seen_b = Rc::new(StdRefCell::new(0));
        let s = seen_b.clone();
        layer.bind_camera(camera.clone(), move |_t| *s.borrow_mut() += 1);

        camera.pan(5.0, 0.0);
        assert_eq!(*seen_a.borrow(), 1, "old binding must stop firing once replaced");
        assert_eq!(*seen_b.borrow(), 1);
    }

    #[test]
    fn detach_also_releases_the_camera_binding() {
        let bus = EventBus::new();
        let layer = Layer::new(0);
        let camera = Rc::new(Camera::new(200.0, 200.0));
        layer.attach(&bus);

        let seen = Rc::new(StdRefCell::new(0));
        let s = seen.clone();
        layer.bind_camera(camera.clone(), move |_t| *s.borrow_mut() += 1);

        layer.detach(&bus);
        camera.pan(5.0, 0.0);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn set_props_and_get_canvas_round_trip_an_opaque_handle() {
        let layer = Layer::new(0);
        let handle: Rc<dyn Any> = Rc::new(42u32);
        layer.set_props(Some(handle.clone()), None);

        let got = layer.get_canvas().expect("canvas handle should round-trip");
        assert_eq!(*got.downcast_ref::<u32>().unwrap(), 42);
        assert!(layer.get_html().is_none());
    }
}
