//! The top-level `Graph` facade: constructs every per-graph resource from a [`GraphConfig`],
//! wires the few cross-crate integrations that aren't implicit in any one
//! module (selection -> event bus, camera `zoom_to`), and exposes the
//! per-frame driver a host calls once per display refresh.

use crate::config::{CanChangeBlockGeometry, GraphConfig};
use crate::root::{GraphRoot, GraphRootProps, RootRenderOptions, GRAPH_ROOT_TYPE_TAG};
use diagraph_animation::Animation;
use diagraph_camera::Camera;
use diagraph_components::{ComponentRegistry, Palette};
use diagraph_events::{EventBus, EventName, SelectionChangePayload};
use diagraph_foundation::Error;
use diagraph_hittest::HitTestIndex;
use diagraph_interaction::{GestureConfig, GestureController, PointerInput};
use diagraph_layer::{Layer, LayerStack};
use diagraph_scheduler::{FrameReport, Priority, Scheduler};
use diagraph_selection::{Cardinality, SelectionService, Strategy};
use diagraph_store::GraphStore;
use diagraph_tree::Tree;
use diagraph_types::{EntityId, Rect};
use std::cell::RefCell;
use std::rc::Rc;

const BLOCK_BUCKET: &str = "block";
const CONNECTION_BUCKET: &str = "connection";
const GROUP_BUCKET: &str = "group";

/// Where to center [`Graph::zoom_to`].
pub enum ZoomTarget<'a> {
    /// Fit the hit index's current usable rect (every block/group that
    /// contributes to it).
    Center,
    /// Fit the bounding union of the named blocks.
    Blocks(&'a [EntityId]),
}

/// Owns every per-graph resource and the handful of cross-cutting wires
/// left to "whoever owns the component tree": connection
/// liveness (already the `GraphRoot`'s job, see `crate::root`),
/// selection-change bus events, and `zoom_to`.
pub struct Graph {
    store: Rc<GraphStore>,
    camera: Rc<Camera>,
    hit_index: Rc<HitTestIndex>,
    selection: Rc<SelectionService>,
    bus: Rc<EventBus>,
    scheduler: Rc<Scheduler>,
    gestures: GestureController,
    layers: RefCell<LayerStack>,
    block_registry: Rc<ComponentRegistry>,
    connection_registry: Rc<ComponentRegistry>,
    tree: Tree,
    render_options: RefCell<RootRenderOptions>,
    settings: RefCell<crate::config::Settings>,
    clock: Rc<dyn Fn() -> f64>,
}

impl Graph {
    /// Build a graph from `config`, after validating it
    /// (validation errors are caller-visible, surfaced before any resource
    /// is constructed). `clock` supplies "now" in seconds for any
    /// [`Animation`] created through [`Graph::new_animation`] — the engine
    /// itself never reads the wall clock.
    pub fn new(config: GraphConfig, clock: Rc<dyn Fn() -> f64>) -> Result<Self, Error> {
        config.validate()?;

        let store = Rc::new(GraphStore::new());
        store.set_blocks(config.blocks.clone());
        store.set_connections(config.connections.clone());
        store.set_anchors(config.anchors.clone());
        store.set_groups(config.groups.clone());

        let constants = &config.view_configuration.constants;
        let camera = Rc::new(
            Camera::new(config.viewport_width, config.viewport_height)
                .with_thresholds(constants.scale_thresholds()),
        );

        let hit_index = Rc::new(HitTestIndex::new());

        let selection = SelectionService::new();
        selection.register_bucket(BLOCK_BUCKET, Cardinality::Multiple);
        selection.register_bucket(CONNECTION_BUCKET, Cardinality::Multiple);
        selection.register_bucket(GROUP_BUCKET, Cardinality::Multiple);

        let bus = Rc::new(EventBus::new());
        wire_selection_change_events(&selection, &bus);

        let scheduler = Rc::new(Scheduler::new());
        let gesture_config = GestureConfig {
            can_drag_camera: config.settings.can_drag_camera,
            can_zoom_camera: config.settings.can_zoom_camera,
            can_change_block_geometry: config.settings.can_change_block_geometry,
            ..GestureConfig::default()
        };
        let gestures =
            GestureController::with_config(camera.clone(), hit_index.clone(), store.clone(), bus.clone(), gesture_config);

        // `props` is an opaque bag interpreted by a host-supplied
        // layer factory; this facade only owns the stacking order.
        let mut layers = LayerStack::new();
        for spec in &config.layers {
            layers.push(Layer::new(spec.z_index));
        }

        let block_registry = Rc::new(ComponentRegistry::with_defaults());
        let connection_registry = Rc::new(ComponentRegistry::new());

        let palette = config.view_configuration.colors.apply(Palette::default());
        let render_options = RootRenderOptions {
            use_blocks_anchors: config.settings.use_blocks_anchors,
            use_bezier_connections: config.settings.use_bezier_connections,
            show_connection_arrows: config.settings.show_connection_arrows,
            show_connection_labels: config.settings.show_connection_labels,
            stroke_threshold_px: constants.connection_stroke_threshold_px,
        };

        let root_props = GraphRootProps {
            store: store.clone(),
            camera: camera.clone(),
            hit_index: hit_index.clone(),
            block_registry: block_registry.clone(),
            connection_registry: connection_registry.clone(),
            palette,
            options: render_options,
        };
        let tree = Tree::new(GRAPH_ROOT_TYPE_TAG, Box::new(GraphRoot::new(root_props)));

        Ok(Self {
            store,
            camera,
            hit_index,
            selection,
            bus,
            scheduler,
            gestures,
            layers: RefCell::new(layers),
            block_registry,
            connection_registry,
            tree,
            render_options: RefCell::new(render_options),
            settings: RefCell::new(config.settings),
            clock,
        })
    }

    pub fn store(&self) -> &Rc<GraphStore> {
        &self.store
    }

    pub fn camera(&self) -> &Rc<Camera> {
        &self.camera
    }

    pub fn hit_index(&self) -> &Rc<HitTestIndex> {
        &self.hit_index
    }

    pub fn selection(&self) -> &Rc<SelectionService> {
        &self.selection
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn scheduler(&self) -> &Rc<Scheduler> {
        &self.scheduler
    }

    pub fn layers(&self) -> std::cell::Ref<'_, LayerStack> {
        self.layers.borrow()
    }

    pub fn layers_mut(&self) -> std::cell::RefMut<'_, LayerStack> {
        self.layers.borrow_mut()
    }

    /// `block_components[kind_tag]`: register a custom block
    /// factory. Does not affect blocks already mounted this frame; takes
    /// effect the next time `update_children` walks that block's id.
    pub fn register_block_kind(
        &self,
        kind_tag: impl Into<String>,
        factory: Rc<dyn Fn(Box<dyn std::any::Any>) -> Box<dyn diagraph_tree::Component>>,
    ) {
        self.block_registry.register(kind_tag, factory);
    }

    /// `connection_components[kind_tag]`.
    pub fn register_connection_kind(
        &self,
        kind_tag: impl Into<String>,
        factory: Rc<dyn Fn(Box<dyn std::any::Any>) -> Box<dyn diagraph_tree::Component>>,
    ) {
        self.connection_registry.register(kind_tag, factory);
    }

    /// `select(entity_type, ids, select, strategy)` (),
    /// forwarded straight to the selection service; the bus event this
    /// triggers is wired once, at construction (see
    /// `wire_selection_change_events`).
    pub fn select(&self, entity_type: &str, ids: &[EntityId], select: bool, strategy: Strategy) -> bool {
        self.selection.select(entity_type, ids, select, strategy)
    }

    /// Current `can_change_block_geometry` setting.
    pub fn can_change_block_geometry(&self) -> CanChangeBlockGeometry {
        self.settings.borrow().can_change_block_geometry
    }

    /// Replace the live settings wholesale. Render-affecting fields
    /// (`use_blocks_anchors`, `use_bezier_connections`,
    /// `show_connection_arrows`, `show_connection_labels`) take effect on
    /// the `GraphRoot`'s next `update_children` call; the camera-drag,
    /// camera-zoom and block-geometry gates are picked up by the gesture
    /// controller on its next default action.
    pub fn set_settings(&self, settings: crate::config::Settings) {
        let mut options = self.render_options.borrow_mut();
        options.use_blocks_anchors = settings.use_blocks_anchors;
        options.use_bezier_connections = settings.use_bezier_connections;
        options.show_connection_arrows = settings.show_connection_arrows;
        options.show_connection_labels = settings.show_connection_labels;
        self.tree
            .root()
            .set_props(Box::new(GraphRootProps {
                store: self.store.clone(),
                camera: self.camera.clone(),
                hit_index: self.hit_index.clone(),
                block_registry: self.block_registry.clone(),
                connection_registry: self.connection_registry.clone(),
                palette: settings_palette(&settings),
                options: *options,
            }));
        self.gestures.set_config(GestureConfig {
            can_drag_camera: settings.can_drag_camera,
            can_zoom_camera: settings.can_zoom_camera,
            can_change_block_geometry: settings.can_change_block_geometry,
            ..self.gestures.config()
        });
        *self.settings.borrow_mut() = settings;
    }

    /// `zoom_to("center" | ids, opts)` (): not implemented
    /// by `diagraph-camera::Camera` itself (it only knows `zoom_to_rect`),
    /// because resolving "center" or a block-id list into a world rect
    /// needs the store and hit index — both of which only the facade
    /// holds together. `padding` is in screen pixels, matching
    /// `Camera::zoom_to_rect`.
    pub fn zoom_to(&self, target: ZoomTarget<'_>, padding: f64) {
        let rect = match target {
            ZoomTarget::Center => self.hit_index.usable_rect(),
            ZoomTarget::Blocks(ids) => Rect::union_all(ids.iter().filter_map(|id| {
                self.store.blocks.get(id).map(|signal| signal.peek().rect())
            })),
        };
        if let Some(rect) = rect {
            self.camera.zoom_to_rect(rect, padding);
        }
    }

    /// Pointer input passthrough (): the facade owns no
    /// gesture logic of its own, it only forwards to the controller that
    /// already wires default pan/zoom/drag actions into `camera`/`store`.
    pub fn pointer_down(&self, input: PointerInput) {
        self.gestures.pointer_down(input);
    }

    pub fn pointer_move(&self, input: PointerInput) {
        self.gestures.pointer_move(input);
    }

    pub fn pointer_up(&self, input: PointerInput) {
        self.gestures.pointer_up(input);
    }

    pub fn pointer_cancel(&self, pointer_id: diagraph_interaction::PointerId) {
        self.gestures.pointer_cancel(pointer_id);
    }

    /// Build a new [`Animation`] sharing this graph's scheduler and clock.
    /// The animation reschedules its own ticks through the scheduler
    /// () — `Graph::run_frame` does not need to drive it
    /// separately, draining the scheduler is enough.
    pub fn new_animation(&self) -> Rc<Animation> {
        Animation::new(self.scheduler.clone(), self.clock.clone())
    }

    /// Drive one display-refresh cycle (ordering): tasks the
    /// host and the gesture/animation machinery already queued onto
    /// `scheduler` run first (in `Input > Update > Render > Idle` priority
    /// order, which is also where a ticking `Animation`'s self-requeued
    /// step lands), then the component tree's update phase, then the hit
    /// index's deferred `once("update")` callbacks flush, then the render
    /// phase.
    pub fn run_frame(&self, ctx: &mut dyn diagraph_tree::RenderContext) -> FrameReport {
        let report = self.scheduler.run_frame();

        self.tree.run_update_phase();
        self.hit_index.flush();
        self.tree.run_render_phase(ctx);

        report
    }

    /// Queue `callback` at `priority` for the next [`Graph::run_frame`]
    /// (), for hosts that want their own work cooperatively
    /// scheduled alongside the engine's.
    pub fn request_frame(&self, priority: Priority, callback: impl FnOnce() + 'static) {
        self.scheduler.request_frame(priority, callback);
    }
}

fn settings_palette(_settings: &crate::config::Settings) -> Palette {
    // Settings carries no palette fields of its own (`view_configuration`
    // does); `set_settings` keeps whatever palette the graph already has.
    Palette::default()
}

/// Bridge `SelectionService`'s per-bucket `on_selection_change` hook into
/// `EventName::SELECTION_CHANGE` bus events. The selection service has no
/// bus of its own; this is the one place
/// that connects them.
fn wire_selection_change_events(selection: &Rc<SelectionService>, bus: &Rc<EventBus>) {
    for entity_type in [BLOCK_BUCKET, CONNECTION_BUCKET, GROUP_BUCKET] {
        let Some(bucket) = selection.bucket(entity_type) else {
            continue;
        };
        let bus = bus.clone();
        bucket.on_selection_change(move |diff| {
            let payload = SelectionChangePayload {
                entity_type,
                list: diff.list.clone(),
                added: diff.added.clone(),
                removed: diff.removed.clone(),
            };
            bus.emit(EventName::SELECTION_CHANGE, &payload);
            diagraph_selection::ChangeDecision::Apply
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagraph_events::Propagation;
    use diagraph_store::Block;
    use diagraph_types::EntityId as Id;

    fn test_clock() -> Rc<dyn Fn() -> f64> {
        Rc::new(|| 0.0)
    }

    fn config_with_two_blocks() -> GraphConfig {
        let mut config = GraphConfig::default();
        config.blocks = vec![
            Block {
                id: Id::from_str("a"),
                kind_tag: "default".into(),
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 10.0,
                name: "a".into(),
                group: None,
                selected: false,
                anchors: Vec::new(),
                user_meta: serde_json::Value::Null,
            },
            Block {
                id: Id::from_str("b"),
                kind_tag: "default".into(),
                x: 100.0,
                y: 100.0,
                w: 10.0,
                h: 10.0,
                name: "b".into(),
                group: None,
                selected: false,
                anchors: Vec::new(),
                user_meta: serde_json::Value::Null,
            },
        ];
        config
    }

    #[test]
    fn invalid_config_is_rejected_before_any_resource_is_built() {
        let mut config = GraphConfig::default();
        config.blocks = vec![Block {
            id: Id::from_str("a"),
            kind_tag: "default".into(),
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 10.0,
            name: "a".into(),
            group: None,
            selected: false,
            anchors: Vec::new(),
            user_meta: serde_json::Value::Null,
        }];
        assert!(Graph::new(config, test_clock()).is_err());
    }

    #[test]
    fn constructed_graph_mounts_one_child_per_block() {
        let graph = Graph::new(config_with_two_blocks(), test_clock()).expect("valid config");
        graph.tree.run_update_phase();
        assert_eq!(graph.tree.root().children().len(), 2);
    }

    #[test]
    fn select_block_emits_selection_change() {
        let graph = Graph::new(config_with_two_blocks(), test_clock()).expect("valid config");
        let fired = Rc::new(RefCell::new(false));
        let f = fired.clone();
        graph.bus.on(EventName::SELECTION_CHANGE, move |_| {
            *f.borrow_mut() = true;
            Propagation::Continue
        });

        graph.select(BLOCK_BUCKET, &[Id::from_str("a")], true, Strategy::Replace);
        assert!(*fired.borrow());
    }

    #[test]
    fn zoom_to_center_fits_the_usable_rect() {
        let graph = Graph::new(config_with_two_blocks(), test_clock()).expect("valid config");
        graph.tree.run_update_phase();
        graph.hit_index.flush();

        graph.zoom_to(ZoomTarget::Center, 10.0);
        // Constructing without panicking and leaving the camera at a
        // finite, positive scale is the property under test; exact
        // fit math is covered in `diagraph_camera::Camera`'s own tests.
        assert!(graph.camera.scale() > 0.0);
    }
}
