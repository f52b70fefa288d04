//! The root component every [`crate::Graph`] mounts: it is the piece that
//! turns `GraphStore`'s id lists into `ChildSpec`s for `diagraph-components`
//! (Connection invariant: "both endpoints resolve to live
//! blocks or the connection is considered broken and is not rendered" — see
//! `diagraph_components::ConnectionComponent`'s module docs, which name
//! this file as the place that decision gets made).

use diagraph_camera::Camera;
use diagraph_components::{
    BlockComponent, BlockProps, ComponentRegistry, ConnectionComponent, ConnectionProps, Curve,
    Palette, BLOCK_TYPE_TAG, CONNECTION_TYPE_TAG,
};
use diagraph_hittest::HitTestIndex;
use diagraph_store::GraphStore;
use diagraph_tree::{ChildSpec, Component, RenderContext};
use diagraph_types::EntityId;
use std::any::Any;
use std::rc::Rc;

/// Render-time options the root reads fresh from [`crate::Graph::settings`]
/// on every `update_children` call, so a settings change takes effect on
/// the next frame without remounting anything.
#[derive(Debug, Clone, Copy)]
pub struct RootRenderOptions {
    pub use_blocks_anchors: bool,
    pub use_bezier_connections: bool,
    pub show_connection_arrows: bool,
    pub show_connection_labels: bool,
    pub stroke_threshold_px: f64,
}

pub struct GraphRootProps {
    pub store: Rc<GraphStore>,
    pub camera: Rc<Camera>,
    pub hit_index: Rc<HitTestIndex>,
    /// `settings.block_components`.
    pub block_registry: Rc<ComponentRegistry>,
    /// `settings.connection_components`.
    pub connection_registry: Rc<ComponentRegistry>,
    pub palette: Palette,
    pub options: RootRenderOptions,
}

pub const GRAPH_ROOT_TYPE_TAG: &str = "graph-root";

/// Owns no geometry of its own — `is_visible`/`z_index`/`order` stay at
/// their trait defaults, and `render` is a no-op. Its only job is
/// `update_children`: walk the store's current id lists and produce one
/// `ChildSpec` per live block and per live (non-broken) connection.
pub struct GraphRoot {
    props: Option<GraphRootProps>,
}

impl GraphRoot {
    pub fn new(props: GraphRootProps) -> Self {
        Self { props: Some(props) }
    }

    fn props(&self) -> &GraphRootProps {
        self.props.as_ref().expect("GraphRoot rendered before set_props")
    }

    fn block_child(&self, id: &EntityId, z_index: i32) -> Option<ChildSpec> {
        let props = self.props();
        let block_signal = props.store.blocks.get(id)?;
        let block = block_signal.peek();

        let anchors = if props.options.use_blocks_anchors {
            block
                .anchors
                .iter()
                .filter_map(|anchor_id| {
                    props
                        .store
                        .anchors
                        .get(anchor_id)
                        .map(|signal| (anchor_id.clone(), signal))
                })
                .collect()
        } else {
            Vec::new()
        };

        let block_props = BlockProps {
            id: id.clone(),
            block: block_signal,
            anchors,
            camera: props.camera.clone(),
            palette: props.palette,
            hit_index: props.hit_index.clone(),
            z_index,
        };

        let kind_tag = block.kind_tag.clone();
        if props.block_registry.is_registered(&kind_tag) {
            return Some(ChildSpec::new(
                id.to_string(),
                BLOCK_TYPE_TAG,
                Box::new(block_props) as Box<dyn Any>,
                Rc::new({
                    let registry = props.block_registry.clone();
                    move |props: Box<dyn Any>| {
                        registry
                            .create(&kind_tag, props)
                            .expect("registered kind_tag vanished between lookup and create")
                    }
                }),
            ));
        }

        Some(ChildSpec::new(
            id.to_string(),
            BLOCK_TYPE_TAG,
            Box::new(block_props),
            Rc::new(|props: Box<dyn Any>| {
                Box::new(BlockComponent::new(*props.downcast::<BlockProps>().expect("block props")))
                    as Box<dyn Component>
            }),
        ))
    }

    fn connection_child(&self, id: &EntityId, live_block_ids: &ahash::HashSet<EntityId>, z_index: i32) -> Option<ChildSpec> {
        let props = self.props();
        let connection_signal = props.store.connections.get(id)?;
        let connection = connection_signal.peek();

        if !connection.is_live(live_block_ids) {
            return None;
        }

        let source_block = props.store.blocks.get(&connection.source_block)?;
        let target_block = props.store.blocks.get(&connection.target_block)?;

        let source_anchor_point = connection
            .source_anchor
            .as_ref()
            .and_then(|id| props.store.anchors.get(id))
            .map(|signal| signal.peek().position_hint);
        let target_anchor_point = connection
            .target_anchor
            .as_ref()
            .and_then(|id| props.store.anchors.get(id))
            .map(|signal| signal.peek().position_hint);

        let curve = if props.options.use_bezier_connections {
            Curve::Bezier
        } else {
            Curve::Straight
        };

        let connection_props = ConnectionProps {
            id: id.clone(),
            connection: connection_signal,
            source_block,
            target_block,
            source_anchor_point,
            target_anchor_point,
            curve,
            camera: props.camera.clone(),
            palette: props.palette,
            hit_index: props.hit_index.clone(),
            z_index,
            stroke_threshold_px: props.options.stroke_threshold_px,
            show_arrows: props.options.show_connection_arrows,
            show_labels: props.options.show_connection_labels,
        };

        let kind_tag = connection.kind_tag.clone();
        if props.connection_registry.is_registered(&kind_tag) {
            return Some(ChildSpec::new(
                id.to_string(),
                CONNECTION_TYPE_TAG,
                Box::new(connection_props) as Box<dyn Any>,
                Rc::new({
                    let registry = props.connection_registry.clone();
                    move |props: Box<dyn Any>| {
                        registry
                            .create(&kind_tag, props)
                            .expect("registered kind_tag vanished between lookup and create")
                    }
                }),
            ));
        }

        Some(ChildSpec::new(
            id.to_string(),
            CONNECTION_TYPE_TAG,
            Box::new(connection_props),
            Rc::new(|props: Box<dyn Any>| {
                Box::new(ConnectionComponent::new(*props.downcast::<ConnectionProps>().expect("connection props")))
                    as Box<dyn Component>
            }),
        ))
    }
}

impl Component for GraphRoot {
    fn set_props(&mut self, props: Box<dyn Any>) {
        if let Ok(props) = props.downcast::<GraphRootProps>() {
            self.props = Some(*props);
        }
    }

    /// Connections render above blocks within a frame (drawn last so their
    /// strokes aren't occluded by block fills); both groups keep the
    /// store's id-list order as their secondary tie-break, ahead of the
    /// kernel's own insertion-index fallback.
    fn update_children(&mut self) -> Vec<ChildSpec> {
        let props = self.props();
        let block_ids = props.store.blocks.ids().peek();
        let live_block_ids: ahash::HashSet<EntityId> = block_ids.iter().cloned().collect();

        let mut children: Vec<ChildSpec> = block_ids
            .iter()
            .enumerate()
            .filter_map(|(i, id)| self.block_child(id, i as i32))
            .collect();

        let connection_ids = props.store.connections.ids().peek();
        children.extend(
            connection_ids
                .iter()
                .enumerate()
                .filter_map(|(i, id)| self.connection_child(id, &live_block_ids, i as i32)),
        );

        children
    }

    fn render(&mut self, _ctx: &mut dyn RenderContext) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
