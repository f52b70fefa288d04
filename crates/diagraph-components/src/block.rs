//! The block component (): LoD-dispatched rendering of one
//! `Block` entity, driven by its reactive [`Signal`] rather than a copied
//! snapshot — reading `block.get()` inside `render` means a future move
//! to tracked/computed rendering doesn't need to touch this file.

use crate::anchor::{AnchorComponent, AnchorProps};
use crate::paint::{Color, GraphRenderContext, Palette};
use diagraph_camera::{Camera, ScaleLevel};
use diagraph_hittest::{AcceptAll, HitTestIndex};
use diagraph_reactive::Signal;
use diagraph_store::{Anchor, Block};
use diagraph_tree::{ChildSpec, Component, RenderContext};
use diagraph_types::EntityId;
use std::any::Any;
use std::rc::Rc;

pub const BLOCK_TYPE_TAG: &str = "block";

/// Props for one [`BlockComponent`] instance. `anchors` is only consulted
/// at the `Detailed` scale level — : "Detailed (scale >=
/// tau_1): full body with anchors and inner content."
#[derive(Clone)]
pub struct BlockProps {
    pub id: EntityId,
    pub block: Signal<Block>,
    pub anchors: Vec<(EntityId, Signal<Anchor>)>,
    pub camera: Rc<Camera>,
    pub palette: Palette,
    pub hit_index: Rc<HitTestIndex>,
    pub z_index: i32,
}

pub struct BlockComponent {
    props: Option<BlockProps>,
}

impl BlockComponent {
    pub fn new(props: BlockProps) -> Self {
        Self { props: Some(props) }
    }

    fn props(&self) -> &BlockProps {
        self.props.as_ref().expect("BlockComponent rendered before set_props")
    }
}

impl Component for BlockComponent {
    fn set_props(&mut self, props: Box<dyn Any>) {
        if let Ok(props) = props.downcast::<BlockProps>() {
            self.props = Some(*props);
        }
    }

    fn update_children(&mut self) -> Vec<ChildSpec> {
        let props = self.props();
        if props.camera.scale_level() != ScaleLevel::Detailed {
            return Vec::new();
        }
        let block_signal = props.block.clone();
        props
            .anchors
            .iter()
            .map(|(anchor_id, anchor_signal)| {
                let anchor_props = AnchorProps {
                    id: anchor_id.clone(),
                    anchor: anchor_signal.clone(),
                    owner_block: block_signal.clone(),
                    camera: props.camera.clone(),
                    palette: props.palette,
                    hit_index: props.hit_index.clone(),
                };
                ChildSpec::new(
                    anchor_id.to_string(),
                    crate::anchor::ANCHOR_TYPE_TAG,
                    Box::new(anchor_props),
                    Rc::new(|props: Box<dyn Any>| {
                        Box::new(AnchorComponent::new(*props.downcast::<AnchorProps>().unwrap()))
                            as Box<dyn Component>
                    }),
                )
            })
            .collect()
    }

    fn render(&mut self, ctx: &mut dyn RenderContext) {
        let props = self.props();
        let block = props.block.get();
        let rect = block.rect();
        let level = props.camera.scale_level();

        if let Some(ctx) = ctx.as_any_mut().downcast_mut::<GraphRenderContext>() {
            let palette = ctx.palette();
            let fill = if block.selected { palette.fill_selected } else { palette.fill };
            let paint = ctx.paint_mut();
            paint.fill_rect(rect, fill);

            if level != ScaleLevel::Minimalistic {
                paint.stroke_rect(rect, palette.border, 1.0);
                paint.draw_text(rect.center(), &block.name, palette.text);
            }
        }

        props
            .hit_index
            .insert_with_flags(props.id.clone(), rect, props.z_index, Rc::new(AcceptAll), true, true);
    }

    fn z_index(&self) -> i32 {
        self.props().z_index
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
