//! The anchor component (): only ever mounted as a
//! `BlockComponent` child at the `Detailed` scale level — "full body with
//! anchors and inner content."

use crate::paint::{GraphRenderContext, Palette};
use diagraph_camera::Camera;
use diagraph_hittest::{AcceptAll, HitTestIndex};
use diagraph_reactive::Signal;
use diagraph_store::{Anchor, Block};
use diagraph_tree::{ChildSpec, Component, RenderContext};
use diagraph_types::{EntityId, Rect};
use std::any::Any;
use std::rc::Rc;

pub const ANCHOR_TYPE_TAG: &str = "anchor";

const ANCHOR_RADIUS: f64 = 3.0;

#[derive(Clone)]
pub struct AnchorProps {
    pub id: EntityId,
    pub anchor: Signal<Anchor>,
    /// The owning block, read to resolve `position_hint` (block-relative)
    /// into an absolute world point.
    pub owner_block: Signal<Block>,
    pub camera: Rc<Camera>,
    pub palette: Palette,
    pub hit_index: Rc<HitTestIndex>,
}

pub struct AnchorComponent {
    props: Option<AnchorProps>,
}

impl AnchorComponent {
    pub fn new(props: AnchorProps) -> Self {
        Self { props: Some(props) }
    }

    fn props(&self) -> &AnchorProps {
        self.props.as_ref().expect("AnchorComponent rendered before set_props")
    }
}

impl Component for AnchorComponent {
    fn set_props(&mut self, props: Box<dyn Any>) {
        if let Ok(props) = props.downcast::<AnchorProps>() {
            self.props = Some(*props);
        }
    }

    fn update_children(&mut self) -> Vec<ChildSpec> {
        Vec::new()
    }

    fn render(&mut self, ctx: &mut dyn RenderContext) {
        let props = self.props();
        let anchor = props.anchor.get();
        let block = props.owner_block.get();
        let absolute = diagraph_types::Point::new(
            block.x + anchor.position_hint.x,
            block.y + anchor.position_hint.y,
        );

        if let Some(ctx) = ctx.as_any_mut().downcast_mut::<GraphRenderContext>() {
            let palette = ctx.palette();
            ctx.paint_mut().fill_circle(absolute, ANCHOR_RADIUS, palette.border);
        }

        let hit_rect = Rect::new(
            absolute.x - ANCHOR_RADIUS,
            absolute.y - ANCHOR_RADIUS,
            ANCHOR_RADIUS * 2.0,
            ANCHOR_RADIUS * 2.0,
        );
        props.hit_index.insert_with_flags(
            props.id.clone(),
            hit_rect,
            1, // drawn above the owning block.
            Rc::new(AcceptAll),
            true,
            false, // anchors don't extend the graph's usable-rect on their own.
        );
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{Color, Paint};
    use diagraph_types::{AnchorDirection, Point};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingPaint {
        circles: Rc<RefCell<Vec<Point>>>,
    }

    impl Paint for RecordingPaint {
        fn fill_rect(&mut self, _rect: Rect, _color: Color) {}
        fn stroke_rect(&mut self, _rect: Rect, _color: Color, _width: f64) {}
        fn draw_text(&mut self, _at: Point, _text: &str, _color: Color) {}
        fn stroke_polyline(&mut self, _points: &[Point], _color: Color, _width: f64) {}
        fn fill_circle(&mut self, center: Point, _radius: f64, _color: Color) {
            self.circles.borrow_mut().push(center);
        }
    }

    #[test]
    fn renders_at_an_absolute_position_offset_from_its_owning_block() {
        let block = Block {
            id: EntityId::from_str("b1"),
            kind_tag: "default".into(),
            x: 100.0,
            y: 200.0,
            w: 10.0,
            h: 10.0,
            name: "b".into(),
            group: None,
            selected: false,
            anchors: Vec::new(),
            user_meta: serde_json::Value::Null,
        };
        let anchor = Anchor {
            id: EntityId::from_str("a1"),
            owner_block: EntityId::from_str("b1"),
            direction: AnchorDirection::Out,
            position_hint: Point::new(10.0, 0.0),
            user_meta: serde_json::Value::Null,
        };

        let hit_index = Rc::new(HitTestIndex::new());
        let props = AnchorProps {
            id: EntityId::from_str("a1"),
            anchor: Signal::new(anchor),
            owner_block: Signal::new(block),
            camera: Rc::new(Camera::new(400.0, 400.0)),
            palette: Palette::default(),
            hit_index: hit_index.clone(),
        };
        let mut component = AnchorComponent::new(props);

        let paint = RecordingPaint::default();
        let circles = paint.circles.clone();
        let mut ctx = GraphRenderContext::new(Box::new(paint), Palette::default());
        component.render(&mut ctx);

        assert_eq!(*circles.borrow(), vec![Point::new(110.0, 200.0)]);
        assert_eq!(hit_index.len(), 1);
    }

    #[test]
    fn does_not_contribute_to_the_usable_rect() {
        let block = Block {
            id: EntityId::from_str("b1"),
            kind_tag: "default".into(),
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
            name: "b".into(),
            group: None,
            selected: false,
            anchors: Vec::new(),
            user_meta: serde_json::Value::Null,
        };
        let anchor = Anchor {
            id: EntityId::from_str("a1"),
            owner_block: EntityId::from_str("b1"),
            direction: AnchorDirection::In,
            position_hint: Point::new(0.0, 0.0),
            user_meta: serde_json::Value::Null,
        };
        let hit_index = Rc::new(HitTestIndex::new());
        let props = AnchorProps {
            id: EntityId::from_str("a1"),
            anchor: Signal::new(anchor),
            owner_block: Signal::new(block),
            camera: Rc::new(Camera::new(400.0, 400.0)),
            palette: Palette::default(),
            hit_index: hit_index.clone(),
        };
        let mut component = AnchorComponent::new(props);
        let mut ctx = GraphRenderContext::new(Box::new(RecordingPaint::default()), Palette::default());
        component.render(&mut ctx);

        assert_eq!(hit_index.usable_rect(), None);
    }
}
