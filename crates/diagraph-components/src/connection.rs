//! The connection component.
//!
//! Only ever instantiated for ids in `GraphStore::live_connection_ids` —
//! "both endpoints resolve to live blocks or the connection is considered
//! broken and is not rendered" () is enforced by whoever owns
//! the component tree (`diagraph-engine`) deciding which connections get
//! a `ChildSpec` at all, not by this component re-checking liveness.

use crate::geometry::{ConnectionGeometry, Curve};
use crate::paint::{GraphRenderContext, Palette};
use diagraph_camera::Camera;
use diagraph_hittest::{HitTarget, HitTestIndex};
use diagraph_reactive::Signal;
use diagraph_store::{Block, Connection};
use diagraph_tree::{ChildSpec, Component, RenderContext};
use diagraph_types::{EntityId, Point};
use std::any::Any;
use std::rc::Rc;

pub const CONNECTION_TYPE_TAG: &str = "connection";

/// Fine-grained hit predicate for one connection's current geometry:
/// a stroke-distance test with a threshold scaled inversely by camera
/// zoom. Rebuilt every render — cheap, since it only clones a handful of
/// points.
struct ConnectionHitTarget {
    geometry: ConnectionGeometry,
    threshold: f64,
}

impl HitTarget for ConnectionHitTarget {
    fn on_hit_box(&self, point: Point) -> bool {
        self.geometry.hit_test(point, self.threshold)
    }
}

#[derive(Clone)]
pub struct ConnectionProps {
    pub id: EntityId,
    pub connection: Signal<Connection>,
    pub source_block: Signal<Block>,
    pub target_block: Signal<Block>,
    /// Absolute world point to start/end from, normally an anchor's
    /// resolved position; falls back to the owning block's center when
    /// the connection (or its anchor) doesn't pin one down.
    pub source_anchor_point: Option<Point>,
    pub target_anchor_point: Option<Point>,
    pub curve: Curve,
    pub camera: Rc<Camera>,
    pub palette: Palette,
    pub hit_index: Rc<HitTestIndex>,
    pub z_index: i32,
    /// Screen-pixel stroke-test margin at scale 1.0, before the inverse
    /// zoom scaling calls for.
    pub stroke_threshold_px: f64,
    /// Whether to draw an arrow head at the target end.
    pub show_arrows: bool,
    /// Whether to draw `connection.label` near the stroke's midpoint.
    pub show_labels: bool,
}

pub struct ConnectionComponent {
    props: Option<ConnectionProps>,
}

impl ConnectionComponent {
    pub fn new(props: ConnectionProps) -> Self {
        Self { props: Some(props) }
    }

    fn props(&self) -> &ConnectionProps {
        self.props.as_ref().expect("ConnectionComponent rendered before set_props")
    }

    fn geometry(&self) -> ConnectionGeometry {
        let props = self.props();
        let connection = props.connection.get();
        let source = props
            .source_anchor_point
            .unwrap_or_else(|| props.source_block.get().rect().center());
        let target = props
            .target_anchor_point
            .unwrap_or_else(|| props.target_block.get().rect().center());
        let interior = connection.points.clone().unwrap_or_default();
        ConnectionGeometry::new(source, target, interior, props.curve, props.show_arrows)
    }
}

impl Component for ConnectionComponent {
    fn set_props(&mut self, props: Box<dyn Any>) {
        if let Ok(props) = props.downcast::<ConnectionProps>() {
            self.props = Some(*props);
        }
    }

    fn update_children(&mut self) -> Vec<ChildSpec> {
        Vec::new()
    }

    fn render(&mut self, ctx: &mut dyn RenderContext) {
        let props = self.props();
        let connection = props.connection.get();
        let geometry = self.geometry();
        let vertices = match geometry.curve {
            Curve::Straight => geometry.vertices(),
            Curve::Bezier => geometry.sample_bezier(24),
        };

        if let Some(ctx) = ctx.as_any_mut().downcast_mut::<GraphRenderContext>() {
            let palette = ctx.palette();
            let color = if connection.selected { palette.stroke_selected } else { palette.stroke };
            let text_color = palette.text;
            let paint = ctx.paint_mut();
            paint.stroke_polyline(&vertices, color, 1.5);
            if geometry.arrow_head {
                draw_arrow_head(paint, &vertices, color);
            }
            if props.show_labels {
                if let Some(label) = connection.label.as_deref() {
                    paint.draw_text(midpoint(&vertices), label, text_color);
                }
            }
        }

        let threshold = crate::geometry::zoom_scaled_threshold(props.stroke_threshold_px, props.camera.scale());
        props.hit_index.insert_with_flags(
            props.id.clone(),
            geometry.bbox(),
            props.z_index,
            Rc::new(ConnectionHitTarget { geometry, threshold }),
            true,
            true,
        );
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

/// Point along the path to anchor a connection's label at: the middle
/// vertex for an odd-length polyline, or the midpoint of the two middle
/// vertices for an even-length one.
fn midpoint(vertices: &[Point]) -> Point {
    if vertices.is_empty() {
        return Point::ZERO;
    }
    let mid = vertices.len() / 2;
    if vertices.len() % 2 == 1 {
        vertices[mid]
    } else {
        let a = vertices[mid - 1];
        let b = vertices[mid];
        Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }
}

fn draw_arrow_head(paint: &mut dyn crate::paint::Paint, vertices: &[Point], color: crate::paint::Color) {
    let Some(&target) = vertices.last() else { return };
    let Some(&before) = vertices.get(vertices.len().saturating_sub(2)) else { return };
    let direction = target - before;
    let length = direction.length();
    if length <= 1e-9 {
        return;
    }
    let unit = direction * (1.0 / length);
    let back = Point::new(-unit.x, -unit.y) * 8.0;
    let normal = Point::new(-unit.y, unit.x) * 4.0;
    let left = target + back + normal;
    let right = target + back - normal;
    paint.stroke_polyline(&[left, target, right], color, 1.5);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{Color, Paint};
    use diagraph_types::Rect;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingPaint {
        polylines: Rc<RefCell<Vec<Vec<Point>>>>,
        texts: Rc<RefCell<Vec<String>>>,
    }

    impl Paint for RecordingPaint {
        fn fill_rect(&mut self, _rect: Rect, _color: Color) {}
        fn stroke_rect(&mut self, _rect: Rect, _color: Color, _width: f64) {}
        fn draw_text(&mut self, _at: Point, text: &str, _color: Color) {
            self.texts.borrow_mut().push(text.to_string());
        }
        fn stroke_polyline(&mut self, points: &[Point], _color: Color, _width: f64) {
            self.polylines.borrow_mut().push(points.to_vec());
        }
        fn fill_circle(&mut self, _center: Point, _radius: f64, _color: Color) {}
    }

    fn block(id: &str, x: f64, y: f64) -> Block {
        Block {
            id: EntityId::from_str(id),
            kind_tag: "default".into(),
            x,
            y,
            w: 10.0,
            h: 10.0,
            name: id.into(),
            group: None,
            selected: false,
            anchors: Vec::new(),
            user_meta: serde_json::Value::Null,
        }
    }

    fn connection(id: &str) -> Connection {
        Connection {
            id: EntityId::from_str(id),
            kind_tag: "default".into(),
            source_block: EntityId::from_str("a"),
            target_block: EntityId::from_str("b"),
            source_anchor: None,
            target_anchor: None,
            selected: false,
            label: None,
            dashed: None,
            styles: None,
            points: None,
            user_meta: serde_json::Value::Null,
        }
    }

    fn props(hit_index: Rc<HitTestIndex>) -> ConnectionProps {
        ConnectionProps {
            id: EntityId::from_str("c1"),
            connection: Signal::new(connection("c1")),
            source_block: Signal::new(block("a", 0.0, 0.0)),
            target_block: Signal::new(block("b", 100.0, 0.0)),
            source_anchor_point: None,
            target_anchor_point: None,
            curve: Curve::Straight,
            camera: Rc::new(Camera::new(400.0, 400.0)),
            palette: Palette::default(),
            hit_index,
            z_index: -1,
            stroke_threshold_px: 6.0,
            show_arrows: true,
            show_labels: true,
        }
    }

    #[test]
    fn renders_a_stroke_between_block_centers_when_no_anchor_is_pinned() {
        let hit_index = Rc::new(HitTestIndex::new());
        let mut component = ConnectionComponent::new(props(hit_index.clone()));

        let paint = RecordingPaint::default();
        let polylines = paint.polylines.clone();
        let mut ctx = GraphRenderContext::new(Box::new(paint), Palette::default());
        component.render(&mut ctx);

        let strokes = polylines.borrow();
        assert_eq!(strokes[0].first(), Some(&Point::new(5.0, 5.0)));
        assert_eq!(strokes[0].last(), Some(&Point::new(105.0, 5.0)));
        assert_eq!(hit_index.len(), 1);
    }

    #[test]
    fn arrow_head_adds_a_second_short_stroke_at_the_target() {
        let hit_index = Rc::new(HitTestIndex::new());
        let mut component = ConnectionComponent::new(props(hit_index));

        let paint = RecordingPaint::default();
        let polylines = paint.polylines.clone();
        let mut ctx = GraphRenderContext::new(Box::new(paint), Palette::default());
        component.render(&mut ctx);

        assert_eq!(polylines.borrow().len(), 2, "body stroke plus arrow head stroke");
    }

    #[test]
    fn show_arrows_false_omits_the_arrow_head_stroke() {
        let hit_index = Rc::new(HitTestIndex::new());
        let mut p = props(hit_index);
        p.show_arrows = false;
        let mut component = ConnectionComponent::new(p);

        let paint = RecordingPaint::default();
        let polylines = paint.polylines.clone();
        let mut ctx = GraphRenderContext::new(Box::new(paint), Palette::default());
        component.render(&mut ctx);

        assert_eq!(polylines.borrow().len(), 1, "body stroke only, no arrow head");
    }

    #[test]
    fn show_labels_true_draws_the_connection_label() {
        let hit_index = Rc::new(HitTestIndex::new());
        let mut p = props(hit_index);
        p.connection = Signal::new(Connection {
            label: Some("edge a->b".into()),
            ..connection("c1")
        });
        let mut component = ConnectionComponent::new(p);

        let paint = RecordingPaint::default();
        let texts = paint.texts.clone();
        let mut ctx = GraphRenderContext::new(Box::new(paint), Palette::default());
        component.render(&mut ctx);

        assert_eq!(texts.borrow().as_slice(), ["edge a->b"]);
    }

    #[test]
    fn show_labels_false_suppresses_the_connection_label() {
        let hit_index = Rc::new(HitTestIndex::new());
        let mut p = props(hit_index);
        p.show_labels = false;
        p.connection = Signal::new(Connection {
            label: Some("edge a->b".into()),
            ..connection("c1")
        });
        let mut component = ConnectionComponent::new(p);

        let paint = RecordingPaint::default();
        let texts = paint.texts.clone();
        let mut ctx = GraphRenderContext::new(Box::new(paint), Palette::default());
        component.render(&mut ctx);

        assert!(texts.borrow().is_empty());
    }

    #[test]
    fn stroke_distance_hit_test_shrinks_as_zoom_increases() {
        let hit_index = Rc::new(HitTestIndex::new());
        let mut p = props(hit_index.clone());
        p.camera.zoom(3.0, None);
        let mut component = ConnectionComponent::new(p);

        let mut ctx = GraphRenderContext::new(Box::new(RecordingPaint::default()), Palette::default());
        component.render(&mut ctx);

        // 3 world units off the straight path (y=5): hittable at scale 1
        // (threshold 6.0 world units) but not once zoomed to 3x (threshold 2.0).
        assert!(hit_index.test_point(50.0, 8.0).is_empty());
    }
}
