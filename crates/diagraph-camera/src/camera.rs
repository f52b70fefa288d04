//! World/screen affine camera.
//!
//! The transform is kept in a [`diagraph_reactive::Signal`] so every
//! mutation notifies through the same equality-gated, batched path as the
//! rest of the reactive graph — `camera-change` listeners are just signal
//! subscribers, and "emits `camera-change` ... after batching" falls out
//! of `Signal`'s own semantics for free rather than needing a bespoke
//! notifier riding a hand-rolled `add_listener`.

use crate::scale_level::{ScaleLevel, ScaleThresholds};
use diagraph_foundation::ListenerId;
use diagraph_reactive::Signal;
use diagraph_types::{Point, Rect, Transform2D};

/// World <-> screen camera. All public geometry in/out is world space
/// except where a method name says otherwise (`apply_to_point`,
/// `inverse`, `pan`, `zoom`'s anchor — all screen space).
pub struct Camera {
    /// World -> screen.
    transform: Signal<Transform2D>,
    viewport_w: f64,
    viewport_h: f64,
    scale_min: f64,
    scale_max: f64,
    thresholds: ScaleThresholds,
}

impl Camera {
    pub fn new(viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            transform: Signal::new(Transform2D::identity()),
            viewport_w,
            viewport_h,
            scale_min: 0.05,
            scale_max: 16.0,
            thresholds: ScaleThresholds::default(),
        }
    }

    pub fn with_scale_limits(mut self, scale_min: f64, scale_max: f64) -> Self {
        assert!(scale_min > 0.0 && scale_max >= scale_min);
        self.scale_min = scale_min;
        self.scale_max = scale_max;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ScaleThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn update_size(&mut self, w: f64, h: f64) {
        self.viewport_w = w;
        self.viewport_h = h;
    }

    pub fn viewport_size(&self) -> (f64, f64) {
        (self.viewport_w, self.viewport_h)
    }

    pub fn scale(&self) -> f64 {
        self.transform.peek().m11
    }

    /// The current world->screen affine transform, for consumers (scene
    /// layers syncing an HTML overlay) that need the full matrix rather
    /// than a single point mapping.
    pub fn transform(&self) -> Transform2D {
        self.transform.peek()
    }

    pub fn scale_level(&self) -> ScaleLevel {
        self.thresholds.classify(self.scale())
    }

    /// Subscribe to `camera-change`. Fires once per batch in which the
    /// transform actually changed.
    #[must_use = "store the ListenerId and unsubscribe, or the subscription leaks"]
    pub fn on_camera_change(&self, listener: impl Fn() + 'static) -> ListenerId {
        self.transform.subscribe(listener)
    }

    pub fn remove_camera_change_listener(&self, id: ListenerId) {
        self.transform.unsubscribe(id);
    }

    /// Screen point -> world point.
    pub fn apply_to_point(&self, sx: f64, sy: f64) -> Point {
        self.transform.peek().inverse().transform_point(Point::new(sx, sy))
    }

    /// World point -> screen point. Named `inverse` for the
    /// operation it performs relative to `apply_to_point` rather than for
    /// what it computes internally.
    pub fn inverse(&self, wx: f64, wy: f64) -> Point {
        self.transform.peek().transform_point(Point::new(wx, wy))
    }

    /// Pan by a screen-space delta.
    pub fn pan(&self, dx: f64, dy: f64) {
        let mut t = self.transform.peek();
        t.m31 += dx;
        t.m32 += dy;
        self.transform.set(t);
    }

    /// Zoom to `to_scale`, keeping the world point under `anchor` (screen
    /// space, defaulting to the viewport center) fixed on screen.
    pub fn zoom(&self, to_scale: f64, anchor: Option<Point>) {
        let anchor = anchor.unwrap_or_else(|| {
            Point::new(self.viewport_w / 2.0, self.viewport_h / 2.0)
        });
        let world_anchor = self.apply_to_point(anchor.x, anchor.y);
        let new_scale = to_scale.clamp(self.scale_min, self.scale_max);
        let tx = anchor.x - world_anchor.x * new_scale;
        let ty = anchor.y - world_anchor.y * new_scale;
        self.transform.set(Transform2D::scale_translate(new_scale, tx, ty));
    }

    /// Fit `rect` (world space) into the viewport with `padding` screen
    /// pixels of margin on every side, centering it.
    pub fn zoom_to_rect(&self, rect: Rect, padding: f64) {
        let avail_w = (self.viewport_w - 2.0 * padding).max(1e-6);
        let avail_h = (self.viewport_h - 2.0 * padding).max(1e-6);
        let raw_scale = if rect.w <= 0.0 || rect.h <= 0.0 {
            self.scale()
        } else {
            (avail_w / rect.w).min(avail_h / rect.h)
        };
        let scale = raw_scale.clamp(self.scale_min, self.scale_max);

        let world_center = rect.center();
        let screen_center = Point::new(self.viewport_w / 2.0, self.viewport_h / 2.0);
        let tx = screen_center.x - world_center.x * scale;
        let ty = screen_center.y - world_center.y * scale;
        self.transform.set(Transform2D::scale_translate(scale, tx, ty));
    }

    /// Whether any part of `rect` (world space) is visible in the current
    /// viewport.
    pub fn is_rect_visible(&self, rect: Rect) -> bool {
        let top_left = self.apply_to_point(0.0, 0.0);
        let bottom_right = self.apply_to_point(self.viewport_w, self.viewport_h);
        let visible = Rect::from_corners(top_left, bottom_right);
        visible.intersects(&rect)
    }
}
