//! Per-frame connection geometry derivation.
//!
//! "Connections compute a geometry that includes endpoints and an
//! optional interior polyline. Straight and curved (bezier) variants must
//! both be representable... `get_bbox()`... `on_hit_box(point)` uses a
//! stroke-distance test with a threshold scaled inversely by camera
//! zoom."

use diagraph_types::{Point, Rect};

/// Which shape a connection's segment takes between consecutive
/// geometry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Straight,
    Bezier,
}

/// The resolved, per-frame shape of one connection: endpoints, an
/// optional interior polyline (from `Connection::points`), and whether an
/// arrow-head segment is drawn at the target end.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionGeometry {
    pub source: Point,
    pub target: Point,
    pub interior: Vec<Point>,
    pub curve: Curve,
    pub arrow_head: bool,
}

impl ConnectionGeometry {
    pub fn new(source: Point, target: Point, interior: Vec<Point>, curve: Curve, arrow_head: bool) -> Self {
        Self { source, target, interior, curve, arrow_head }
    }

    /// The full vertex chain a renderer walks: `source`, then `interior`
    /// in order, then `target`.
    pub fn vertices(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.interior.len() + 2);
        points.push(self.source);
        points.extend(self.interior.iter().copied());
        points.push(self.target);
        points
    }

    /// For a [`Curve::Bezier`] connection, sample the cubic curve built
    /// from `source`/`target` with the first and last interior points (if
    /// any) as control points, falling back to the straight chord when
    /// there aren't at least two interior points to use as controls.
    pub fn sample_bezier(&self, steps: usize) -> Vec<Point> {
        let (c0, c1) = match (self.interior.first(), self.interior.last()) {
            (Some(&a), Some(&b)) if self.interior.len() >= 2 => (a, b),
            _ => (self.source, self.target),
        };
        (0..=steps)
            .map(|i| {
                let t = i as f64 / steps.max(1) as f64;
                cubic_bezier(self.source, c0, c1, self.target, t)
            })
            .collect()
    }

    /// The visible-extent bounding box, covering every vertex (straight)
    /// or every sampled point (bezier) — "each connection must offer
    /// `get_bbox()` covering its visible extent so the hit index can size
    /// it correctly".
    pub fn bbox(&self) -> Rect {
        let points = match self.curve {
            Curve::Straight => self.vertices(),
            Curve::Bezier => self.sample_bezier(16),
        };
        let mut iter = points.into_iter();
        let first = iter.next().unwrap_or(Point::ZERO);
        let mut rect = Rect::new(first.x, first.y, 0.0, 0.0);
        for p in iter {
            rect = rect.union(&Rect::new(p.x, p.y, 0.0, 0.0));
        }
        rect
    }

    /// Stroke-distance hit test: true if `point` lies within `threshold`
    /// of any segment along the connection's path.
    pub fn hit_test(&self, point: Point, threshold: f64) -> bool {
        let points = match self.curve {
            Curve::Straight => self.vertices(),
            Curve::Bezier => self.sample_bezier(16),
        };
        points
            .windows(2)
            .any(|pair| distance_to_segment(point, pair[0], pair[1]) <= threshold)
    }
}

fn cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= 1e-12 {
        return point.distance_to(a);
    }
    let ap = point - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    point.distance_to(projection)
}

/// Hit-test threshold in world units for a given stroke width on screen,
/// "scaled inversely by camera zoom" () so the hittable
/// margin stays a constant number of screen pixels regardless of zoom.
pub fn zoom_scaled_threshold(base_screen_threshold: f64, camera_scale: f64) -> f64 {
    if camera_scale <= 0.0 {
        base_screen_threshold
    } else {
        base_screen_threshold / camera_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_bbox_covers_both_endpoints() {
        let geom = ConnectionGeometry::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 20.0),
            Vec::new(),
            Curve::Straight,
            false,
        );
        assert_eq!(geom.bbox(), Rect::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn hit_test_accepts_points_near_the_straight_path() {
        let geom = ConnectionGeometry::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Vec::new(),
            Curve::Straight,
            false,
        );
        assert!(geom.hit_test(Point::new(50.0, 1.0), 2.0));
        assert!(!geom.hit_test(Point::new(50.0, 10.0), 2.0));
    }

    #[test]
    fn hit_test_follows_an_interior_polyline_not_the_direct_chord() {
        let geom = ConnectionGeometry::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            vec![Point::new(50.0, 50.0)],
            Curve::Straight,
            false,
        );
        // Near the direct chord but far from the actual bent path.
        assert!(!geom.hit_test(Point::new(50.0, 1.0), 2.0));
        assert!(geom.hit_test(Point::new(50.0, 50.0), 2.0));
    }

    #[test]
    fn bezier_sample_passes_through_both_endpoints() {
        let geom = ConnectionGeometry::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            vec![Point::new(20.0, 50.0), Point::new(80.0, -50.0)],
            Curve::Bezier,
            false,
        );
        let sampled = geom.sample_bezier(10);
        assert_eq!(sampled.first(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(sampled.last(), Some(&Point::new(100.0, 0.0)));
    }

    #[test]
    fn zoom_scaled_threshold_shrinks_as_scale_grows() {
        let at_1x = zoom_scaled_threshold(6.0, 1.0);
        let at_3x = zoom_scaled_threshold(6.0, 3.0);
        assert_eq!(at_1x, 6.0);
        assert_eq!(at_3x, 2.0);
    }
}
