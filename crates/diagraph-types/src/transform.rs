use crate::Point;

/// A 2D affine transform, used by the camera to map world ↔ screen space.
///
/// Stored as a plain 2x3 matrix — diagraph has exactly two coordinate
/// spaces related by a uniform scale plus translation (see
/// `diagraph-camera`), so no type-level unit-flavor bookkeeping is
/// warranted here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub m31: f64,
    pub m32: f64,
}

impl Transform2D {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            m31: 0.0,
            m32: 0.0,
        }
    }

    #[inline]
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            m31: tx,
            m32: ty,
        }
    }

    /// A uniform scale about the origin, followed by a translation — the
    /// shape every camera transform in this workspace takes.
    #[inline]
    pub const fn scale_translate(scale: f64, tx: f64, ty: f64) -> Self {
        Self {
            m11: scale,
            m12: 0.0,
            m21: 0.0,
            m22: scale,
            m31: tx,
            m32: ty,
        }
    }

    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            p.x * self.m11 + p.y * self.m21 + self.m31,
            p.x * self.m12 + p.y * self.m22 + self.m32,
        )
    }

    /// Invert the transform. Panics if the matrix is singular (determinant
    /// zero) — a degenerate camera scale is a programming error, not a
    /// recoverable runtime condition.
    pub fn inverse(&self) -> Self {
        let det = self.m11 * self.m22 - self.m12 * self.m21;
        assert!(det.abs() > f64::EPSILON, "Transform2D::inverse: singular matrix");
        let inv_det = 1.0 / det;
        let m11 = self.m22 * inv_det;
        let m12 = -self.m12 * inv_det;
        let m21 = -self.m21 * inv_det;
        let m22 = self.m11 * inv_det;
        let m31 = -(self.m31 * m11 + self.m32 * m21);
        let m32 = -(self.m31 * m12 + self.m32 * m22);
        Self {
            m11,
            m12,
            m21,
            m22,
            m31,
            m32,
        }
    }

    /// Compose `self` followed by `other` (`other(self(p))`).
    pub fn then(&self, other: &Transform2D) -> Self {
        Self {
            m11: self.m11 * other.m11 + self.m12 * other.m21,
            m12: self.m11 * other.m12 + self.m12 * other.m22,
            m21: self.m21 * other.m11 + self.m22 * other.m21,
            m22: self.m21 * other.m12 + self.m22 * other.m22,
            m31: self.m31 * other.m11 + self.m32 * other.m21 + other.m31,
            m32: self.m31 * other.m12 + self.m32 * other.m22 + other.m32,
        }
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}
