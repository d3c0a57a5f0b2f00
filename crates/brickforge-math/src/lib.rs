#![warn(missing_docs)]

//! Math types for the brickforge scene compiler.
//!
//! Thin wrappers around nalgebra providing the types the document tree and
//! scene graph share: points, vectors, 4x4 reference transforms, and
//! tolerance constants. Scalars are `f32` throughout because the output
//! feeds a renderer, not an exact kernel.

use nalgebra::{Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// A point in 3D model space.
pub type Point3 = nalgebra::Point3<f32>;

/// A vector in 3D model space.
pub type Vec3 = Vector3<f32>;

/// A 4x4 affine transformation, as carried by a sub-model reference line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f32>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f32, dy: f32, dz: f32) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    ///
    /// Negative factors mirror; an odd number of negative factors flips the
    /// matrix determinant, which is how mirrored references are detected.
    pub fn scale(sx: f32, sy: f32, sz: f32) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Compose: `self` then applied to `other`'s output (`self * other`).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Determinant of the matrix. Negative means the transform mirrors.
    pub fn determinant(&self) -> f32 {
        self.matrix.determinant()
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f32,
}

impl Tolerance {
    /// Default tolerances for brick-scale geometry.
    pub const DEFAULT: Self = Self { linear: 1e-5 };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar is effectively zero.
    pub fn is_zero(&self, d: f32) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!((t.apply_point(&p) - p).norm() < 1e-6);
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let r = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert!((r.x - 11.0).abs() < 1e-6);
        assert!((r.y - 22.0).abs() < 1e-6);
        assert!((r.z - 33.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_y_90() {
        let t = Transform::rotation_y(PI / 2.0);
        let r = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(r.x.abs() < 1e-6);
        assert!((r.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_compose_applies_right_first() {
        let translate = Transform::translation(1.0, 0.0, 0.0);
        let scale = Transform::scale(2.0, 2.0, 2.0);
        // (scale * translate) p = scale(translate(p))
        let composed = scale.then(&translate);
        let r = composed.apply_point(&Point3::origin());
        assert!((r.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_mirror_determinant() {
        assert!(Transform::scale(-1.0, 1.0, 1.0).determinant() < 0.0);
        assert!(Transform::scale(-1.0, -1.0, 1.0).determinant() > 0.0);
        assert!(Transform::rotation_y(1.0).determinant() > 0.0);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let t = Transform::translation(1.0, 2.0, 3.0).then(&Transform::scale(2.0, 1.0, 1.0));
        let inv = t.inverse().unwrap();
        let p = Point3::new(5.0, 6.0, 7.0);
        let r = inv.apply_point(&t.apply_point(&p));
        assert!((r - p).norm() < 1e-4);
    }

    #[test]
    fn test_tolerance() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.points_equal(
            &Point3::new(1.0, 2.0, 3.0),
            &Point3::new(1.0 + 1e-6, 2.0, 3.0)
        ));
        assert!(!tol.is_zero(0.01));
    }
}
