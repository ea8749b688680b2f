//! Basic 3x3 affine matrix implementation

use std::ops::Mul;

use crate::{
    rect::FloatRect,
    vector::{Vec2, EPSILON},
};

#[derive(Clone, Copy, Debug, PartialEq)]
/// 3x3 matrix, row-major, last row kept at `[0, 0, 1]` by every constructor.
pub struct Mat3 {
    /// Arrays storing the matrix data
    pub inner: [[f32; 3]; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul<Mat3> for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Self::Output {
        let mut res = Mat3 {
            inner: [[0.; 3]; 3],
        };

        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    res.inner[i][j] += self.inner[i][k] * rhs.inner[k][j];
                }
            }
        }

        res
    }
}

impl Mat3 {
    #[allow(missing_docs)]
    pub fn identity() -> Self {
        Self {
            inner: [[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]],
        }
    }

    fn new_translation(delta: Vec2) -> Mat3 {
        let mut res = Mat3::identity();

        res.inner[0][2] = delta.x();
        res.inner[1][2] = delta.y();

        res
    }

    fn new_scaling(factors: Vec2) -> Mat3 {
        let mut res = Mat3::identity();

        res.inner[0][0] = factors.x();
        res.inner[1][1] = factors.y();

        res
    }

    fn new_rotation(angle: f32) -> Mat3 {
        let mut res = Mat3::identity();
        let (asin, acos) = angle.sin_cos();

        res.inner[0][0] = acos;
        res.inner[0][1] = -asin;
        res.inner[1][0] = asin;
        res.inner[1][1] = acos;

        res
    }

    /// Apply to a point (translation included).
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        let m = &self.inner;
        Vec2::new(
            m[0][0] * point.x() + m[0][1] * point.y() + m[0][2],
            m[1][0] * point.x() + m[1][1] * point.y() + m[1][2],
        )
    }

    /// Inverse of the affine part, `None` if it collapses the plane.
    pub fn inverse(&self) -> Option<Mat3> {
        let m = &self.inner;
        let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1. / det;
        let a = m[1][1] * inv_det;
        let b = -m[0][1] * inv_det;
        let c = -m[1][0] * inv_det;
        let d = m[0][0] * inv_det;

        Some(Mat3 {
            inner: [
                [a, b, -(a * m[0][2] + b * m[1][2])],
                [c, d, -(c * m[0][2] + d * m[1][2])],
                [0., 0., 1.],
            ],
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// 2D transformation representation.
///
/// Builder calls compose on the right, so `translate(p).rotate(a)` rotates first and then
/// translates, like nesting scene nodes.
pub struct Transform {
    inner: Mat3,
}

impl From<Mat3> for Transform {
    fn from(inner: Mat3) -> Self {
        Self { inner }
    }
}

impl Transform {
    /// Add a translation of `delta` to the [Transform]
    pub fn translate(mut self, delta: Vec2) -> Self {
        self.inner = self.inner * Mat3::new_translation(delta);
        self
    }

    /// Scale by `factors`
    pub fn scale(mut self, factors: Vec2) -> Self {
        self.inner = self.inner * Mat3::new_scaling(factors);
        self
    }

    /// Rotate by `angle` radians
    pub fn rotate(mut self, angle: f32) -> Self {
        self.inner = self.inner * Mat3::new_rotation(angle);
        self
    }

    /// Shift the result of the transform by `delta` in the parent frame.
    pub fn move_by(&mut self, delta: Vec2) {
        self.inner = Mat3::new_translation(delta) * self.inner;
    }

    /// `self` applied after `child`.
    pub fn combine(&self, child: &Transform) -> Transform {
        Transform {
            inner: self.inner * child.inner,
        }
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn matrix(&self) -> &Mat3 {
        &self.inner
    }

    /// Where the local origin ends up.
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.inner.inner[0][2], self.inner.inner[1][2])
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        self.inner.transform_point(point)
    }

    /// Bounding rectangle of the transformed corners of `rect`.
    pub fn transform_rect(&self, rect: &FloatRect) -> FloatRect {
        FloatRect::from_points(rect.corners().map(|corner| self.transform_point(corner)))
    }

    #[allow(missing_docs)]
    pub fn inverse(&self) -> Option<Transform> {
        self.inner.inverse().map(Transform::from)
    }
}

#[cfg(test)]
mod test {
    use float_eq::assert_float_eq;

    use super::*;

    fn assert_vec_eq(expected: Vec2, got: Vec2) {
        assert_float_eq!(expected.x(), got.x(), abs <= 0.000_1, "{got:?} != {expected:?}");
        assert_float_eq!(expected.y(), got.y(), abs <= 0.000_1, "{got:?} != {expected:?}");
    }

    #[test]
    fn composition_order() {
        let transform = Transform::default()
            .translate(Vec2::new(10., 0.))
            .rotate(std::f32::consts::FRAC_PI_2)
            .scale(Vec2::new(2., 2.));

        assert_vec_eq(Vec2::new(10., 2.), transform.transform_point(Vec2::new(1., 0.)));
    }

    #[test]
    fn inverse_roundtrip() {
        let transform = Transform::default()
            .translate(Vec2::new(-3., 4.))
            .rotate(0.7)
            .scale(Vec2::new(1.5, 0.5));
        let inverse = transform.inverse().expect("transform is invertible");

        let point = Vec2::new(2.5, -1.);
        assert_vec_eq(point, inverse.transform_point(transform.transform_point(point)));

        assert_eq!(
            None,
            Transform::default().scale(Vec2::new(0., 1.)).inverse()
        );
    }

    #[test]
    fn move_by_applies_in_parent_frame() {
        let mut transform = Transform::default().scale(Vec2::new(3., 3.));
        transform.move_by(Vec2::new(1., 1.));

        assert_vec_eq(Vec2::new(4., 1.), transform.transform_point(Vec2::new(1., 0.)));
        assert_vec_eq(Vec2::new(1., 1.), transform.translation());
    }

    #[test]
    fn rect_bounds() {
        let rect = Transform::default()
            .rotate(std::f32::consts::FRAC_PI_2)
            .transform_rect(&FloatRect::new(0., 0., 2., 1.));

        assert_float_eq!(rect.left, -1., abs <= 0.000_1);
        assert_float_eq!(rect.top, 0., abs <= 0.000_1);
        assert_float_eq!(rect.width, 1., abs <= 0.000_1);
        assert_float_eq!(rect.height, 2., abs <= 0.000_1);
    }
}
