use nalgebra::{Matrix3, Vector3};
use std::ops::Mul;

/// A rigid transform as a rotation matrix and a translation vector.
///
/// Composition is associative: `a * b` applies `b` first, then `a`, the
/// same as multiplying the corresponding homogeneous matrices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl Transform {
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation,
        }
    }

    /// Rotates a vector without translating it.
    #[inline]
    pub fn rotate(&self, v: Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }

    /// Applies the full transform to a point.
    #[inline]
    pub fn transform_point(&self, p: Vector3<f64>) -> Vector3<f64> {
        self.rotation * p + self.translation
    }

    pub fn inv(&self) -> Self {
        let rotation = self.rotation.transpose();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    #[inline]
    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            rotation: self.rotation * rhs.rotation,
            translation: self.rotation * rhs.translation + self.translation,
        }
    }
}
