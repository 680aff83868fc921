//! 3D transformation utilities

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D transformation that can be applied to points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Compose this transformation with another
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Get the inverse transformation
    pub fn inverse(self) -> Option<Self> {
        self.matrix.try_inverse().map(|inv_matrix| Self {
            matrix: inv_matrix,
        })
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Matrix4<f32>> for Transform3D {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}
