//! # Transforms and Coordinate Spaces
//!
//! Objects store a local [`Transform`] relative to whichever space they are
//! attached to (the world root or the viewpoint). Moving an object between
//! spaces without it visibly jumping is [`change_coordinate_space`].

use cgmath::{InnerSpace, Matrix3, Matrix4, One, Quaternion, SquareMatrix, Vector3};

/// Translation, rotation and scale, composed as `T * R * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from(self.rotation);
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s // Order matters: T * R * S
    }

    /// Decomposes an affine matrix into translation, rotation and scale.
    ///
    /// A negative determinant is folded into the X scale. Shear is not
    /// representable and is lost.
    pub fn from_matrix(matrix: &Matrix4<f32>) -> Self {
        let position = matrix.w.truncate();

        let mut sx = matrix.x.truncate().magnitude();
        let sy = matrix.y.truncate().magnitude();
        let sz = matrix.z.truncate().magnitude();
        if matrix.determinant() < 0.0 {
            sx = -sx;
        }

        let safe = |s: f32| if s.abs() > f32::EPSILON { s } else { 1.0 };
        let basis = Matrix3::from_cols(
            matrix.x.truncate() / safe(sx),
            matrix.y.truncate() / safe(sy),
            matrix.z.truncate() / safe(sz),
        );

        Self {
            position,
            rotation: Quaternion::from(basis).normalize(),
            scale: Vector3::new(sx, sy, sz),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Re-expresses `local` (relative to `from_space`) relative to `to_space`,
/// keeping the resulting world transform unchanged.
///
/// Both spaces are given as world matrices. Returns `None` when `to_space`
/// is singular.
pub fn change_coordinate_space(
    local: &Transform,
    from_space: &Matrix4<f32>,
    to_space: &Matrix4<f32>,
) -> Option<Transform> {
    let to_inverse = to_space.invert()?;
    Some(Transform::from_matrix(
        &(to_inverse * *from_space * local.to_matrix()),
    ))
}

/// Maps a point by an affine matrix.
pub fn transform_point(matrix: &Matrix4<f32>, point: Vector3<f32>) -> Vector3<f32> {
    (matrix * point.extend(1.0)).truncate()
}
