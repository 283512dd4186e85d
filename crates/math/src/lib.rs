#![warn(missing_docs)]
//! Rigid-body transform math for tracked-device and overlay placement.
//!
//! A [`RigidTransform`] is a 4×4 matrix whose upper-left 3×3 block is a pure
//! rotation and whose bottom row is `[0, 0, 0, 1]`. Every transform in the
//! engine either comes from tracking hardware or is a composition of such
//! transforms, so inversion can use the transpose of the rotation block
//! instead of a general matrix inverse.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Row-major 4×4 layout used for persistence.
pub type RowMajor4 = [[f32; 4]; 4];

/// Row-major 3×4 layout expected by compositor transform submission.
pub type RowMajor3x4 = [[f32; 4]; 3];

/// Rotation + translation, stored as a column-major [`Mat4`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RowMajor4", into = "RowMajor4")]
pub struct RigidTransform {
    matrix: Mat4,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        matrix: Mat4::IDENTITY,
    };

    /// The identity transform.
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Pure translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            matrix: Mat4::from_translation(translation),
        }
    }

    /// Rotation followed by translation.
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            matrix: Mat4::from_rotation_translation(rotation.normalize(), translation),
        }
    }

    /// Wrap a matrix the caller guarantees is rigid.
    pub fn from_mat4_unchecked(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// Build from row-major rows. The bottom row is forced to `[0, 0, 0, 1]`.
    pub fn from_rows(rows: RowMajor4) -> Self {
        let mut matrix = Mat4::from_cols_array_2d(&rows).transpose();
        matrix.x_axis.w = 0.0;
        matrix.y_axis.w = 0.0;
        matrix.z_axis.w = 0.0;
        matrix.w_axis.w = 1.0;
        Self { matrix }
    }

    /// Row-major rows, bottom row included.
    pub fn to_rows(&self) -> RowMajor4 {
        self.matrix.transpose().to_cols_array_2d()
    }

    /// Row-major 3×4 block (bottom row dropped).
    pub fn to_rows_3x4(&self) -> RowMajor3x4 {
        let rows = self.to_rows();
        [rows[0], rows[1], rows[2]]
    }

    /// Underlying column-major matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Translation column.
    pub fn translation(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Rotation block.
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_mat4(self.matrix)
    }

    /// Same rotation, different translation.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.matrix.w_axis = translation.extend(1.0);
        self
    }

    /// Composition `self · rhs` (apply `rhs` first).
    pub fn multiply(&self, rhs: &RigidTransform) -> Self {
        Self {
            matrix: self.matrix * rhs.matrix,
        }
    }

    /// Rigid inverse: rotation `Rᵗ`, translation `-Rᵗ·t`.
    pub fn inverse(&self) -> Self {
        let rt = self.rotation().transpose();
        let t = -(rt * self.translation());
        Self {
            matrix: Mat4::from_cols(
                rt.x_axis.extend(0.0),
                rt.y_axis.extend(0.0),
                rt.z_axis.extend(0.0),
                t.extend(1.0),
            ),
        }
    }

    /// Apply the transform to a point.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        let p = self.matrix * Vec4::new(point.x, point.y, point.z, 1.0);
        p.truncate()
    }

    /// Apply only the rotation to a direction.
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation() * vector
    }

    /// Element-wise comparison with tolerance.
    pub fn approx_eq(&self, other: &RigidTransform, epsilon: f32) -> bool {
        self.matrix.abs_diff_eq(other.matrix, epsilon)
    }

    /// Whether the matrix is finite, has an orthonormal rotation block and a
    /// `[0, 0, 0, 1]` bottom row (all within `epsilon`).
    pub fn is_rigid(&self, epsilon: f32) -> bool {
        if !self.matrix.is_finite() {
            return false;
        }
        let bottom = self.matrix.row(3);
        if !bottom.abs_diff_eq(Vec4::W, epsilon) {
            return false;
        }
        let r = self.rotation();
        (r * r.transpose()).abs_diff_eq(Mat3::IDENTITY, epsilon) && r.determinant() > 0.0
    }
}

impl std::ops::Mul for RigidTransform {
    type Output = RigidTransform;

    fn mul(self, rhs: RigidTransform) -> RigidTransform {
        self.multiply(&rhs)
    }
}

impl From<RowMajor4> for RigidTransform {
    fn from(rows: RowMajor4) -> Self {
        Self::from_rows(rows)
    }
}

impl From<RigidTransform> for RowMajor4 {
    fn from(transform: RigidTransform) -> Self {
        transform.to_rows()
    }
}
