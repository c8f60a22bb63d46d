//! 3D transformation matrices and rotation state
use crate::error::CoreResult;
use crate::mat::{Mat33f, Mat44f};
use crate::vec::Vec3f;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Right-handed rotation about +X.
    pub fn rotation_x(angle: f32) -> Mat44f {
        let (sin, cos) = angle.sin_cos();
        #[rustfmt::skip]
        let m = Mat44f::from_rows([
            1.0, 0.0, 0.0, 0.0,
            0.0, cos, -sin, 0.0,
            0.0, sin, cos, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]);
        m
    }

    /// Right-handed rotation about +Y.
    pub fn rotation_y(angle: f32) -> Mat44f {
        let (sin, cos) = angle.sin_cos();
        #[rustfmt::skip]
        let m = Mat44f::from_rows([
            cos, 0.0, sin, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -sin, 0.0, cos, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]);
        m
    }

    /// Right-handed rotation about +Z.
    pub fn rotation_z(angle: f32) -> Mat44f {
        let (sin, cos) = angle.sin_cos();
        #[rustfmt::skip]
        let m = Mat44f::from_rows([
            cos, -sin, 0.0, 0.0,
            sin, cos, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]);
        m
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Mat44f {
        // Apply rotations in order: X, then Y, then Z
        Self::rotation_z(rotation.z) * Self::rotation_y(rotation.y) * Self::rotation_x(rotation.x)
    }

    /// Create a translation matrix
    pub fn translation(offset: Vec3f) -> Mat44f {
        let mut m = Mat44f::IDENTITY;
        m[(0, 3)] = offset.x;
        m[(1, 3)] = offset.y;
        m[(2, 3)] = offset.z;
        m
    }

    /// Create a scale matrix
    pub fn scaling(sx: f32, sy: f32, sz: f32) -> Mat44f {
        let mut m = Mat44f::IDENTITY;
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        m
    }

    /// Create a model-view-projection matrix
    pub fn mvp(model: &Mat44f, view: &Mat44f, projection: &Mat44f) -> Mat44f {
        *projection * *view * *model
    }

    /// Matrix that carries object-space normals into world space: the
    /// inverse-transpose of the model's linear part.
    pub fn normal_matrix(model: &Mat44f) -> CoreResult<Mat33f> {
        Ok(Mat33f::from(model.invert()?.transpose()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::Vec4f;
    use std::f32::consts::FRAC_PI_2;

    fn assert_identity(m: &Mat44f) {
        for (a, b) in m.v.iter().zip(Mat44f::IDENTITY.v.iter()) {
            assert!((a - b).abs() < 1e-6, "{m:?} is not the identity");
        }
    }

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        assert_identity(&Transform::rotation_matrix(&rotation));
    }

    #[test]
    fn test_rotation_x_quarter_turn() {
        let v = Transform::rotation_x(FRAC_PI_2) * Vec4f::new(0.0, 1.0, 0.0, 1.0);
        assert!(v.x.abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);
        assert!((v.z - 1.0).abs() < 1e-6);
        assert!((v.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_state_order() {
        // X first, then Y: +Y -> +Z -> +X
        let state = RotationState::new(FRAC_PI_2, FRAC_PI_2, 0.0);
        let p = Transform::rotation_matrix(&state).transform_point(Vec3f::new(0.0, 1.0, 0.0));
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!(p.z.abs() < 1e-6);
    }

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let t = Transform::translation(Vec3f::new(5.0, 0.0, 0.0));
        assert_eq!(t.transform_point(Vec3f::ZERO), Vec3f::new(5.0, 0.0, 0.0));
        assert_eq!(t.transform_vector(Vec3f::new(0.0, 1.0, 0.0)), Vec3f::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_scaling_diagonal() {
        let s = Transform::scaling(2.0, 3.0, 4.0);
        assert_eq!(s.transform_point(Vec3f::new(1.0, 1.0, 1.0)), Vec3f::new(2.0, 3.0, 4.0));
        assert_eq!(s[(3, 3)], 1.0);
    }

    #[test]
    fn test_normal_matrix_of_non_uniform_scale() {
        let n = Transform::normal_matrix(&Transform::scaling(2.0, 1.0, 1.0)).unwrap();
        assert!((n[(0, 0)] - 0.5).abs() < 1e-6);
        assert!((n[(1, 1)] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normal_matrix_rejects_flattening() {
        assert!(Transform::normal_matrix(&Transform::scaling(1.0, 0.0, 1.0)).is_err());
    }
}
