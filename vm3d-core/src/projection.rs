//! Camera and projection utilities
use crate::mat::Mat44f;
use crate::transform::Transform;
use crate::vec::Vec3f;

/// Symmetric-frustum perspective projection mapping the right-handed view
/// space (camera looking down -Z) to clip space, with `w = -z`.
pub fn perspective_projection(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat44f {
    let s = 1.0 / (fov_y / 2.0).tan();
    let sx = s / aspect;
    let sy = s;
    let a = -(far + near) / (far - near);
    let b = -2.0 * far * near / (far - near);

    #[rustfmt::skip]
    let m = Mat44f::from_rows([
        sx, 0.0, 0.0, 0.0,
        0.0, sy, 0.0, 0.0,
        0.0, 0.0, a, b,
        0.0, 0.0, -1.0, 0.0,
    ]);
    m
}

/// View matrix for a camera at `eye` looking at `target`.
///
/// Rows hold the camera's right, up and backward axes; the last column holds
/// each axis dotted with `-eye`. `up` must not be parallel to the view
/// direction.
pub fn look_at(eye: Vec3f, target: Vec3f, up: Vec3f) -> Mat44f {
    let backward = (eye - target).normalize();
    let side = up.cross(backward);
    debug_assert!(side.length() > 1e-6, "look_at: up is parallel to the view direction");
    let right = side.normalize();
    let up = backward.cross(right);

    #[rustfmt::skip]
    let m = Mat44f::from_rows([
        right.x, right.y, right.z, -right.dot(eye),
        up.x, up.y, up.z, -up.dot(eye),
        backward.x, backward.y, backward.z, -backward.dot(eye),
        0.0, 0.0, 0.0, 1.0,
    ]);
    m
}

/// Free-flying camera view: translate the world by `-position`, yaw by `phi`
/// about Y, then pitch by `theta` about X.
pub fn fly_view(position: Vec3f, phi: f32, theta: f32) -> Mat44f {
    Transform::rotation_x(theta) * Transform::rotation_y(phi) * Transform::translation(-position)
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3f,
    pub target: Vec3f,
    pub up: Vec3f,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec3f::new(0.0, 0.0, 5.0),
            target: Vec3f::ZERO,
            up: Vec3f::new(0.0, 1.0, 0.0),
            fov: 60f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Mat44f {
        look_at(self.position, self.target, self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Mat44f {
        perspective_projection(self.fov, self.aspect, self.near, self.far)
    }

    /// Project a 3D point to 2D screen space, returning the NDC depth
    /// alongside the pixel position.
    pub fn project_to_screen(
        &self,
        point: Vec3f,
        model_matrix: &Mat44f,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = Transform::mvp(model_matrix, &self.view_matrix(), &self.projection_matrix());
        project_clip(&mvp, point, width, height)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Carry `point` through a combined clip transform to screen space.
///
/// Points behind the camera (`w` at or below zero) and points outside the
/// NDC square are rejected.
pub fn project_clip(mvp: &Mat44f, point: Vec3f, width: u32, height: u32) -> Option<(f32, f32, f32)> {
    let clip = *mvp * point.extend(1.0);

    // Prevent division by near-zero w
    if clip.w < 1e-6 {
        return None;
    }

    let ndc = clip.perspective_divide();

    // Clip test
    if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 {
        return None;
    }

    // Convert to screen space
    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

    Some((screen_x, screen_y, ndc.z))
}
