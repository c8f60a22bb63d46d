//! Procedural primitive meshes
//!
//! Every generator emits a flat-shaded triangle list in local space, runs the
//! positions through `pre_transform` and paints every vertex with `color`.
//! Cones and cylinders lie along +X between x = 0 and x = 1 with a unit
//! circle in the YZ plane; the cube spans [-0.5, 0.5] on each axis.

use std::f32::consts::TAU;

use tracing::debug;

use crate::mat::Mat44f;
use crate::mesh::{apply_pre_transform, flat_normal, MeshBuffer};
use crate::vec::Vec3f;

const NEG_X: Vec3f = Vec3f::new(-1.0, 0.0, 0.0);
const POS_X: Vec3f = Vec3f::new(1.0, 0.0, 0.0);

/// Points on the unit YZ circle, `(previous, current)` for each of
/// `subdivs` equal steps.
fn circle_steps(subdivs: usize) -> impl Iterator<Item = ((f32, f32), (f32, f32))> {
    let point = move |i: usize| {
        let angle = i as f32 / subdivs as f32 * TAU;
        (angle.cos(), angle.sin())
    };
    (0..subdivs).map(move |i| (point(i), point(i + 1)))
}

fn finish(mut mesh: MeshBuffer, pre_transform: &Mat44f, shape: &str) -> MeshBuffer {
    apply_pre_transform(&mut mesh.positions, pre_transform);
    debug!(shape, vertices = mesh.vertex_count(), "generated mesh");
    mesh
}

/// Cone with its base circle at x = 0 and apex at (1, 0, 0).
///
/// Emits `3 * subdivs` vertices, or `6 * subdivs` with the base capped.
pub fn make_cone(capped: bool, subdivs: usize, color: Vec3f, pre_transform: Mat44f) -> MeshBuffer {
    let per_step = if capped { 6 } else { 3 };
    let mut mesh = MeshBuffer::with_capacity(per_step * subdivs);
    let apex = POS_X;

    for ((prev_y, prev_z), (y, z)) in circle_steps(subdivs) {
        let prev = Vec3f::new(0.0, prev_y, prev_z);
        let cur = Vec3f::new(0.0, y, z);

        mesh.push_triangle([prev, cur, apex], flat_normal(prev, cur, apex), color);

        if capped {
            mesh.push_triangle([prev, Vec3f::ZERO, cur], NEG_X, color);
        }
    }

    finish(mesh, &pre_transform, "cone")
}

/// Cylinder from x = 0 to x = 1.
///
/// Emits `6 * subdivs` vertices, or `12 * subdivs` with both ends capped.
pub fn make_cylinder(capped: bool, subdivs: usize, color: Vec3f, pre_transform: Mat44f) -> MeshBuffer {
    let per_step = if capped { 12 } else { 6 };
    let mut mesh = MeshBuffer::with_capacity(per_step * subdivs);

    for ((prev_y, prev_z), (y, z)) in circle_steps(subdivs) {
        let prev0 = Vec3f::new(0.0, prev_y, prev_z);
        let cur0 = Vec3f::new(0.0, y, z);
        let prev1 = Vec3f::new(1.0, prev_y, prev_z);
        let cur1 = Vec3f::new(1.0, y, z);

        mesh.push_triangle([prev0, cur0, prev1], flat_normal(prev0, cur0, prev1), color);
        mesh.push_triangle([cur0, cur1, prev1], flat_normal(cur0, cur1, prev1), color);

        if capped {
            mesh.push_triangle([prev0, Vec3f::ZERO, cur0], NEG_X, color);
            mesh.push_triangle([prev1, cur1, POS_X], POS_X, color);
        }
    }

    finish(mesh, &pre_transform, "cylinder")
}

const CUBE_CORNERS: [Vec3f; 8] = [
    Vec3f::new(-0.5, -0.5, -0.5),
    Vec3f::new(0.5, -0.5, -0.5),
    Vec3f::new(0.5, 0.5, -0.5),
    Vec3f::new(-0.5, 0.5, -0.5),
    Vec3f::new(-0.5, -0.5, 0.5),
    Vec3f::new(0.5, -0.5, 0.5),
    Vec3f::new(0.5, 0.5, 0.5),
    Vec3f::new(-0.5, 0.5, 0.5),
];

/// Two triangles per face, wound so the cross product points outward.
const CUBE_FACES: [[usize; 3]; 12] = [
    [2, 1, 0], [0, 3, 2], // -Z
    [6, 5, 1], [1, 2, 6], // +X
    [4, 5, 6], [6, 7, 4], // +Z
    [3, 0, 4], [4, 7, 3], // -X
    [6, 2, 3], [3, 7, 6], // +Y
    [0, 1, 5], [5, 4, 0], // -Y
];

/// Unit cube centred on the origin: 12 triangles, 36 vertices.
pub fn make_cube(color: Vec3f, pre_transform: Mat44f) -> MeshBuffer {
    let mut mesh = MeshBuffer::with_capacity(CUBE_FACES.len() * 3);

    for [a, b, c] in CUBE_FACES {
        let corners = [CUBE_CORNERS[a], CUBE_CORNERS[b], CUBE_CORNERS[c]];
        let normal = flat_normal(corners[0], corners[1], corners[2]);
        mesh.push_triangle(corners, normal, color);
    }

    finish(mesh, &pre_transform, "cube")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    const ORANGE: Vec3f = Vec3f::new(0.9098, 0.5137, 0.0627);

    #[test]
    fn test_cone_counts() {
        let open = make_cone(false, 16, ORANGE, Mat44f::IDENTITY);
        assert_eq!(open.vertex_count(), 48);
        assert_eq!(open.normals.len(), 48);
        assert!(open.colors.iter().all(|c| *c == ORANGE));

        let capped = make_cone(true, 16, ORANGE, Mat44f::IDENTITY);
        assert_eq!(capped.vertex_count(), 96);
    }

    #[test]
    fn test_cylinder_counts() {
        assert_eq!(make_cylinder(false, 8, ORANGE, Mat44f::IDENTITY).vertex_count(), 48);
        assert_eq!(make_cylinder(true, 8, ORANGE, Mat44f::IDENTITY).vertex_count(), 96);
    }

    #[test]
    fn test_zero_subdivisions_is_empty() {
        assert!(make_cone(true, 0, ORANGE, Mat44f::IDENTITY).is_empty());
        let cylinder = make_cylinder(true, 0, ORANGE, Mat44f::IDENTITY);
        assert!(cylinder.is_empty());
        assert!(cylinder.colors.is_empty());
        assert!(cylinder.normals.is_empty());
    }

    #[test]
    fn test_side_normals_point_away_from_axis() {
        let cylinder = make_cylinder(false, 12, ORANGE, Mat44f::IDENTITY);
        for tri in cylinder.triangles() {
            let centre = (tri[0].position + tri[1].position + tri[2].position) / 3.0;
            let radial = Vec3f::new(0.0, centre.y, centre.z);
            assert!(tri[0].normal.dot(radial) > 0.0);
            assert!(tri[0].normal.x.abs() < 1e-5);
        }
    }

    #[test]
    fn test_cone_cap_faces_negative_x() {
        let cone = make_cone(true, 4, ORANGE, Mat44f::IDENTITY);
        let caps: Vec<_> = cone.triangles().skip(1).step_by(2).collect();
        assert_eq!(caps.len(), 4);
        for tri in caps {
            assert_eq!(tri[0].normal, NEG_X);
            assert!(tri.iter().all(|v| v.position.x == 0.0));
        }
    }

    #[test]
    fn test_pre_transform_moves_positions_only() {
        let t = Transform::translation(Vec3f::new(5.0, 0.0, 0.0)) * Transform::scaling(2.0, 2.0, 2.0);
        let moved = make_cube(ORANGE, t);
        let local = make_cube(ORANGE, Mat44f::IDENTITY);
        for (m, l) in moved.positions.iter().zip(&local.positions) {
            assert!((*m - (*l * 2.0 + Vec3f::new(5.0, 0.0, 0.0))).length() < 1e-6);
        }
        assert_eq!(moved.normals, local.normals);
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = make_cube(ORANGE, Mat44f::IDENTITY);
        assert_eq!(cube.vertex_count(), 36);
        for tri in cube.triangles() {
            let centre = (tri[0].position + tri[1].position + tri[2].position) / 3.0;
            assert!(tri[0].normal.dot(centre) > 0.0);
        }
    }
}
