//! Triangle-list mesh buffers and their composition
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::mat::Mat44f;
use crate::vec::{as_floats, Vec2f, Vec3f};

/// Floats per vertex in the interleaved upload layout:
/// position (3), color (3), normal (3), texcoord (2).
pub const VERTEX_STRIDE_FLOATS: usize = 11;

/// One corner of a triangle, gathered from the parallel attribute sequences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3f,
    pub color: Vec3f,
    pub normal: Vec3f,
}

/// Non-indexed triangle list stored as parallel attribute sequences.
///
/// `positions`, `colors` and `normals` always have the same length, a
/// multiple of three. `texcoords` is either empty or as long as `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    pub positions: Vec<Vec3f>,
    pub colors: Vec<Vec3f>,
    pub normals: Vec<Vec3f>,
    pub texcoords: Vec<Vec2f>,
}

impl MeshBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            texcoords: Vec::new(),
        }
    }

    /// Number of vertices to draw.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    /// Append one flat-shaded triangle with a uniform color.
    pub fn push_triangle(&mut self, corners: [Vec3f; 3], normal: Vec3f, color: Vec3f) {
        for corner in corners {
            self.positions.push(corner);
            self.normals.push(normal);
            self.colors.push(color);
        }
    }

    /// Append `other` after every vertex of `self`, reusing `self`'s storage.
    ///
    /// If only one side carries texcoords, the other side's vertices get
    /// `(0, 0)` so the result keeps texcoords aligned with positions.
    pub fn concatenate(mut self, other: &MeshBuffer) -> MeshBuffer {
        let own_len = self.positions.len();

        self.positions.extend_from_slice(&other.positions);
        self.colors.extend_from_slice(&other.colors);
        self.normals.extend_from_slice(&other.normals);

        if self.has_texcoords() || other.has_texcoords() {
            self.texcoords.resize(own_len, Vec2f::ZERO);
            self.texcoords.extend_from_slice(&other.texcoords);
            self.texcoords.resize(self.positions.len(), Vec2f::ZERO);
        }

        debug!(
            appended = other.vertex_count(),
            total = self.vertex_count(),
            "concatenated mesh buffers"
        );
        self
    }

    /// Check the attribute-length invariants.
    pub fn validate(&self) -> CoreResult<()> {
        let n = self.positions.len();
        if self.colors.len() != n || self.normals.len() != n {
            return Err(CoreError::InvalidMesh(format!(
                "attribute lengths differ: {} positions, {} colors, {} normals",
                n,
                self.colors.len(),
                self.normals.len()
            )));
        }
        if !self.texcoords.is_empty() && self.texcoords.len() != n {
            return Err(CoreError::InvalidMesh(format!(
                "{} texcoords for {} positions",
                self.texcoords.len(),
                n
            )));
        }
        if n % 3 != 0 {
            return Err(CoreError::InvalidMesh(format!(
                "{n} vertices is not a whole number of triangles"
            )));
        }
        Ok(())
    }

    /// Iterate triangles as groups of three consecutive vertices.
    pub fn triangles(&self) -> impl Iterator<Item = [MeshVertex; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| {
            let vertex = |i: usize| MeshVertex {
                position: self.positions[i],
                color: self.colors[i],
                normal: self.normals[i],
            };
            [vertex(3 * t), vertex(3 * t + 1), vertex(3 * t + 2)]
        })
    }

    pub fn position_floats(&self) -> &[f32] {
        as_floats(&self.positions)
    }

    pub fn color_floats(&self) -> &[f32] {
        as_floats(&self.colors)
    }

    pub fn normal_floats(&self) -> &[f32] {
        as_floats(&self.normals)
    }

    /// Empty when the mesh has no texcoords.
    pub fn texcoord_floats(&self) -> &[f32] {
        as_floats(&self.texcoords)
    }

    /// Interleave all attributes into one buffer of
    /// [`VERTEX_STRIDE_FLOATS`] floats per vertex; missing texcoords are zero.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.vertex_count() * VERTEX_STRIDE_FLOATS);
        for i in 0..self.vertex_count() {
            let uv = self.texcoords.get(i).copied().unwrap_or_default();
            out.extend_from_slice(&self.positions[i].to_array());
            out.extend_from_slice(&self.colors[i].to_array());
            out.extend_from_slice(&self.normals[i].to_array());
            out.extend_from_slice(&uv.to_array());
        }
        out
    }
}

/// Consume `a`, append a copy of `b`, and return the combined buffer.
pub fn concatenate(a: MeshBuffer, b: &MeshBuffer) -> MeshBuffer {
    a.concatenate(b)
}

/// Flat face normal of the triangle `(a, b, c)` (counter-clockwise front).
pub fn flat_normal(a: Vec3f, b: Vec3f, c: Vec3f) -> Vec3f {
    (b - a).cross(c - a).normalize()
}

/// Like [`flat_normal`], but `None` for zero-area triangles (collinear or
/// repeated corners).
pub fn try_flat_normal(a: Vec3f, b: Vec3f, c: Vec3f) -> Option<Vec3f> {
    let n = (b - a).cross(c - a);
    let len = n.length();
    (len > 0.0 && len.is_finite()).then(|| n / len)
}

/// Run every position through `transform` with a perspective divide.
/// Normals are left alone.
pub fn apply_pre_transform(positions: &mut [Vec3f], transform: &Mat44f) {
    for p in positions.iter_mut() {
        *p = transform.transform_point(*p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(offset: f32, color: Vec3f) -> MeshBuffer {
        let mut mesh = MeshBuffer::new();
        mesh.push_triangle(
            [
                Vec3f::new(offset, 0.0, 0.0),
                Vec3f::new(offset + 1.0, 0.0, 0.0),
                Vec3f::new(offset, 1.0, 0.0),
            ],
            Vec3f::new(0.0, 0.0, 1.0),
            color,
        );
        mesh
    }

    #[test]
    fn test_push_triangle_keeps_attributes_parallel() {
        let mesh = triangle(0.0, Vec3f::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_concatenate_preserves_order() {
        let a = triangle(0.0, Vec3f::new(1.0, 0.0, 0.0));
        let b = triangle(5.0, Vec3f::new(0.0, 1.0, 0.0));
        let merged = concatenate(a.clone(), &b);

        assert_eq!(merged.vertex_count(), 6);
        assert_eq!(&merged.positions[..3], &a.positions[..]);
        assert_eq!(&merged.positions[3..], &b.positions[..]);
        assert_eq!(&merged.colors[3..], &b.colors[..]);
        assert!(!merged.has_texcoords());
    }

    #[test]
    fn test_concatenate_with_empty_is_neutral() {
        let a = triangle(0.0, Vec3f::new(1.0, 1.0, 1.0));
        assert_eq!(MeshBuffer::new().concatenate(&a), a);
        assert_eq!(a.clone().concatenate(&MeshBuffer::new()), a);
    }

    #[test]
    fn test_concatenate_pads_missing_texcoords() {
        let mut textured = triangle(0.0, Vec3f::new(1.0, 1.0, 1.0));
        textured.texcoords = vec![Vec2f::new(0.0, 0.0), Vec2f::new(1.0, 0.0), Vec2f::new(0.0, 1.0)];
        let plain = triangle(2.0, Vec3f::new(1.0, 1.0, 1.0));

        let merged = plain.clone().concatenate(&textured);
        assert_eq!(merged.texcoords.len(), 6);
        assert_eq!(merged.texcoords[0], Vec2f::ZERO);
        assert_eq!(merged.texcoords[4], Vec2f::new(1.0, 0.0));
        assert!(merged.validate().is_ok());

        let merged = textured.concatenate(&plain);
        assert_eq!(merged.texcoords.len(), 6);
        assert_eq!(merged.texcoords[5], Vec2f::ZERO);
    }

    #[test]
    fn test_validate_catches_inconsistent_lengths() {
        let mut mesh = triangle(0.0, Vec3f::new(1.0, 1.0, 1.0));
        mesh.colors.pop();
        assert!(mesh.validate().is_err());

        let mut mesh = triangle(0.0, Vec3f::new(1.0, 1.0, 1.0));
        mesh.texcoords.push(Vec2f::ZERO);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_interleaved_layout() {
        let mesh = triangle(0.0, Vec3f::new(0.2, 0.4, 0.6));
        let data = mesh.to_interleaved();
        assert_eq!(data.len(), 3 * VERTEX_STRIDE_FLOATS);
        assert_eq!(&data[VERTEX_STRIDE_FLOATS..VERTEX_STRIDE_FLOATS + 3], &[1.0, 0.0, 0.0]);
        assert_eq!(&data[3..6], &[0.2, 0.4, 0.6]);
        assert_eq!(&data[6..9], &[0.0, 0.0, 1.0]);
        assert_eq!(&data[9..11], &[0.0, 0.0]);
        assert_eq!(mesh.position_floats().len(), 9);
        assert!(mesh.texcoord_floats().is_empty());
    }

    #[test]
    fn test_flat_normal_follows_winding() {
        let n = flat_normal(Vec3f::ZERO, Vec3f::new(1.0, 0.0, 0.0), Vec3f::new(0.0, 1.0, 0.0));
        assert_eq!(n, Vec3f::new(0.0, 0.0, 1.0));
    }
}
