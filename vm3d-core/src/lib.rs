//! VM3D Core Library - Vector math, transforms and mesh generation
//!
//! This library provides the renderer-independent core: small fixed-size
//! vectors and matrices, affine and projective transforms, procedural and
//! OBJ-loaded triangle meshes, and the spaceship scene built from them.

pub mod error;
pub mod mat;
pub mod mesh;
pub mod obj;
pub mod projection;
pub mod scene;
pub mod shapes;
pub mod transform;
pub mod vec;

// Re-export commonly used types
pub use error::{CoreError, CoreResult};
pub use mat::{Mat22f, Mat33f, Mat44f};
pub use mesh::{concatenate, MeshBuffer, MeshVertex};
pub use projection::{look_at, perspective_projection, Camera};
pub use shapes::{make_cone, make_cube, make_cylinder};
pub use transform::{RotationState, Transform};
pub use vec::{Vec2f, Vec3f, Vec4f};
