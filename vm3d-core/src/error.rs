//! Error types for vm3d-core.
//!
//! The vector/matrix algebra is total and never returns these; only matrix
//! inversion, mesh validation and model loading can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The matrix has no inverse (determinant at or below the singular threshold).
    #[error("Matrix is singular (determinant {determinant:e})")]
    SingularMatrix { determinant: f32 },

    /// Mesh attribute sequences are inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("OBJ parse error on line {line}: {message}")]
    ObjParse { line: usize, message: String },

    /// A face referenced a material that no loaded library defines.
    #[error("Unknown material: {0}")]
    MissingMaterial(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
