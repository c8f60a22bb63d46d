//! Error types for the terminal viewer.

use thiserror::Error;
use vm3d_core::CoreError;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be read, parsed or validated.
    #[error("Config error: {0}")]
    Config(String),
}

pub type ViewerResult<T> = Result<T, ViewerError>;
