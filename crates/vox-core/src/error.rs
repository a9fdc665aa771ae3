use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoxError {
    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    #[error("Mesh load failed: {0}")]
    Load(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, VoxError>;
