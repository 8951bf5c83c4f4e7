use pagesmith_markup::MarkupError;
use pagesmith_protocol::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LifecycleError>;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid component name: {0:?}")]
    InvalidName(String),

    #[error("Component file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Component not found: {0}")]
    NotFound(String),

    #[error("{} changed on disk since it was read", .0.display())]
    Conflict(PathBuf),

    #[error("Manifest markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error("{0}")]
    Other(String),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName(_) | Self::AlreadyExists(_) => ErrorKind::ValidationError,
            Self::NotFound(_) => ErrorKind::NotFoundError,
            Self::Conflict(_) => ErrorKind::ConflictError,
            Self::Markup(_) => ErrorKind::NoOpError,
            Self::IoError(_) | Self::Other(_) => ErrorKind::IoError,
        }
    }
}
