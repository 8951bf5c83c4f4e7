use pagesmith_lifecycle::LifecycleError;
use pagesmith_markup::MarkupError;
use pagesmith_protocol::ErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StyleError>;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Unknown colour family: {0}")]
    UnknownFamily(String),

    #[error("Invalid colour value: {0}")]
    InvalidColor(String),

    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl StyleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFamily(_) | Self::InvalidColor(_) => ErrorKind::ValidationError,
            Self::Markup(_) => ErrorKind::NoOpError,
            Self::Lifecycle(err) => err.kind(),
        }
    }
}
