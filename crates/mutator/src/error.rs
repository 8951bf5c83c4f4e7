use pagesmith_markup::MarkupError;
use pagesmith_protocol::{ErrorKind, ValidationError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Target not found: {0}")]
    NotFound(String),

    #[error("Ambiguous target: {0}")]
    Ambiguous(String),

    #[error("No safe match: {0}")]
    NoMatch(String),

    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),
}

impl EditError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidSelector(_) => ErrorKind::ValidationError,
            Self::NotFound(_) => ErrorKind::NotFoundError,
            Self::Ambiguous(_) | Self::NoMatch(_) | Self::Markup(_) => ErrorKind::NoOpError,
        }
    }

    /// An ambiguity is final: later, looser tiers must not pick a candidate instead.
    pub fn ends_cascade(&self) -> bool {
        matches!(self, Self::Ambiguous(_))
    }
}

