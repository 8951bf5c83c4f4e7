use pagesmith_lifecycle::LifecycleError;
use pagesmith_protocol::{CollaboratorError, ErrorKind};
use pagesmith_styles::StyleError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Could not read edit instructions: {0}")]
    MalformedInstructions(String),

    #[error("No component matches the request")]
    UnresolvedComponent,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Style(#[from] StyleError),
}

impl OrchestratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_) | Self::MalformedInstructions(_) => ErrorKind::ValidationError,
            Self::UnresolvedComponent => ErrorKind::NotFoundError,
            Self::Collaborator(_) => ErrorKind::IoError,
            Self::Lifecycle(err) => err.kind(),
            Self::Style(err) => err.kind(),
        }
    }
}
