use async_trait::async_trait;
#[cfg(any(test, feature = "testing"))]
use std::collections::VecDeque;
#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// An image attached to a request, referenced by URL (`data:` URLs included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub images: Vec<ImageRef>,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: Vec<ImageRef>) -> Self {
        self.images = images;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// The model stopped on its output limit rather than a natural end.
    pub truncated: bool,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            truncated: false,
        }
    }
}

/// The external language-model collaborator.
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<Completion, CollaboratorError>;

    /// Streams a conversational answer into `sink`. Implementations stop forwarding once
    /// the receiver is dropped; chunks already sent stay sent.
    async fn stream(
        &self,
        prompt: &Prompt,
        sink: mpsc::Sender<String>,
    ) -> Result<(), CollaboratorError> {
        let completion = self.complete(prompt).await?;
        let _ = sink.send(completion.text).await;
        Ok(())
    }
}

/// Collaborator that is never reachable; callers fall back to their offline paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineCollaborator;

#[async_trait]
impl Collaborator for OfflineCollaborator {
    async fn complete(&self, _prompt: &Prompt) -> Result<Completion, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "no collaborator configured".to_string(),
        ))
    }
}

/// Replays queued responses in order and records every prompt it receives.
#[cfg(any(test, feature = "testing"))]
#[derive(Default)]
pub struct ScriptedCollaborator {
    responses: Mutex<VecDeque<Result<Completion, CollaboratorError>>>,
    prompts: Mutex<Vec<Prompt>>,
}

#[cfg(any(test, feature = "testing"))]
impl ScriptedCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(Completion::text(text)))
    }

    pub fn reply_truncated(self, text: impl Into<String>) -> Self {
        self.push(Ok(Completion {
            text: text.into(),
            truncated: true,
        }))
    }

    pub fn fail(self, reason: impl Into<String>) -> Self {
        self.push(Err(CollaboratorError::Transport(reason.into())))
    }

    fn push(self, response: Result<Completion, CollaboratorError>) -> Self {
        self.responses
            .lock()
            .expect("script mutex poisoned")
            .push_back(response);
        self
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().expect("script mutex poisoned").clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().expect("script mutex poisoned").len()
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl Collaborator for ScriptedCollaborator {
    async fn complete(&self, prompt: &Prompt) -> Result<Completion, CollaboratorError> {
        self.prompts
            .lock()
            .expect("script mutex poisoned")
            .push(prompt.clone());
        self.responses
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(CollaboratorError::Unavailable("script exhausted".to_string())))
    }
}
