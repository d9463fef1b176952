use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use allyflow_core::ErrorKind;
use thiserror::Error;

/// Failure kinds of the external text-generation service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("text generation credential is not configured")]
    MissingCredential,

    /// Non-2xx status or a network failure (`status` is `None` for the latter).
    #[error("text generation transport failed (status: {status:?}): {body}")]
    Transport { status: Option<u16>, body: String },

    /// Policy refusal reported by the service.
    #[error("text generation blocked: {reason}")]
    ContentBlocked { reason: String },

    #[error("malformed text generation response: {0}")]
    MalformedResponse(String),

    #[error("text generation returned empty output")]
    EmptyOutput,

    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Collaborator
    }
}

/// External text-generation collaborator: `generate(prompt) -> text`.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[async_trait::async_trait]
impl<G: TextGenerator + ?Sized> TextGenerator for Arc<G> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}

/// Wraps a generator with a hard deadline. Expiry is a collaborator failure;
/// the in-flight call is dropped.
#[derive(Debug, Clone)]
pub struct TimeoutGenerator<G> {
    inner: G,
    limit: Duration,
}

impl<G> TimeoutGenerator<G> {
    pub fn new(inner: G, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

#[async_trait::async_trait]
impl<G: TextGenerator> TextGenerator for TimeoutGenerator<G> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.limit, self.inner.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.limit)),
        }
    }
}

/// In-process generator that replays scripted replies in order and records
/// every prompt it receives. Used by tests and offline runs.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: impl IntoIterator<Item = Result<String, GenerationError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator that answers once with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::new([Ok(reply.into())])
    }

    /// A generator that fails once with `error`.
    pub fn failing(error: GenerationError) -> Self {
        Self::new([Err(error)])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let mut replies = self.replies.lock().map_err(|_| GenerationError::Transport {
            status: None,
            body: "scripted generator lock poisoned".to_string(),
        })?;
        replies.pop_front().unwrap_or_else(|| {
            Err(GenerationError::Transport {
                status: None,
                body: "scripted generator has no replies left".to_string(),
            })
        })
    }
}
