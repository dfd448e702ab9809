//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::PromptRecord;
use crate::domain::prompts::{NewPrompt, VoteDelta};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
    #[error("stored record could not be decoded: {message}")]
    Decode { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatePromptParams {
    pub prompt: NewPrompt,
    /// Starting vote count; zero for everything except seeded fixtures.
    pub votes: i64,
}

impl From<NewPrompt> for CreatePromptParams {
    fn from(prompt: NewPrompt) -> Self {
        Self { prompt, votes: 0 }
    }
}

#[async_trait]
pub trait PromptsRepo: Send + Sync {
    /// Prompts newest first. With a `search` term the store may narrow the
    /// result, but only ever to a superset of the exact matches.
    async fn list_prompts(&self, search: Option<&str>) -> Result<Vec<PromptRecord>, RepoError>;

    async fn find_prompt(&self, id: Uuid) -> Result<Option<PromptRecord>, RepoError>;

    async fn count_prompts(&self) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait PromptsWriteRepo: Send + Sync {
    async fn create_prompt(&self, params: CreatePromptParams) -> Result<PromptRecord, RepoError>;

    /// Atomically add `delta` to the stored count. Missing ids yield
    /// [`RepoError::NotFound`].
    async fn apply_vote(&self, id: Uuid, delta: VoteDelta) -> Result<PromptRecord, RepoError>;
}
