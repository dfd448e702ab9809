use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CreatePromptParams, PromptsRepo, PromptsWriteRepo, RepoError};
use crate::cache::ListingCache;
use crate::domain::entities::PromptRecord;
use crate::domain::error::PromptValidationError;
use crate::domain::prompts::{NewPrompt, PromptDraft, VoteDelta};

#[derive(Debug, Error)]
pub enum PromptServiceError {
    #[error(transparent)]
    Validation(#[from] PromptValidationError),
    #[error("Prompt not found")]
    NotFound,
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for PromptServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => PromptServiceError::NotFound,
            other => PromptServiceError::Repo(other),
        }
    }
}

/// Single-prompt reads and the two mutations. Every successful mutation
/// invalidates the listing cache before returning.
#[derive(Clone)]
pub struct PromptService {
    reader: Arc<dyn PromptsRepo>,
    writer: Arc<dyn PromptsWriteRepo>,
    cache: Arc<ListingCache>,
}

impl PromptService {
    pub fn new(
        reader: Arc<dyn PromptsRepo>,
        writer: Arc<dyn PromptsWriteRepo>,
        cache: Arc<ListingCache>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    /// Ids that are not store ids are reported as not found.
    pub async fn find(&self, id: &str) -> Result<PromptRecord, PromptServiceError> {
        let id = parse_id(id)?;
        self.reader
            .find_prompt(id)
            .await?
            .ok_or(PromptServiceError::NotFound)
    }

    pub async fn create(&self, draft: PromptDraft) -> Result<PromptRecord, PromptServiceError> {
        let prompt = NewPrompt::validate(draft)?;
        let record = self
            .writer
            .create_prompt(CreatePromptParams::from(prompt))
            .await?;
        self.cache.invalidate().await;

        info!(
            target: "promptdeck::prompts",
            prompt_id = %record.id,
            category = record.category.as_str(),
            "prompt created"
        );
        Ok(record)
    }

    pub async fn vote(&self, id: &str, delta: VoteDelta) -> Result<PromptRecord, PromptServiceError> {
        let id = parse_id(id)?;
        let record = self.writer.apply_vote(id, delta).await?;
        self.cache.invalidate().await;
        Ok(record)
    }
}

fn parse_id(id: &str) -> Result<Uuid, PromptServiceError> {
    Uuid::parse_str(id.trim()).map_err(|_| PromptServiceError::NotFound)
}
