//! Domain entities mirrored from persistent storage.

use promptdeck_api_types::Prompt;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::PromptCategory;

/// A stored prompt. `tags` is always decoded; the encoded column form never
/// leaves the persistence adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: PromptCategory,
    pub tags: Vec<String>,
    pub votes: i64,
    pub author: String,
    pub created_at: OffsetDateTime,
}

impl From<PromptRecord> for Prompt {
    fn from(record: PromptRecord) -> Self {
        Prompt {
            id: record.id.to_string(),
            title: record.title,
            description: record.description,
            content: record.content,
            category: record.category,
            tags: record.tags,
            votes: record.votes,
            author: record.author,
            created_at: record.created_at,
            is_trending: None,
        }
    }
}
