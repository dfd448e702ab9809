use std::sync::Arc;

use promptdeck_api_types::ListingFilter;

use crate::application::repos::{PromptsRepo, RepoError};
use crate::domain::entities::PromptRecord;

/// Reads prompts for a listing filter, newest first.
#[derive(Clone)]
pub struct PromptQueryService {
    reader: Arc<dyn PromptsRepo>,
}

impl PromptQueryService {
    pub fn new(reader: Arc<dyn PromptsRepo>) -> Self {
        Self { reader }
    }

    /// The store pre-filters on the search term; the exact search and the
    /// tag filter are applied here so the result does not depend on how
    /// coarse the store's matching is.
    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<PromptRecord>, RepoError> {
        let mut records = self.reader.list_prompts(filter.search()).await?;
        if !filter.is_unfiltered() {
            records.retain(|record| {
                filter.matches(&record.title, &record.description, &record.tags)
            });
        }
        Ok(records)
    }
}
