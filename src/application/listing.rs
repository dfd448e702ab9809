use std::sync::Arc;

use bytes::Bytes;
use promptdeck_api_types::{ListingFilter, Prompt};
use thiserror::Error;
use tracing::debug;

use crate::application::query::PromptQueryService;
use crate::application::repos::RepoError;
use crate::cache::{CacheRead, CacheTier, ListingCache, ListingSnapshot};

#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("failed to encode listing: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where a listing body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Cache(CacheTier),
    Store,
}

impl ListingSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingSource::Cache(CacheTier::Remote) => "remote",
            ListingSource::Cache(CacheTier::Local) => "local",
            ListingSource::Store => "store",
        }
    }
}

/// A JSON array of prompts, ready to be written to the response.
#[derive(Debug, Clone)]
pub struct ListingBody {
    pub body: Bytes,
    pub source: ListingSource,
}

/// Serves `GET /api/prompts`. Only the unfiltered listing goes through the
/// cache; filtered requests always query the store and are never cached.
#[derive(Clone)]
pub struct ListingService {
    query: PromptQueryService,
    cache: Arc<ListingCache>,
}

impl ListingService {
    pub fn new(query: PromptQueryService, cache: Arc<ListingCache>) -> Self {
        Self { query, cache }
    }

    pub async fn list(&self, filter: &ListingFilter) -> Result<ListingBody, ListingError> {
        if !filter.is_unfiltered() {
            let body = self.load(filter).await?;
            return Ok(ListingBody {
                body,
                source: ListingSource::Store,
            });
        }

        if let CacheRead::Hit { tier, snapshot } = self.cache.get().await {
            debug!(target: "promptdeck::listing", tier = tier.as_str(), "listing served from cache");
            return Ok(ListingBody {
                body: snapshot.into_bytes(),
                source: ListingSource::Cache(tier),
            });
        }

        let body = self.load(filter).await?;
        self.cache.set(ListingSnapshot::new(body.clone())).await;
        Ok(ListingBody {
            body,
            source: ListingSource::Store,
        })
    }

    async fn load(&self, filter: &ListingFilter) -> Result<Bytes, ListingError> {
        let records = self.query.list(filter).await?;
        let prompts: Vec<Prompt> = records.into_iter().map(Prompt::from).collect();
        Ok(Bytes::from(serde_json::to_vec(&prompts)?))
    }
}
