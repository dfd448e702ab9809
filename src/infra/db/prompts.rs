use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CreatePromptParams, PromptsRepo, PromptsWriteRepo, RepoError},
    domain::{
        PromptCategory,
        entities::PromptRecord,
        prompts::{VoteDelta, decode_tags, encode_tags, encoded_tag_fragment},
    },
};

use super::{
    PostgresRepositories,
    util::{like_pattern, map_sqlx_error},
};

const PROMPT_COLUMNS: &str =
    "id, title, description, content, category, tags, votes, author, created_at";

#[derive(sqlx::FromRow)]
struct PromptRow {
    id: Uuid,
    title: String,
    description: String,
    content: String,
    category: String,
    tags: String,
    votes: i64,
    author: String,
    created_at: OffsetDateTime,
}

impl TryFrom<PromptRow> for PromptRecord {
    type Error = RepoError;

    fn try_from(row: PromptRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<PromptCategory>()
            .map_err(|err| RepoError::decode(format!("prompt {}: {err}", row.id)))?;
        let tags = decode_tags(&row.tags)
            .map_err(|err| RepoError::decode(format!("prompt {}: {err}", row.id)))?;

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            content: row.content,
            category,
            tags,
            votes: row.votes,
            author: row.author,
            created_at: row.created_at,
        })
    }
}

fn into_records(rows: Vec<PromptRow>) -> Result<Vec<PromptRecord>, RepoError> {
    rows.into_iter().map(PromptRecord::try_from).collect()
}

#[async_trait]
impl PromptsRepo for PostgresRepositories {
    async fn list_prompts(&self, search: Option<&str>) -> Result<Vec<PromptRecord>, RepoError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        qb.push(PROMPT_COLUMNS);
        qb.push(" FROM prompts WHERE 1=1");

        if let Some(term) = search {
            let pattern = like_pattern(term);
            qb.push(" AND (title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR description ILIKE ");
            qb.push_bind(pattern);
            qb.push(" OR tags ILIKE ");
            qb.push_bind(like_pattern(&encoded_tag_fragment(term)));
            qb.push(")");
        }

        qb.push(" ORDER BY created_at DESC, id DESC");

        let rows = qb
            .build_query_as::<PromptRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        into_records(rows)
    }

    async fn find_prompt(&self, id: Uuid) -> Result<Option<PromptRecord>, RepoError> {
        let sql = format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = $1");
        let row = sqlx::query_as::<_, PromptRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(PromptRecord::try_from).transpose()
    }

    async fn count_prompts(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prompts")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }
}

#[async_trait]
impl PromptsWriteRepo for PostgresRepositories {
    async fn create_prompt(&self, params: CreatePromptParams) -> Result<PromptRecord, RepoError> {
        let CreatePromptParams { prompt, votes } = params;
        let sql = format!(
            "INSERT INTO prompts (id, title, description, content, category, tags, votes, author) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PROMPT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, PromptRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(prompt.title())
            .bind(prompt.description())
            .bind(prompt.content())
            .bind(prompt.category().as_str())
            .bind(encode_tags(prompt.tags()))
            .bind(votes)
            .bind(prompt.author())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        PromptRecord::try_from(row)
    }

    async fn apply_vote(&self, id: Uuid, delta: VoteDelta) -> Result<PromptRecord, RepoError> {
        // Single statement so concurrent votes never lose an increment.
        let sql = format!(
            "UPDATE prompts SET votes = votes + $1 WHERE id = $2 RETURNING {PROMPT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, PromptRow>(&sql)
            .bind(delta.value())
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        PromptRecord::try_from(row)
    }
}
