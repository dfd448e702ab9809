use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::IntoResponse;
use promptdeck_api_types::{CreatePromptRequest, HealthResponse, ListingFilter, Prompt};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::prompts::{PromptDraft, VoteDelta};

use super::error::ApiError;
use super::state::ApiState;

/// Which tier (or the store) produced a listing body.
pub const CACHE_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-promptdeck-cache");

const INVALID_BODY: &str = "Invalid request body";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    /// Comma-separated.
    pub tags: Option<String>,
}

pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        redis: state.cache.remote_available(),
    })
}

pub async fn list_prompts(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ListingFilter::from_query(query.search.as_deref(), query.tags.as_deref());
    let listing = state.listing.list(&filter).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (CACHE_SOURCE_HEADER, listing.source.as_str()),
        ],
        listing.body,
    ))
}

pub async fn get_prompt(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Prompt>, ApiError> {
    let record = state.prompts.find(&id).await?;
    Ok(Json(Prompt::from(record)))
}

pub async fn create_prompt(
    State(state): State<ApiState>,
    payload: Result<Json<CreatePromptRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request(INVALID_BODY))?;

    let draft = PromptDraft {
        title: request.title,
        description: request.description,
        content: request.content,
        category: request.category,
        tags: request.tags,
        author: request.author,
    };
    let record = state.prompts.create(draft).await?;

    Ok((StatusCode::CREATED, Json(Prompt::from(record))))
}

pub async fn vote_prompt(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Prompt>, ApiError> {
    let Json(body) = payload.map_err(|_| ApiError::bad_request(INVALID_BODY))?;
    let delta = VoteDelta::from_json(body.get("delta"))
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let record = state.prompts.vote(&id, delta).await?;
    Ok(Json(Prompt::from(record)))
}
