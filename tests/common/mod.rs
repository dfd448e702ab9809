#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response, header};
use bytes::Bytes;
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::datetime;
use tower::ServiceExt;
use uuid::Uuid;

use promptdeck::application::listing::ListingService;
use promptdeck::application::prompts::PromptService;
use promptdeck::application::query::PromptQueryService;
use promptdeck::application::repos::{
    CreatePromptParams, PromptsRepo, PromptsWriteRepo, RepoError,
};
use promptdeck::cache::{CacheConfig, CacheError, ListingCache, RemoteCache};
use promptdeck::domain::entities::PromptRecord;
use promptdeck::domain::prompts::VoteDelta;
use promptdeck::infra::http::{self, ApiState};

const BASE_TIME: OffsetDateTime = datetime!(2024-01-01 00:00:00 UTC);

/// Store double: every create gets a later timestamp than the previous one.
#[derive(Default)]
pub struct InMemoryPrompts {
    records: Mutex<Vec<PromptRecord>>,
    failing: AtomicBool,
    list_calls: AtomicUsize,
}

impl InMemoryPrompts {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn votes_of(&self, id: &str) -> Option<i64> {
        let id = Uuid::parse_str(id).ok()?;
        self.records
            .lock()
            .expect("records")
            .iter()
            .find(|record| record.id == id)
            .map(|record| record.votes)
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl PromptsRepo for InMemoryPrompts {
    async fn list_prompts(&self, _search: Option<&str>) -> Result<Vec<PromptRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut records = self.records.lock().expect("records").clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn find_prompt(&self, id: Uuid) -> Result<Option<PromptRecord>, RepoError> {
        self.check()?;
        Ok(self
            .records
            .lock()
            .expect("records")
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn count_prompts(&self) -> Result<u64, RepoError> {
        self.check()?;
        Ok(self.records.lock().expect("records").len() as u64)
    }
}

#[async_trait]
impl PromptsWriteRepo for InMemoryPrompts {
    async fn create_prompt(&self, params: CreatePromptParams) -> Result<PromptRecord, RepoError> {
        self.check()?;
        let mut records = self.records.lock().expect("records");
        let prompt = params.prompt;
        let record = PromptRecord {
            id: Uuid::new_v4(),
            title: prompt.title().to_string(),
            description: prompt.description().to_string(),
            content: prompt.content().to_string(),
            category: prompt.category(),
            tags: prompt.tags().to_vec(),
            votes: params.votes,
            author: prompt.author().to_string(),
            created_at: BASE_TIME + Duration::from_secs(records.len() as u64 + 1),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn apply_vote(&self, id: Uuid, delta: VoteDelta) -> Result<PromptRecord, RepoError> {
        self.check()?;
        let mut records = self.records.lock().expect("records");
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(RepoError::NotFound)?;
        record.votes += delta.value();
        Ok(record.clone())
    }
}

/// Remote tier double that can be switched off.
#[derive(Default)]
pub struct FakeRemote {
    entries: Mutex<HashMap<String, Bytes>>,
    failing: AtomicBool,
}

impl FakeRemote {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("entries").is_empty()
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::unavailable("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteCache for FakeRemote {
    async fn ping(&self) -> Result<(), CacheError> {
        self.check()
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        self.check()?;
        Ok(self.entries.lock().expect("entries").get(key).cloned())
    }

    async fn set(&self, key: &str, value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        self.entries
            .lock()
            .expect("entries")
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().expect("entries").remove(key);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryPrompts>,
    pub cache: Arc<ListingCache>,
}

/// Wire the real services and router over the doubles. A given remote is
/// probed once, so it starts out ready when reachable.
pub async fn build_app(remote: Option<Arc<FakeRemote>>) -> TestApp {
    let store = Arc::new(InMemoryPrompts::default());
    let remote = remote.map(|remote| -> Arc<dyn RemoteCache> { remote });
    let cache = Arc::new(ListingCache::new(CacheConfig::default(), remote));
    cache.probe().await;

    let reader: Arc<dyn PromptsRepo> = store.clone();
    let writer: Arc<dyn PromptsWriteRepo> = store.clone();
    let state = ApiState {
        listing: Arc::new(ListingService::new(
            PromptQueryService::new(reader.clone()),
            cache.clone(),
        )),
        prompts: Arc::new(PromptService::new(reader, writer, cache.clone())),
        cache: cache.clone(),
    };

    TestApp {
        router: http::build_router(state),
        store,
        cache,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond")
    }

    pub async fn send_raw(&self, method: Method, uri: &str, raw: &'static str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond")
    }

    /// Create a prompt through the API and return its id.
    pub async fn create(&self, title: &str, tags: &[&str]) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/prompts",
                Some(serde_json::json!({
                    "title": title,
                    "description": format!("{title} description"),
                    "content": format!("{title} content"),
                    "category": "text",
                    "tags": tags,
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "create {title}");
        let body = json_body(response).await;
        body["id"].as_str().expect("id").to_string()
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub fn cache_source(response: &Response<Body>) -> String {
    response
        .headers()
        .get("x-promptdeck-cache")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
