use std::time::Duration;

use async_trait::async_trait;
use promptdeck_api_types::{
    CreatePromptRequest, ErrorBody, HealthResponse, ListingFilter, Prompt, VoteDirection,
    VoteRequest,
};
use reqwest::{Client, Method, Response, Url};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:4000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What [`crate::PromptFeed`] needs from the API. [`ApiClient`] is the real
/// implementation; tests substitute their own.
#[async_trait]
pub trait PromptSource: Send + Sync {
    async fn list_prompts(&self, filter: &ListingFilter) -> Result<Vec<Prompt>, ClientError>;

    async fn vote(&self, id: &str, direction: VoteDirection) -> Result<Prompt, ClientError>;
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)?.join("/")?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("promptdeck-cli/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<Prompt>, ClientError> {
        let query = filter.query_pairs();
        self.request(Method::GET, "api/prompts", &query, None::<&()>)
            .await
    }

    pub async fn get_prompt(&self, id: &str) -> Result<Prompt, ClientError> {
        let path = prompt_path(id, "")?;
        self.request(Method::GET, &path, &[], None::<&()>).await
    }

    pub async fn create_prompt(&self, request: &CreatePromptRequest) -> Result<Prompt, ClientError> {
        self.request(Method::POST, "api/prompts", &[], Some(request))
            .await
    }

    pub async fn vote_prompt(
        &self,
        id: &str,
        direction: VoteDirection,
    ) -> Result<Prompt, ClientError> {
        let path = prompt_path(id, "/vote")?;
        let body = VoteRequest::from(direction);
        self.request(Method::PATCH, &path, &[], Some(&body)).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.request(Method::GET, "api/health", &[], None::<&()>)
            .await
    }

    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut url = self.base.join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::handle(response).await
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
    }
}

#[async_trait]
impl PromptSource for ApiClient {
    async fn list_prompts(&self, filter: &ListingFilter) -> Result<Vec<Prompt>, ClientError> {
        self.list(filter).await
    }

    async fn vote(&self, id: &str, direction: VoteDirection) -> Result<Prompt, ClientError> {
        self.vote_prompt(id, direction).await
    }
}

fn prompt_path(id: &str, suffix: &str) -> Result<String, ClientError> {
    let id = id.trim();
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(ClientError::InvalidInput(format!("invalid prompt id `{id}`")));
    }
    Ok(format!("api/prompts/{id}{suffix}"))
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.base_url(), DEFAULT_TIMEOUT).expect("client")
    }

    fn prompt_json(id: &str, votes: i64) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Title",
            "description": "Description",
            "content": "Content",
            "category": "text",
            "tags": ["a"],
            "votes": votes,
            "author": "Anonymous",
            "createdAt": "2024-05-01T09:00:00Z"
        })
    }

    #[tokio::test]
    async fn list_sends_search_and_tags() -> Result<(), ClientError> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/api/prompts")
                .query_param("search", "react")
                .query_param("tags", "code,web");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([prompt_json("p1", 3)]));
        });

        let filter = ListingFilter::new(Some("react"), ["code", "web"]);
        let prompts = client(&server).list(&filter).await?;

        mock.assert();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].votes, 3);
        Ok(())
    }

    #[tokio::test]
    async fn health_reads_api_health() -> Result<(), ClientError> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET").path("/api/health");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "status": "ok", "redis": false }));
        });

        let health = client(&server).health().await?;

        mock.assert();
        assert_eq!(health.status, "ok");
        assert!(!health.redis);
        Ok(())
    }

    #[tokio::test]
    async fn vote_patches_delta() -> Result<(), ClientError> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("PATCH")
                .path("/api/prompts/p1/vote")
                .json_body(json!({ "delta": -1 }));
            then.status(200).json_body(prompt_json("p1", 4));
        });

        let prompt = client(&server)
            .vote_prompt("p1", VoteDirection::Down)
            .await?;

        mock.assert();
        assert_eq!(prompt.votes, 4);
        Ok(())
    }

    #[tokio::test]
    async fn error_body_becomes_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/api/prompts/missing");
            then.status(404).json_body(json!({ "error": "Prompt not found" }));
        });

        let err = client(&server)
            .get_prompt("missing")
            .await
            .expect_err("404 should fail");
        assert!(err.is_not_found());
        match err {
            ClientError::Status { message, .. } => assert_eq!(message, "Prompt not found"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn prompt_path_rejects_path_segments() {
        assert!(prompt_path("a/b", "").is_err());
        assert!(prompt_path("  ", "").is_err());
        assert_eq!(prompt_path("abc", "/vote").expect("path"), "api/prompts/abc/vote");
    }
}
