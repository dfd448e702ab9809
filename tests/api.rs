mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{FakeRemote, build_app, cache_source, json_body};

#[tokio::test]
async fn created_prompt_is_listed_newest_first_and_fetchable() {
    let app = build_app(None).await;
    let first = app.create("First", &["a"]).await;
    let second = app.create("Second", &["b"]).await;

    let response = app.send(Method::GET, "/api/prompts", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = json_body(response).await;
    let ids: Vec<&str> = listing
        .as_array()
        .expect("array")
        .iter()
        .map(|prompt| prompt["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, [second.as_str(), first.as_str()]);
    assert_eq!(listing[0]["votes"], json!(0));
    assert_eq!(listing[0]["author"], json!("Anonymous"));
    assert_eq!(listing[0]["tags"], json!(["b"]));

    let response = app
        .send(Method::GET, &format!("/api/prompts/{first}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let prompt = json_body(response).await;
    assert_eq!(prompt["title"], json!("First"));
    assert!(prompt["createdAt"].is_string());
}

#[tokio::test]
async fn create_reports_the_first_missing_field() {
    let app = build_app(None).await;

    let response = app
        .send(
            Method::POST,
            "/api/prompts",
            Some(json!({ "title": "T", "description": "D", "content": "C" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "At least one tag is required" })
    );

    let response = app
        .send(
            Method::POST,
            "/api/prompts",
            Some(json!({ "title": "  ", "tags": ["a"] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Title is required" })
    );

    assert_eq!(app.store.list_calls(), 0);
}

#[tokio::test]
async fn loosely_typed_fields_get_field_specific_messages() {
    let app = build_app(None).await;

    let response = app
        .send(
            Method::POST,
            "/api/prompts",
            Some(json!({ "title": "T", "description": "D", "content": "C", "tags": "a" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "At least one tag is required" })
    );

    let response = app
        .send(
            Method::POST,
            "/api/prompts",
            Some(json!({ "title": "", "tags": "a" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Title is required" })
    );

    let response = app
        .send(
            Method::POST,
            "/api/prompts",
            Some(json!({
                "title": "T",
                "description": "D",
                "content": "C",
                "tags": ["a"],
                "category": "",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["category"], json!("text"));
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let app = build_app(None).await;

    let response = app
        .send_raw(Method::POST, "/api/prompts", "{not json")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Invalid request body" })
    );

    let response = app
        .send(
            Method::POST,
            "/api/prompts",
            Some(json!({ "title": "T", "description": "D", "content": "C", "tags": ["a"], "category": "music" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_prompts_are_not_found() {
    let app = build_app(None).await;

    let response = app
        .send(
            Method::GET,
            "/api/prompts/7d1d6b4e-4f8a-4c61-9d55-1f3a4c7a9b10",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Prompt not found" })
    );

    let response = app.send(Method::GET, "/api/prompts/not-an-id", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(
            Method::PATCH,
            "/api/prompts/7d1d6b4e-4f8a-4c61-9d55-1f3a4c7a9b10/vote",
            Some(json!({ "delta": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn votes_accumulate_without_server_side_ledger() {
    let app = build_app(None).await;
    let id = app.create("Votable", &["a"]).await;
    let uri = format!("/api/prompts/{id}/vote");

    for _ in 0..2 {
        let response = app
            .send(Method::PATCH, &uri, Some(json!({ "delta": 1 })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app
        .send(Method::PATCH, &uri, Some(json!({ "delta": -1 })))
        .await;
    assert_eq!(json_body(response).await["votes"], json!(1));
    assert_eq!(app.store.votes_of(&id), Some(1));
}

#[tokio::test]
async fn out_of_range_deltas_leave_the_count_unchanged() {
    let app = build_app(None).await;
    let id = app.create("Votable", &["a"]).await;
    let uri = format!("/api/prompts/{id}/vote");

    for delta in [json!(0), json!(2), json!(-5), json!("1"), json!(null)] {
        let response = app
            .send(Method::PATCH, &uri, Some(json!({ "delta": delta })))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "delta {delta}");
        assert_eq!(
            json_body(response).await,
            json!({ "error": "delta must be 1 or -1" })
        );
    }
    let response = app.send(Method::PATCH, &uri, Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The delta is validated before the id is looked up.
    let response = app
        .send(
            Method::PATCH,
            "/api/prompts/not-an-id/vote",
            Some(json!({ "delta": 3 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.store.votes_of(&id), Some(0));
}

#[tokio::test]
async fn tag_filter_matches_any_requested_tag() {
    let app = build_app(None).await;
    app.create("Only A", &["a"]).await;
    app.create("Only B", &["b"]).await;
    app.create("Both", &["a", "b"]).await;

    let titles = |listing: serde_json::Value| -> Vec<String> {
        listing
            .as_array()
            .expect("array")
            .iter()
            .map(|prompt| prompt["title"].as_str().expect("title").to_string())
            .collect()
    };

    let response = app.send(Method::GET, "/api/prompts?tags=a", None).await;
    assert_eq!(titles(json_body(response).await), ["Both", "Only A"]);

    let response = app.send(Method::GET, "/api/prompts?tags=a,b", None).await;
    assert_eq!(titles(json_body(response).await).len(), 3);

    let response = app
        .send(Method::GET, "/api/prompts?search=ONLY%20b", None)
        .await;
    assert_eq!(titles(json_body(response).await), ["Only B"]);

    let response = app
        .send(Method::GET, "/api/prompts?search=&tags=", None)
        .await;
    assert_eq!(titles(json_body(response).await).len(), 3);
}

#[tokio::test]
async fn unfiltered_listing_is_served_from_the_remote_tier() {
    let remote = Arc::new(FakeRemote::default());
    let app = build_app(Some(remote.clone())).await;
    app.create("Cached", &["a"]).await;

    let response = app.send(Method::GET, "/api/prompts", None).await;
    assert_eq!(cache_source(&response), "store");
    let first = json_body(response).await;

    let response = app.send(Method::GET, "/api/prompts", None).await;
    assert_eq!(cache_source(&response), "remote");
    assert_eq!(json_body(response).await, first);
    assert_eq!(app.store.list_calls(), 1);

    // Filtered requests bypass the cache entirely.
    let response = app.send(Method::GET, "/api/prompts?tags=a", None).await;
    assert_eq!(cache_source(&response), "store");
    assert_eq!(app.store.list_calls(), 2);
}

#[tokio::test]
async fn mutations_are_visible_on_the_next_listing() {
    let remote = Arc::new(FakeRemote::default());
    let app = build_app(Some(remote.clone())).await;
    let id = app.create("Fresh", &["a"]).await;

    app.send(Method::GET, "/api/prompts", None).await;
    assert!(!remote.is_empty());

    app.send(
        Method::PATCH,
        &format!("/api/prompts/{id}/vote"),
        Some(json!({ "delta": 1 })),
    )
    .await;
    assert!(remote.is_empty());

    let response = app.send(Method::GET, "/api/prompts", None).await;
    assert_eq!(cache_source(&response), "store");
    assert_eq!(json_body(response).await[0]["votes"], json!(1));

    app.create("Newer", &["b"]).await;
    let response = app.send(Method::GET, "/api/prompts", None).await;
    assert_eq!(json_body(response).await[0]["title"], json!("Newer"));
}

#[tokio::test]
async fn local_tier_serves_without_a_remote() {
    let app = build_app(None).await;
    app.create("Local", &["a"]).await;

    let response = app.send(Method::GET, "/api/prompts", None).await;
    assert_eq!(cache_source(&response), "store");
    let response = app.send(Method::GET, "/api/prompts", None).await;
    assert_eq!(cache_source(&response), "local");
    assert_eq!(app.store.list_calls(), 1);
}

#[tokio::test]
async fn remote_outage_is_never_surfaced() {
    let remote = Arc::new(FakeRemote::default());
    let app = build_app(Some(remote.clone())).await;
    app.create("Survivor", &["a"]).await;
    assert!(app.cache.remote_available());

    remote.fail(true);
    let response = app.send(Method::GET, "/api/prompts", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await.as_array().map(Vec::len), Some(1));

    let response = app.send(Method::GET, "/api/health", None).await;
    assert_eq!(
        json_body(response).await,
        json!({ "status": "ok", "redis": false })
    );

    // Writes still succeed while the remote is down.
    let response = app
        .send(
            Method::POST,
            "/api/prompts",
            Some(json!({ "title": "T", "description": "D", "content": "C", "tags": ["x"] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn store_failures_return_a_generic_error() {
    let app = build_app(None).await;
    app.store.fail(true);

    let response = app.send(Method::GET, "/api/prompts", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Server error" }));

    let response = app
        .send(
            Method::POST,
            "/api/prompts",
            Some(json!({ "title": "T", "description": "D", "content": "C", "tags": ["x"] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Server error" }));
}

#[tokio::test]
async fn health_reports_remote_availability() {
    let app = build_app(Some(Arc::new(FakeRemote::default()))).await;
    let response = app.send(Method::GET, "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "status": "ok", "redis": true })
    );

    let app = build_app(None).await;
    let response = app.send(Method::GET, "/api/health", None).await;
    assert_eq!(
        json_body(response).await,
        json!({ "status": "ok", "redis": false })
    );
}
