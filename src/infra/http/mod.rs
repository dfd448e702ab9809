//! HTTP surface: the JSON API plus response logging.

pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    middleware as axum_middleware,
};
use tower_http::cors::{Any, CorsLayer};

use self::middleware::log_responses;

/// The full application router. Any origin may call the API; the browser
/// client is served from elsewhere.
pub fn build_router(state: ApiState) -> Router {
    build_api_router(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([CONTENT_TYPE])
}
