pub mod error;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{get, patch},
};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/prompts",
            get(handlers::list_prompts).post(handlers::create_prompt),
        )
        .route("/api/prompts/{id}", get(handlers::get_prompt))
        .route("/api/prompts/{id}/vote", patch(handlers::vote_prompt))
        .with_state(state)
}
