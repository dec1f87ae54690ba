//! neurostudy-server
//!
//! HTTP surface of the NeuroStudy relay: chat streaming, the single-shot
//! chat fallback, and study material generation.

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health (no body)
        .route("/health", get(routes::health::health_check))
        // Chat relay
        .route("/api/chat", post(routes::chat::chat))
        .route("/api/chat-simple", post(routes::chat::chat_simple))
        // Study material generation
        .route(
            "/api/generate-flashcards",
            post(routes::study::generate_flashcards),
        )
        .route("/api/generate-quiz", post(routes::study::generate_quiz))
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
