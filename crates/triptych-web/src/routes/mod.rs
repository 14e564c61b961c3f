//! HTTP routes for the FAQ service.

mod api;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Service info
        .route("/", get(api::root))
        .route("/health", get(api::health))
        // Pipeline
        .route("/query", post(api::answer_query))
        .route(
            "/documents",
            post(api::add_documents).delete(api::clear_documents),
        )
        .route("/status", get(api::get_status))
        // CORS for browser clients
        .layer(CorsLayer::permissive())
        .with_state(state)
}
