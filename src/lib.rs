pub mod agent;
pub mod config;
pub mod error;
pub mod gemini;
pub mod media;
pub mod poll;
pub mod prompt;
pub mod routes;
pub mod search;
pub mod staging;
pub mod ui;
pub mod workflow;

use crate::workflow::Workflow;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
    /// Cancelled on shutdown; each request polls under a child token.
    pub shutdown: CancellationToken,
    pub max_upload_bytes: usize,
}

pub fn create_app(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(ui::index))
        .route("/health", get(routes::health))
        .route("/api/video", post(routes::analyze_video))
        .route("/api/image", post(routes::analyze_image))
        .route("/api/text", post(routes::summarize_text))
        .layer(DefaultBodyLimit::max(limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
