//! Route configuration and setup

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router<()> {
    let body_limit = state.max_submission_bytes;

    let submission_routes = Router::new()
        .route(
            &format!("{}/submissions", API_PREFIX),
            post(handlers::submissions::submit),
        )
        .route(
            &format!("{}/submissions/qr-code", API_PREFIX),
            post(handlers::submissions::submit_qr_code),
        )
        // Multipart has its own 2 MB default; the tower-http layer enforces the real cap
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(submission_routes)
        .layer(TraceLayer::new_for_http())
}
