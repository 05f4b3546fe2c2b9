//! Application wiring: storage stack, services, routes.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::Context;
use axum::Router;
use edv_core::Config;
use edv_services::{QrCodeEncoder, SubmissionService, UploadOrchestrator};
use edv_storage::create_storage;
use std::sync::Arc;

/// Build the router for a validated configuration.
pub fn initialize_app(config: &Config) -> anyhow::Result<Router> {
    let stack = create_storage(config).context("Failed to initialize Dropbox storage")?;

    let orchestrator = UploadOrchestrator::new(stack.storage, stack.refresher);
    let submissions = Arc::new(SubmissionService::new(
        orchestrator,
        QrCodeEncoder::default(),
    ));

    let state = Arc::new(AppState::new(submissions, config.max_submission_bytes));

    Ok(routes::setup_routes(state))
}
