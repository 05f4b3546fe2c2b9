//! Application state shared by handlers.

use edv_services::SubmissionService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub submissions: Arc<SubmissionService>,
    pub max_submission_bytes: usize,
}

impl AppState {
    pub fn new(submissions: Arc<SubmissionService>, max_submission_bytes: usize) -> Self {
        Self {
            submissions,
            max_submission_bytes,
        }
    }
}
