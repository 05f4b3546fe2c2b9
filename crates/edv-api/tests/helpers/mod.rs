//! Test helpers: build the router over in-memory storage fakes.
//!
//! Run from workspace root: `cargo test -p edv-api`.

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use edv_api::constants;
use edv_api::setup::routes;
use edv_api::state::AppState;
use edv_services::test_helpers::{FakeRefresher, FakeStorage};
use edv_services::{QrCodeEncoder, SubmissionService, UploadOrchestrator};
use std::sync::Arc;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<FakeStorage>,
    pub refresher: Arc<FakeRefresher>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(FakeStorage::new(), FakeRefresher::new(), 1024 * 1024)
}

pub fn setup_test_app_with(
    storage: FakeStorage,
    refresher: FakeRefresher,
    max_submission_bytes: usize,
) -> TestApp {
    let storage = Arc::new(storage);
    let refresher = Arc::new(refresher);

    let submissions = Arc::new(SubmissionService::new(
        UploadOrchestrator::new(storage.clone(), refresher.clone()),
        QrCodeEncoder::default(),
    ));
    let state = Arc::new(AppState::new(submissions, max_submission_bytes));

    let app = routes::setup_routes(state);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        refresher,
    }
}

/// Multipart body with one `file` and one `document_type` part per document.
pub fn submission_form(documents: &[(&str, &str)]) -> MultipartForm {
    documents
        .iter()
        .fold(MultipartForm::new(), |form, (file_name, label)| {
            let part = Part::bytes(bytes::Bytes::from(format!("contents of {}", file_name)))
                .file_name(file_name.to_string())
                .mime_type("application/octet-stream");
            form.add_part("file", part)
                .add_text("document_type", label.to_string())
        })
}

/// Decode a PNG QR code back into its text payload.
pub fn decode_qr(png: &[u8]) -> String {
    let img = image::load_from_memory(png)
        .expect("Invalid PNG")
        .to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare(img);
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "Expected exactly one QR code");
    let (_meta, content) = grids[0].decode().expect("Failed to decode QR code");
    content
}
