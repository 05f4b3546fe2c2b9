//! Submission handlers
//!
//! Both endpoints accept the same multipart body: repeated `file` parts, each paired by
//! position with a `document_type` text field.

use crate::constants::{DOCUMENT_TYPE_FIELD, FILE_FIELD};
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use edv_core::{AppError, DocumentType, FileFailure, FileMetadata, UploadedFile};
use edv_services::SubmissionOutcome;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// JSON report of one submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub submission_id: Uuid,
    pub files: Vec<FileMetadata>,
    pub errors: Vec<FileFailure>,
    /// Base64 PNG, `null` when nothing was uploaded.
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_error: Option<String>,
}

impl From<SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self {
            submission_id: outcome.submission_id,
            files: outcome.batch.files,
            errors: outcome.failures,
            qr_code: outcome.qr_code.map(|image| STANDARD.encode(&image.png)),
            qr_code_error: outcome.qr_error.map(|e| e.to_string()),
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart body: {}", e.body_text()))
    }
}

/// Read the multipart body into labelled files, in the order they were sent.
async fn read_submission(mut multipart: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files: Vec<(String, Bytes)> = Vec::new();
    let mut labels: Vec<DocumentType> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            FILE_FIELD => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::InvalidInput("File part has no file name".into()))?;
                let data = field.bytes().await.map_err(multipart_error)?;
                files.push((file_name, data));
            }
            DOCUMENT_TYPE_FIELD => {
                let text = field.text().await.map_err(multipart_error)?;
                let label = text
                    .parse::<DocumentType>()
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?;
                labels.push(label);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    if files.len() != labels.len() {
        return Err(AppError::BadRequest(format!(
            "{} files but {} document types",
            files.len(),
            labels.len()
        )));
    }

    Ok(files
        .into_iter()
        .zip(labels)
        .map(|((name, data), document_type)| UploadedFile::new(name, data, document_type))
        .collect())
}

/// Upload every file and return the JSON report with the QR code inline.
#[tracing::instrument(skip(state, multipart))]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<SubmissionResponse>, HttpAppError> {
    let files = read_submission(multipart).await?;
    let outcome = state.submissions.submit(files).await;

    Ok(Json(outcome.into()))
}

/// Upload every file and return the QR code as a PNG download.
#[tracing::instrument(skip(state, multipart))]
pub async fn submit_qr_code(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let files = read_submission(multipart).await?;
    let outcome = state.submissions.submit(files).await;

    if outcome.batch.is_empty() {
        tracing::warn!(failed = outcome.failures.len(), "No download offered");
        let report = SubmissionResponse::from(outcome);
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(report)).into_response());
    }

    match (outcome.qr_code, outcome.qr_error) {
        (Some(image), _) => Ok((
            [
                (header::CONTENT_TYPE, image.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", image.file_name()),
                ),
            ],
            image.png,
        )
            .into_response()),
        (None, Some(e)) => Err(AppError::QrEncoding(e.to_string()).into()),
        (None, None) => Err(AppError::Internal("QR code missing for non-empty batch".into()).into()),
    }
}
