//! Helpers shared by the `edv` command line.

use anyhow::{anyhow, Context};
use edv_core::{DocumentType, FileFailure, FileMetadata, UploadedFile};
use edv_services::{QrCodeImage, SubmissionOutcome};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

/// A `--doc LABEL=PATH` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocArg {
    pub document_type: DocumentType,
    pub path: PathBuf,
}

impl FromStr for DocArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, path) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected LABEL=PATH, got '{}'", s))?;
        if path.is_empty() {
            return Err(anyhow!("Missing path for '{}'", label));
        }

        Ok(Self {
            document_type: label.parse()?,
            path: PathBuf::from(path),
        })
    }
}

/// Read a document from disk. The remote file name is the local base name.
pub async fn load_document(doc: &DocArg) -> anyhow::Result<UploadedFile> {
    let name = doc
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Not a file path: {}", doc.path.display()))?
        .to_string();

    let data = tokio::fs::read(&doc.path)
        .await
        .with_context(|| format!("Failed to read {}", doc.path.display()))?;

    Ok(UploadedFile::new(name, data, doc.document_type))
}

/// Read every document. An unreadable path becomes a failure for that document only.
pub async fn load_documents(docs: &[DocArg]) -> (Vec<UploadedFile>, Vec<FileFailure>) {
    let mut files = Vec::with_capacity(docs.len());
    let mut failures = Vec::new();

    for doc in docs {
        match load_document(doc).await {
            Ok(file) => files.push(file),
            Err(e) => {
                tracing::error!(path = %doc.path.display(), error = %e, "Skipping unreadable document");
                failures.push(FileFailure {
                    file_name: doc.path.display().to_string(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    (files, failures)
}

pub async fn write_qr_code(path: &Path, image: &QrCodeImage) -> anyhow::Result<()> {
    tokio::fs::write(path, &image.png)
        .await
        .with_context(|| format!("Failed to write QR code to {}", path.display()))
}

/// What `edv upload` prints.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub submission_id: Uuid,
    pub files: Vec<FileMetadata>,
    pub errors: Vec<FileFailure>,
    pub qr_code_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_error: Option<String>,
}

impl UploadReport {
    pub fn new(outcome: &SubmissionOutcome, qr_code_path: Option<PathBuf>) -> Self {
        Self {
            submission_id: outcome.submission_id,
            files: outcome.batch.files.clone(),
            errors: outcome.failures.clone(),
            qr_code_path,
            qr_code_error: outcome.qr_error.as_ref().map(|e| e.to_string()),
        }
    }
}

/// Initialize tracing for the CLI. Logs go to stderr; stdout carries the JSON report.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
