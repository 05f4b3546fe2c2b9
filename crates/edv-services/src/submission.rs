//! One submission, end to end
//!
//! Files are validated and uploaded strictly in sequence. A failing file is reported and
//! skipped; it never aborts the rest of the batch. The QR code is rendered only when at
//! least one upload succeeded.

use crate::metadata::MetadataAggregator;
use crate::qr::{EncodeError, QrCodeEncoder, QrCodeImage};
use crate::upload::UploadOrchestrator;
use edv_core::validation::validate_submission_file;
use edv_core::{FileFailure, MetadataBatch, UploadedFile};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug)]
pub struct SubmissionOutcome {
    pub submission_id: Uuid,
    pub batch: MetadataBatch,
    pub failures: Vec<FileFailure>,
    /// `None` when no upload succeeded or rendering failed.
    pub qr_code: Option<QrCodeImage>,
    pub qr_error: Option<EncodeError>,
}

impl SubmissionOutcome {
    pub fn succeeded(&self) -> usize {
        self.batch.len()
    }

    pub fn has_download(&self) -> bool {
        self.qr_code.is_some()
    }
}

pub struct SubmissionService {
    orchestrator: UploadOrchestrator,
    encoder: QrCodeEncoder,
    // The credential store is shared; one submission at a time keeps refreshes ordered.
    in_flight: Mutex<()>,
}

impl SubmissionService {
    pub fn new(orchestrator: UploadOrchestrator, encoder: QrCodeEncoder) -> Self {
        Self {
            orchestrator,
            encoder,
            in_flight: Mutex::new(()),
        }
    }

    #[tracing::instrument(
        skip_all,
        fields(submission_id = tracing::field::Empty, files = files.len())
    )]
    pub async fn submit(&self, files: Vec<UploadedFile>) -> SubmissionOutcome {
        let _guard = self.in_flight.lock().await;

        let submission_id = Uuid::new_v4();
        tracing::Span::current().record("submission_id", tracing::field::display(submission_id));

        let mut aggregator = MetadataAggregator::new();
        let mut failures = Vec::new();

        for file in files {
            if let Err(e) = validate_submission_file(&file.name) {
                tracing::debug!(file_name = %file.name, error = %e, "Rejected submitted file");
                failures.push(FileFailure {
                    file_name: file.name,
                    error: e.to_string(),
                });
                continue;
            }

            match self.orchestrator.upload(&file).await {
                Ok(link) => aggregator.record(link, file.document_type),
                Err(e) => {
                    tracing::error!(file_name = %file.name, error = %e, "Upload failed");
                    failures.push(FileFailure {
                        file_name: file.name,
                        error: e.to_string(),
                    });
                }
            }
        }

        let batch = aggregator.finalize();

        let (qr_code, qr_error) = if batch.is_empty() {
            (None, None)
        } else {
            match self.encoder.encode(&batch) {
                Ok(image) => (Some(image), None),
                Err(e) => {
                    tracing::error!(error = %e, "QR code rendering failed");
                    (None, Some(e))
                }
            }
        };

        tracing::info!(
            succeeded = batch.len(),
            failed = failures.len(),
            qr_code = qr_code.is_some(),
            "Submission processed"
        );

        SubmissionOutcome {
            submission_id,
            batch,
            failures,
            qr_code,
            qr_error,
        }
    }
}
