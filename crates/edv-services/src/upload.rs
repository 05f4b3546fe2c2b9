//! Upload orchestration
//!
//! Stores one file through [`RemoteStorage`]. An access credential can expire at any
//! point in a session, so a rejected credential gets exactly one refresh and one retry.
//! Every other failure is returned as-is, never retried.

use edv_core::UploadedFile;
use edv_storage::{CredentialRefresher, RefreshError, RemoteStorage, RemoteStoreError};
use std::sync::Arc;
use thiserror::Error;

/// Retries allowed after a rejected access credential.
pub const MAX_AUTH_RETRIES: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadFailed {
    #[error("{0}")]
    Store(#[from] RemoteStoreError),

    #[error("{0}. Please check your credentials.")]
    Refresh(#[from] RefreshError),
}

#[derive(Clone)]
pub struct UploadOrchestrator {
    storage: Arc<dyn RemoteStorage>,
    refresher: Arc<dyn CredentialRefresher>,
}

impl UploadOrchestrator {
    pub fn new(storage: Arc<dyn RemoteStorage>, refresher: Arc<dyn CredentialRefresher>) -> Self {
        Self { storage, refresher }
    }

    /// Store the file and return its direct-download link.
    #[tracing::instrument(
        skip(self, file),
        fields(file_name = %file.name, document_type = %file.document_type, size_bytes = file.size())
    )]
    pub async fn upload(&self, file: &UploadedFile) -> Result<String, UploadFailed> {
        let mut refreshes = 0;

        loop {
            match self.storage.store(file.data.clone(), &file.name).await {
                Ok(link) => return Ok(link),
                Err(RemoteStoreError::Auth(reason)) if refreshes < MAX_AUTH_RETRIES => {
                    tracing::warn!(reason = %reason, "Access token expired. Refreshing token...");
                    self.refresher.refresh().await.map_err(|e| {
                        tracing::error!(error = %e, "Token refresh failed, abandoning upload");
                        UploadFailed::Refresh(e)
                    })?;
                    refreshes += 1;
                }
                Err(e) => return Err(UploadFailed::Store(e)),
            }
        }
    }
}
