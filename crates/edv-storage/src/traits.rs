//! Remote storage abstraction
//!
//! This module defines the `RemoteStorage` trait the upload orchestrator calls, and the
//! error split it relies on: a rejected access credential is distinguishable from every
//! other failure.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Remote storage operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteStoreError {
    /// The remote service rejected the current access credential.
    #[error("Access token rejected: {0}")]
    Auth(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Shared link creation failed: {0}")]
    SharedLinkFailed(String),

    #[error("Invalid remote path: {0}")]
    InvalidPath(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RemoteStoreError {
    pub fn is_auth(&self) -> bool {
        matches!(self, RemoteStoreError::Auth(_))
    }
}

/// Result type for remote storage operations
pub type RemoteStoreResult<T> = Result<T, RemoteStoreError>;

/// Remote document storage
///
/// `store` writes the bytes under the configured folder, creates a shareable link for
/// the stored file, and returns that link in direct-download form. Implementations must
/// use the credential that is current at call time.
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    async fn store(&self, data: Bytes, file_name: &str) -> RemoteStoreResult<String>;
}
