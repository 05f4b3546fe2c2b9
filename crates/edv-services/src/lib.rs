//! EDV Services Library
//!
//! The submission pipeline: per-file upload with a single credential refresh on auth
//! failure, metadata aggregation in submission order, and QR code rendering of the
//! resulting batch.

pub mod metadata;
pub mod qr;
pub mod submission;
pub mod upload;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used types
pub use metadata::MetadataAggregator;
pub use qr::{EncodeError, QrCodeEncoder, QrCodeImage};
pub use submission::{SubmissionOutcome, SubmissionService};
pub use upload::{UploadFailed, UploadOrchestrator, MAX_AUTH_RETRIES};

pub use edv_storage::{CredentialRefresher, RemoteStorage};
