//! EDV API Library
//!
//! HTTP surface over the submission pipeline: multipart document upload, JSON report,
//! and QR code download.

pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use handlers::submissions::SubmissionResponse;
