//! EDV Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared across all EDV components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, ConfigError, UploadMode};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    Credentials, DocumentType, FileFailure, FileMetadata, MetadataBatch, UploadedFile,
};
