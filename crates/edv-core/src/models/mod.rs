//! Domain models

pub mod credentials;
pub mod document;
pub mod metadata;

pub use credentials::Credentials;
pub use document::{DocumentType, UploadedFile};
pub use metadata::{FileFailure, FileMetadata, MetadataBatch};
