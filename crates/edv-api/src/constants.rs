//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api/v0";

/// Multipart field carrying a document.
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the label of the preceding document.
pub const DOCUMENT_TYPE_FIELD: &str = "document_type";
