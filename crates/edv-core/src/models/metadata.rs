use serde::{Deserialize, Serialize};

use super::DocumentType;

/// Link and label for one successfully stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub document_url: String,
    pub document_type: DocumentType,
}

/// Ordered records of one submission. Serializes as `{"files":[...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataBatch {
    pub files: Vec<FileMetadata>,
}

impl MetadataBatch {
    pub fn new(files: Vec<FileMetadata>) -> Self {
        Self { files }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// User-visible failure for a file that contributed no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file_name: String,
    pub error: String,
}
