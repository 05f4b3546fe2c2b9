use edv_core::{DocumentType, FileMetadata, MetadataBatch};

/// Collects records for one submission in the order files were processed.
#[derive(Debug, Default)]
pub struct MetadataAggregator {
    records: Vec<FileMetadata>,
}

impl MetadataAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, document_url: String, document_type: DocumentType) {
        self.records.push(FileMetadata {
            document_url,
            document_type,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Call once every file of the submission has been processed.
    pub fn finalize(self) -> MetadataBatch {
        MetadataBatch::new(self.records)
    }
}
