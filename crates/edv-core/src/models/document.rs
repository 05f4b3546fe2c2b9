use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Label the submitter attaches to each document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    Aadhaar,
    #[serde(rename = "PAN")]
    Pan,
    Passport,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Aadhaar,
        DocumentType::Pan,
        DocumentType::Passport,
        DocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "Aadhaar",
            DocumentType::Pan => "PAN",
            DocumentType::Passport => "Passport",
            DocumentType::Other => "Other",
        }
    }
}

impl FromStr for DocumentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aadhaar" => Ok(DocumentType::Aadhaar),
            "pan" => Ok(DocumentType::Pan),
            "passport" => Ok(DocumentType::Passport),
            "other" => Ok(DocumentType::Other),
            _ => Err(anyhow::anyhow!(
                "Invalid document type: {} (expected one of Aadhaar, PAN, Passport, Other)",
                s
            )),
        }
    }
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A file received from the submission surface. Read once by the upload, then dropped.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub data: Bytes,
    pub document_type: DocumentType,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>, document_type: DocumentType) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            document_type,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}
