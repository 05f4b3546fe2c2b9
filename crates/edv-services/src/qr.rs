//! QR code rendering of a metadata batch
//!
//! The batch is serialized to compact JSON (`{"files":[...]}`) and rendered as a
//! black-on-white PNG. The QR version is the smallest that fits the payload at the
//! configured error-correction level; the quiet zone is the standard 4 modules.
//! Rendering is deterministic: equal batches produce byte-identical PNGs.

use bytes::Bytes;
use edv_core::constants::{QR_CODE_CONTENT_TYPE, QR_CODE_FILE_NAME};
use edv_core::MetadataBatch;
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;
use thiserror::Error;

/// Pixel size of one QR module.
pub const DEFAULT_MODULE_SIZE: u32 = 10;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("No metadata to encode")]
    EmptyBatch,

    #[error("Failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Metadata does not fit in a QR code: {0}")]
    Qr(String),

    #[error("Failed to write PNG: {0}")]
    Png(String),
}

/// Rendered QR code, ready to display or download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCodeImage {
    pub png: Bytes,
    pub width: u32,
    pub height: u32,
}

impl QrCodeImage {
    pub fn file_name(&self) -> &'static str {
        QR_CODE_FILE_NAME
    }

    pub fn content_type(&self) -> &'static str {
        QR_CODE_CONTENT_TYPE
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QrCodeEncoder {
    module_size: u32,
    ec_level: EcLevel,
}

impl Default for QrCodeEncoder {
    fn default() -> Self {
        Self {
            module_size: DEFAULT_MODULE_SIZE,
            ec_level: EcLevel::M,
        }
    }
}

impl QrCodeEncoder {
    pub fn new(module_size: u32, ec_level: EcLevel) -> Self {
        Self {
            module_size: module_size.max(1),
            ec_level,
        }
    }

    /// Canonical text form of the batch.
    pub fn payload(batch: &MetadataBatch) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(batch)?)
    }

    pub fn encode(&self, batch: &MetadataBatch) -> Result<QrCodeImage, EncodeError> {
        if batch.is_empty() {
            return Err(EncodeError::EmptyBatch);
        }

        let payload = Self::payload(batch)?;
        let code = QrCode::with_error_correction_level(payload.as_bytes(), self.ec_level)
            .map_err(|e| EncodeError::Qr(e.to_string()))?;

        let image = code
            .render::<Luma<u8>>()
            .dark_color(Luma([0u8]))
            .light_color(Luma([255u8]))
            .quiet_zone(true)
            .module_dimensions(self.module_size, self.module_size)
            .build();

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| EncodeError::Png(e.to_string()))?;

        tracing::debug!(
            records = batch.len(),
            payload_bytes = payload.len(),
            qr_version = ?code.version(),
            width = image.width(),
            png_bytes = png.len(),
            "Rendered metadata QR code"
        );

        Ok(QrCodeImage {
            png: Bytes::from(png),
            width: image.width(),
            height: image.height(),
        })
    }
}
