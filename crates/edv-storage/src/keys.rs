//! Shared remote path generation.
//!
//! Path format: `{folder}/{file_name}`, e.g. `/EDV/aadhaar.pdf`.

use crate::traits::RemoteStoreError;

/// Build the remote path for a file, rejecting names that would leave the folder.
pub fn remote_path(folder: &str, file_name: &str) -> Result<String, RemoteStoreError> {
    edv_core::validation::validate_file_name(file_name)
        .map_err(|e| RemoteStoreError::InvalidPath(e.to_string()))?;

    Ok(format!("{}/{}", folder.trim_end_matches('/'), file_name))
}
