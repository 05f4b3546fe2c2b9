//! Submission validation
//!
//! Checks applied to each submitted file before any remote call is made.

use crate::constants::ACCEPTED_EXTENSIONS;
use crate::error::AppError;

const MAX_FILENAME_LENGTH: usize = 255;

/// Validate the file extension against the accepted document types.
/// Returns the lowercased extension.
pub fn validate_file_extension(filename: &str) -> Result<String, AppError> {
    let extension = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    };

    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file extension for '{}'. Allowed extensions: {}",
            filename,
            ACCEPTED_EXTENSIONS.join(", ")
        )));
    }

    Ok(extension)
}

/// Reject names that would escape the upload folder or that the remote path cannot hold.
pub fn validate_file_name(filename: &str) -> Result<(), AppError> {
    if filename.trim().is_empty() {
        return Err(AppError::InvalidInput("Filename is empty".to_string()));
    }

    if filename == "." || filename == ".." || filename.contains(['/', '\\']) {
        return Err(AppError::InvalidInput(format!(
            "Filename '{}' contains a path separator or traversal",
            filename
        )));
    }

    if filename.chars().count() > MAX_FILENAME_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Filename exceeds {} characters",
            MAX_FILENAME_LENGTH
        )));
    }

    Ok(())
}

/// Full per-file check used by the submission pipeline.
pub fn validate_submission_file(filename: &str) -> Result<(), AppError> {
    validate_file_name(filename)?;
    validate_file_extension(filename)?;
    Ok(())
}
