//! Shared validation utilities
//!
//! Upload validation runs before any byte reaches storage; it is pure and has
//! no side effects.

use std::path::Path;
use thiserror::Error;

/// Extensions accepted for uploaded assets.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

/// Errors that can occur during file type validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileTypeError {
    #[error("The file {filename} is not a PDF")]
    NotAllowed { filename: String },
}

/// Validate an uploaded file's declared filename against the extension
/// allow-list.
///
/// The comparison is case-insensitive; a missing extension is a rejection.
pub fn validate_file_type(filename: &str) -> Result<(), FileTypeError> {
    let allowed = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);

    if !allowed {
        return Err(FileTypeError::NotAllowed {
            filename: filename.to_string(),
        });
    }

    Ok(())
}
