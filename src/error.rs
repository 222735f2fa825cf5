//! Error types for dataset preparation

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for dataset preparation operations
pub type Result<T> = std::result::Result<T, PrepareError>;

/// Error types raised while acquiring, extracting, and exporting the dataset
#[derive(Error, Debug)]
pub enum PrepareError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image archive missing after the acquisition phase
    #[error("Missing zip file: {}. Ensure repo has LFS files (git lfs pull) or provide correct --flickr-root.", .path.display())]
    MissingArchive { path: PathBuf },

    /// Annotations table missing after the acquisition phase
    #[error("Missing annotations csv: {}", .path.display())]
    MissingAnnotations { path: PathBuf },

    /// Remote clone could not be started or exited unsuccessfully
    #[error("Failed to fetch dataset from {remote}: {reason}")]
    Fetch { remote: String, reason: String },

    /// Archive could not be read or unpacked
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Zip container errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Annotations table decode errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Annotations table lacks a required column
    #[error("Annotations table {} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// Raw caption list did not parse as a list of string literals
    #[error("Malformed caption list on line {line}: {message}")]
    CaptionSyntax { line: u64, message: String },

    /// Metadata serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory walk errors during image lookup
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PrepareError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new extraction error
    pub fn extraction<S: Into<String>>(msg: S) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a fetch error for the given remote
    pub fn fetch<R: Into<String>, S: Into<String>>(remote: R, reason: S) -> Self {
        Self::Fetch {
            remote: remote.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_archive<P: AsRef<Path>>(path: P) -> Self {
        Self::MissingArchive {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn missing_annotations<P: AsRef<Path>>(path: P) -> Self {
        Self::MissingAnnotations {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a caption syntax error for a table line
    pub fn caption_syntax<S: Into<String>>(line: u64, message: S) -> Self {
        Self::CaptionSyntax {
            line,
            message: message.into(),
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            error.kind(),
            format!(
                "Failed to {} '{}': {}",
                operation,
                path.as_ref().display(),
                error
            ),
        ))
    }

    /// Whether this error came from the caption parser
    #[must_use]
    pub fn is_caption_error(&self) -> bool {
        matches!(self, Self::CaptionSyntax { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_archive_names_path() {
        let err = PrepareError::missing_archive("/data/flickr30k/flickr30k-images.zip");
        let msg = err.to_string();
        assert!(msg.contains("/data/flickr30k/flickr30k-images.zip"));
        assert!(msg.contains("git lfs pull"));
    }

    #[test]
    fn test_file_io_error_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PrepareError::file_io_error("copy image", "/tmp/a.jpg", &io);
        match err {
            PrepareError::Io(inner) => {
                assert_eq!(inner.kind(), std::io::ErrorKind::PermissionDenied);
                assert!(inner.to_string().contains("copy image"));
                assert!(inner.to_string().contains("/tmp/a.jpg"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_caption_error_predicate() {
        assert!(PrepareError::caption_syntax(3, "unterminated string").is_caption_error());
        assert!(!PrepareError::invalid_config("x").is_caption_error());
    }
}
