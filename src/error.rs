//! Custom error types for pbup
//!
//! Every failure aborts the current operation. Variants carry enough context
//! (offending path, expected vs actual identifier or version) for the
//! operator to diagnose the cause from the message alone.

use std::path::Path;

use thiserror::Error;

/// The main error type for pbup operations
#[derive(Error, Debug)]
pub enum PbupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Bad archive name, target outside the allow-list, project id mismatch
    #[error("Validation error: {0}")]
    Validation(String),

    /// Destination path collision
    #[error("{kind} already exists: {path}")]
    AlreadyExists { kind: &'static str, path: String },

    /// Expected store, workdir or target missing
    #[error("{kind} not found: {path}")]
    NotFound { kind: &'static str, path: String },

    /// Update attempted with an archive that is not strictly newer
    #[error("Stale bundle: archive version {archive} is not newer than store version {current}")]
    StaleBundle { archive: String, current: String },

    /// Listing snapshots or revisions failed
    #[error("Store query error: {0}")]
    StoreQuery(String),

    /// External tool exited unsuccessfully or could not be spawned
    #[error("Command `{command}` failed ({status}){}", format_stderr(.stderr))]
    Subprocess {
        command: String,
        status: String,
        stderr: String,
    },
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl PbupError {
    /// The project's backup store is missing
    pub fn store_not_found(path: &Path) -> Self {
        Self::NotFound {
            kind: "Backup store",
            path: path.display().to_string(),
        }
    }

    /// The project's backup store already exists
    pub fn store_exists(path: &Path) -> Self {
        Self::AlreadyExists {
            kind: "Backup store",
            path: path.display().to_string(),
        }
    }

    /// A bundle archive with the same name is already present
    pub fn archive_exists(path: &Path) -> Self {
        Self::AlreadyExists {
            kind: "Archive",
            path: path.display().to_string(),
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an "already exists" error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a stale bundle rejection
    pub fn is_stale_bundle(&self) -> bool {
        matches!(self, Self::StaleBundle { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for PbupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PbupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for pbup operations
pub type PbupResult<T> = Result<T, PbupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PbupError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = PbupError::store_not_found(Path::new("/work/alpha/.bup"));
        assert_eq!(err.to_string(), "Backup store not found: /work/alpha/.bup");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_stale_bundle_error() {
        let err = PbupError::StaleBundle {
            archive: "2023-01-01-000000".into(),
            current: "2024-01-01-000000".into(),
        };
        assert_eq!(
            err.to_string(),
            "Stale bundle: archive version 2023-01-01-000000 is not newer than store version 2024-01-01-000000"
        );
        assert!(err.is_stale_bundle());
    }

    #[test]
    fn test_subprocess_error_includes_stderr() {
        let err = PbupError::Subprocess {
            command: "bup init".into(),
            status: "exit status: 1".into(),
            stderr: "error: already exists\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "Command `bup init` failed (exit status: 1): error: already exists"
        );

        let quiet = PbupError::Subprocess {
            command: "du -sh".into(),
            status: "exit status: 2".into(),
            stderr: String::new(),
        };
        assert_eq!(quiet.to_string(), "Command `du -sh` failed (exit status: 2)");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PbupError = io_err.into();
        assert!(matches!(err, PbupError::Io(_)));
    }
}
