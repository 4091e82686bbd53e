// kpathsea-core/src/errors.rs
use crate::format::FileFormat;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while looking up a file with kpsewhich.
///
/// Every variant keeps the query that failed so callers can report it without
/// re-running the lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The file name was empty. No process was spawned.
    #[error("Invalid argument: a file name must be provided (format '{format}')")]
    InvalidArgument { format: FileFormat },

    /// kpsewhich exited successfully but printed nothing.
    #[error("File '{file_name}' not found for format '{format}'")]
    NotFound {
        file_name: String,
        format: FileFormat,
    },

    /// kpsewhich exited with a non-zero status, could not be spawned, or failed
    /// while running. `status` is `None` when no exit status was observed.
    #[error("Error finding '{file_name}' (format '{format}'): {message}")]
    ExecutionFailure {
        file_name: String,
        format: FileFormat,
        message: String,
        status: Option<i32>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The configured timeout elapsed; the child was killed.
    #[error("Error finding '{file_name}' (format '{format}'): timed out after {timeout:?}")]
    TimedOut {
        file_name: String,
        format: FileFormat,
        timeout: Duration,
    },
}

impl LookupError {
    /// The file name of the failed query, if one was given.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            LookupError::InvalidArgument { .. } => None,
            LookupError::NotFound { file_name, .. }
            | LookupError::ExecutionFailure { file_name, .. }
            | LookupError::TimedOut { file_name, .. } => Some(file_name),
        }
    }

    pub fn format(&self) -> FileFormat {
        match self {
            LookupError::InvalidArgument { format }
            | LookupError::NotFound { format, .. }
            | LookupError::ExecutionFailure { format, .. }
            | LookupError::TimedOut { format, .. } => *format,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }
}
