use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnnotationError>;

#[derive(Debug, Error)]
pub enum AnnotationError {
    /// Malformed or incomplete exchange document. The load is aborted.
    #[error("format error while {context}: {message}")]
    Format {
        context: &'static str,
        message: String,
    },
    /// An edit that would break an interval or index invariant. Rejected before mutation.
    #[error("invalid edit: {message}")]
    Validation { message: String },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnnotationError {
    pub(crate) fn format(context: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Format {
            context,
            message: message.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
