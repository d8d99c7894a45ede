//! Application-level errors (wraps domain errors with file context)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors add file and lookup context to domain failures.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("missing key '{key}' in {path}")]
    MissingKey { path: PathBuf, key: String },

    #[error("node file not found: {0}")]
    NodeFileNotFound(PathBuf),

    #[error("nodes directory not found: {0}")]
    NodesDirNotFound(PathBuf),

    #[error("malformed YAML in {path}: {source}")]
    MalformedDocument {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid node document {path}: {source}")]
    InvalidNodeDocument {
        path: PathBuf,
        #[source]
        source: DomainError,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
