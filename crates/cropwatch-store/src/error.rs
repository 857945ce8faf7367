//! Error types for the cropwatch artifact store.

use thiserror::Error;

/// Result type alias for artifact store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during artifact store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid artifact key: {0:?}")]
    InvalidKey(String),
}
