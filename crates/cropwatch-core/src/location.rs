//! Artifact store location parsing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StoreLocation {
    /// Directory tree mirroring the key scheme: file://./data or ./data
    Dir { root: PathBuf },
    /// Embedded redb database file: redb:///var/lib/cropwatch/artifacts.redb
    Redb { path: PathBuf },
    /// Ephemeral in-process store: memory://
    Memory,
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("unsupported store scheme: {0}")]
    UnsupportedScheme(String),
    #[error("invalid store location: {0}")]
    InvalidUri(String),
}

impl StoreLocation {
    pub fn parse(uri: &str) -> Result<Self, LocationError> {
        if let Some(rest) = uri.strip_prefix("file://") {
            non_empty(rest, uri).map(|root| StoreLocation::Dir { root })
        } else if let Some(rest) = uri.strip_prefix("redb://") {
            non_empty(rest, uri).map(|path| StoreLocation::Redb { path })
        } else if uri == "memory://" {
            Ok(StoreLocation::Memory)
        } else if uri.contains("://") {
            Err(LocationError::UnsupportedScheme(uri.to_string()))
        } else {
            non_empty(uri, uri).map(|root| StoreLocation::Dir { root })
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            StoreLocation::Dir { .. } => "file",
            StoreLocation::Redb { .. } => "redb",
            StoreLocation::Memory => "memory",
        }
    }
}

fn non_empty(path: &str, uri: &str) -> Result<PathBuf, LocationError> {
    if path.trim().is_empty() {
        Err(LocationError::InvalidUri(uri.to_string()))
    } else {
        Ok(PathBuf::from(path))
    }
}
