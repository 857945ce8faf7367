//! Pipeline error types.

use cropwatch_core::PartitionKey;
use cropwatch_scheduler::SchedulerError;
use cropwatch_store::StoreError;
use thiserror::Error;

/// Errors that abort a single `(asset, partition)` materialization.
///
/// None of these leave partial state behind: the artifact write is the last
/// step of every unit, and a failed unit never touches the artifact already
/// stored for its key.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to write {key}: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to read {key}: {source}")]
    StorageRead {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The raw asset for the change partition itself has not been built.
    #[error("raw artifact for {partition} is missing: materialize raw {partition} first")]
    MissingCurrentDependency { partition: PartitionKey },

    /// The raw asset for the prior day has not been built.
    #[error("raw artifact for prior day {prior} is missing: backfill raw {prior} before change {partition}")]
    MissingPriorDependency {
        partition: PartitionKey,
        prior: PartitionKey,
    },

    #[error(transparent)]
    Partition(#[from] SchedulerError),

    #[error("artifact {key} could not be encoded or decoded: {message}")]
    Codec { key: String, message: String },

    #[error("pipeline setup failed: {0}")]
    Setup(String),

    /// A backfill worker task panicked or was cancelled.
    #[error("materialization task for {partition} did not complete: {message}")]
    Task {
        partition: PartitionKey,
        message: String,
    },
}

impl PipelineError {
    /// Stable short code for logs and CLI exit reporting.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::StorageWrite { .. } => "storage_write_error",
            PipelineError::StorageRead { .. } => "storage_read_error",
            PipelineError::MissingCurrentDependency { .. } => "missing_current_dependency",
            PipelineError::MissingPriorDependency { .. } => "missing_prior_dependency",
            PipelineError::Partition(_) => "invalid_partition",
            PipelineError::Codec { .. } => "codec_error",
            PipelineError::Setup(_) => "setup_error",
            PipelineError::Task { .. } => "task_error",
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
