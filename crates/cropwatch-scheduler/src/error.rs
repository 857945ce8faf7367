//! Scheduler error types.

use cropwatch_core::{Asset, PartitionKey};
use thiserror::Error;

/// Errors that can occur while resolving partition keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The first partition has no prior day. Callers treat this as the
    /// terminal "not applicable" state of the change asset.
    #[error("{asset} partition {partition} has no predecessor")]
    NoPredecessor { asset: Asset, partition: PartitionKey },

    #[error("partition {partition} precedes the start of the key space ({start})")]
    InvalidPartition {
        partition: PartitionKey,
        start: PartitionKey,
    },

    #[error("empty partition range: {from} is after {to}")]
    EmptyRange { from: PartitionKey, to: PartitionKey },
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
