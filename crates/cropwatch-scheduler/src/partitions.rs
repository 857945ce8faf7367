//! Daily partitions: key enumeration and upstream resolution.

use cropwatch_core::{Asset, PartitionKey};
use tracing::trace;

use crate::error::{SchedulerError, SchedulerResult};

/// A lazy, unbounded sequence of consecutive days.
///
/// `Clone` gives an independent cursor, so a key space can be re-enumerated
/// from any point any number of times. The sequence only ends at the last
/// date `chrono` can represent.
#[derive(Debug, Clone)]
pub struct KeySpace {
    next: Option<PartitionKey>,
}

impl Iterator for KeySpace {
    type Item = PartitionKey;

    fn next(&mut self) -> Option<PartitionKey> {
        let current = self.next?;
        self.next = current.succ();
        Some(current)
    }
}

/// The daily partition definition: one key per calendar day from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPartitions {
    start: PartitionKey,
}

impl DailyPartitions {
    pub fn new(start: PartitionKey) -> Self {
        Self { start }
    }

    pub fn start(&self) -> PartitionKey {
        self.start
    }

    /// Reject keys before the start of the key space.
    pub fn validate(&self, partition: PartitionKey) -> SchedulerResult<()> {
        if partition < self.start {
            return Err(SchedulerError::InvalidPartition {
                partition,
                start: self.start,
            });
        }
        Ok(())
    }

    /// Every key from the start date forward.
    pub fn key_space(&self) -> KeySpace {
        KeySpace {
            next: Some(self.start),
        }
    }

    /// Every key from `from` forward.
    pub fn keys_from(&self, from: PartitionKey) -> SchedulerResult<KeySpace> {
        self.validate(from)?;
        Ok(KeySpace { next: Some(from) })
    }

    /// Keys in `from..=to`, in order.
    pub fn range(
        &self,
        from: PartitionKey,
        to: PartitionKey,
    ) -> SchedulerResult<impl Iterator<Item = PartitionKey> + Clone + use<>> {
        if from > to {
            return Err(SchedulerError::EmptyRange { from, to });
        }
        Ok(self.keys_from(from)?.take_while(move |k| *k <= to))
    }

    /// The single upstream partition `asset` at `partition` reads from.
    ///
    /// - `Raw` has no upstream: `Ok(None)`.
    /// - `Change` reads the raw partition of the previous day, and fails
    ///   with `NoPredecessor` on the first day of the key space.
    pub fn upstream_of(
        &self,
        asset: Asset,
        partition: PartitionKey,
    ) -> SchedulerResult<Option<PartitionKey>> {
        self.validate(partition)?;
        match asset {
            Asset::Raw => Ok(None),
            Asset::Change => {
                if partition == self.start {
                    return Err(SchedulerError::NoPredecessor { asset, partition });
                }
                // partition > start, so the previous day is representable.
                let prev = partition
                    .pred()
                    .ok_or(SchedulerError::NoPredecessor { asset, partition })?;
                trace!(%partition, upstream = %prev, "resolved change upstream");
                Ok(Some(prev))
            }
        }
    }
}
