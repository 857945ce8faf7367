//! The `change` asset: day-over-day deltas against the prior raw partition.

use std::collections::BTreeMap;
use std::sync::Arc;

use cropwatch_core::{Asset, Metric, PartitionKey};
use cropwatch_scheduler::{DailyPartitions, SchedulerError};
use cropwatch_store::ArtifactStore;
use tracing::{debug, info, warn};

use crate::artifact::{
    ChangeArtifact, ChangeRecord, FORMAT_VERSION, FieldGrowth, RawArtifact, UnitState,
};
use crate::codec;
use crate::error::{PipelineError, PipelineResult};
use crate::raw::{StoredArtifact, load_artifact, store_artifact};

/// Result of a change materialization that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOutcome {
    Materialized(StoredArtifact<ChangeArtifact>),
    /// The partition has no predecessor; nothing is written.
    NotApplicable { partition: PartitionKey },
}

impl ChangeOutcome {
    pub fn state(&self) -> UnitState {
        match self {
            ChangeOutcome::Materialized(_) => UnitState::Materialized,
            ChangeOutcome::NotApplicable { .. } => UnitState::NotApplicable,
        }
    }

    pub fn artifact(&self) -> Option<&ChangeArtifact> {
        match self {
            ChangeOutcome::Materialized(stored) => Some(&stored.body),
            ChangeOutcome::NotApplicable { .. } => None,
        }
    }
}

pub struct ChangeAnalysisUnit {
    store: Arc<dyn ArtifactStore>,
    partitions: DailyPartitions,
}

impl ChangeAnalysisUnit {
    pub fn new(store: Arc<dyn ArtifactStore>, partitions: DailyPartitions) -> Self {
        Self { store, partitions }
    }

    /// Materialize `change/{partition}` from `raw/{partition}` and the raw
    /// artifact of the prior day.
    ///
    /// Both raw inputs must already exist; they are read once, without
    /// waiting. On the first partition this returns
    /// [`ChangeOutcome::NotApplicable`] and writes nothing.
    pub fn materialize(&self, partition: PartitionKey) -> PipelineResult<ChangeOutcome> {
        debug!(asset = "change", %partition, state = %UnitState::Pending, "unit scheduled");
        let result = self.run(partition);
        match &result {
            Ok(ChangeOutcome::Materialized(stored)) => info!(
                asset = "change",
                %partition,
                state = %UnitState::Materialized,
                records = stored.body.records.len(),
                bytes = stored.bytes,
                "unit finished"
            ),
            Ok(ChangeOutcome::NotApplicable { .. }) => info!(
                asset = "change",
                %partition,
                state = %UnitState::NotApplicable,
                "first partition has no prior day"
            ),
            Err(e) => warn!(
                asset = "change",
                %partition,
                state = %UnitState::Failed,
                code = e.code(),
                error = %e,
                "unit failed"
            ),
        }
        result
    }

    fn run(&self, partition: PartitionKey) -> PipelineResult<ChangeOutcome> {
        let prior = match self.partitions.upstream_of(Asset::Change, partition) {
            Ok(Some(prior)) => prior,
            Ok(None) | Err(SchedulerError::NoPredecessor { .. }) => {
                return Ok(ChangeOutcome::NotApplicable { partition });
            }
            Err(e) => return Err(e.into()),
        };

        debug!(asset = "change", %partition, %prior, state = %UnitState::WaitingOnDependency, "resolving inputs");
        let current: RawArtifact = load_artifact(self.store.as_ref(), Asset::Raw, partition)?
            .ok_or(PipelineError::MissingCurrentDependency { partition })?;
        let previous: RawArtifact = load_artifact(self.store.as_ref(), Asset::Raw, prior)?
            .ok_or(PipelineError::MissingPriorDependency { partition, prior })?;

        debug!(asset = "change", %partition, state = %UnitState::Computing, "computing");
        let artifact = compute(&current, &previous);
        let records = artifact.records.clone();
        let stored = store_artifact(
            self.store.as_ref(),
            Asset::Change,
            partition,
            artifact,
            &codec::CHANGE_COLUMNS,
            &records,
        )?;
        Ok(ChangeOutcome::Materialized(stored))
    }

    pub fn load(&self, partition: PartitionKey) -> PipelineResult<Option<ChangeArtifact>> {
        load_artifact(self.store.as_ref(), Asset::Change, partition)
    }
}

/// Merge two raw artifacts by `(field id, metric)`.
///
/// Every current record yields one change record. Records only present in
/// `previous` are dropped. The synthetic-fallback flag carries over from
/// either input.
pub fn compute(current: &RawArtifact, previous: &RawArtifact) -> ChangeArtifact {
    let prior_means: BTreeMap<(&str, Metric), f64> = previous
        .records
        .iter()
        .map(|r| ((r.field_id.as_str(), r.metric), r.mean))
        .collect();

    let records: Vec<ChangeRecord> = current
        .records
        .iter()
        .map(|r| {
            let previous_mean = prior_means.get(&(r.field_id.as_str(), r.metric)).copied();
            let delta = previous_mean.map(|p| r.mean - p);
            let pct_change = previous_mean
                .zip(delta)
                .filter(|(p, _)| *p != 0.0)
                .map(|(p, d)| d / p * 100.0);
            ChangeRecord {
                field_id: r.field_id.clone(),
                partition: current.partition,
                metric: r.metric,
                previous_mean,
                current_mean: r.mean,
                delta,
                pct_change,
            }
        })
        .collect();

    let growth = current
        .records
        .iter()
        .filter(|r| r.metric == Metric::Ndvi)
        .map(|r| {
            let delta = records
                .iter()
                .find(|c| c.field_id == r.field_id && c.metric == Metric::Ndvi)
                .and_then(|c| c.delta);
            let days = r.days_since_planting;
            FieldGrowth {
                field_id: r.field_id.clone(),
                days_since_planting: days,
                ndvi_growth_rate: delta.filter(|_| days > 0).map(|d| d / days as f64),
            }
        })
        .collect();

    ChangeArtifact {
        format_version: FORMAT_VERSION,
        partition: current.partition,
        previous_partition: previous.partition,
        synthetic_fallback: current.synthetic_fallback || previous.synthetic_fallback,
        records,
        growth,
    }
}
