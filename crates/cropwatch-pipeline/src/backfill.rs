//! Date-range backfill.
//!
//! Raw partitions are independent of each other, so they run concurrently
//! on the blocking pool, bounded by `parallelism`. Change partitions run
//! only once every raw partition in the range has finished. A failure is
//! recorded against its own key and never cancels the others.

use std::sync::Arc;

use cropwatch_core::{Asset, PartitionKey};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::artifact::UnitState;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{MaterializeReport, Pipeline};

/// Outcome of one key within a backfill.
#[derive(Debug)]
pub struct BackfillEntry {
    pub asset: Asset,
    pub partition: PartitionKey,
    pub result: PipelineResult<MaterializeReport>,
}

impl BackfillEntry {
    pub fn state(&self) -> UnitState {
        match &self.result {
            Ok(report) => report.state,
            Err(_) => UnitState::Failed,
        }
    }
}

/// Per-key outcomes: every raw key in order, then every change key.
#[derive(Debug, Default)]
pub struct BackfillReport {
    pub entries: Vec<BackfillEntry>,
}

impl BackfillReport {
    pub fn failures(&self) -> impl Iterator<Item = &BackfillEntry> {
        self.entries.iter().filter(|e| e.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn count(&self, state: UnitState) -> usize {
        self.entries.iter().filter(|e| e.state() == state).count()
    }
}

/// Materialize raw then change for every key in `from..=to`.
///
/// Fails up front only when the range itself is invalid.
pub async fn backfill(
    pipeline: Arc<Pipeline>,
    from: PartitionKey,
    to: PartitionKey,
    parallelism: usize,
) -> PipelineResult<BackfillReport> {
    let keys: Vec<PartitionKey> = pipeline.partitions().range(from, to)?.collect();
    let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
    info!(%from, %to, partitions = keys.len(), parallelism, "backfill started");

    let mut report = BackfillReport::default();
    for asset in [Asset::Raw, Asset::Change] {
        let handles: Vec<(PartitionKey, JoinHandle<_>)> = keys
            .iter()
            .map(|&partition| {
                let handle = spawn_unit(pipeline.clone(), semaphore.clone(), asset, partition);
                (partition, handle)
            })
            .collect();

        for (partition, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(PipelineError::Task {
                    partition,
                    message: e.to_string(),
                }),
            };
            if let Err(e) = &result {
                warn!(%asset, %partition, code = e.code(), error = %e, "backfill key failed");
            }
            report.entries.push(BackfillEntry {
                asset,
                partition,
                result,
            });
        }
    }

    info!(
        %from,
        %to,
        materialized = report.count(UnitState::Materialized),
        not_applicable = report.count(UnitState::NotApplicable),
        failed = report.count(UnitState::Failed),
        "backfill finished"
    );
    Ok(report)
}

fn spawn_unit(
    pipeline: Arc<Pipeline>,
    semaphore: Arc<Semaphore>,
    asset: Asset,
    partition: PartitionKey,
) -> JoinHandle<PipelineResult<MaterializeReport>> {
    tokio::spawn(async move {
        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| PipelineError::Task {
                partition,
                message: e.to_string(),
            })?;
        tokio::task::spawn_blocking(move || pipeline.materialize(asset, partition))
            .await
            .map_err(|e| PipelineError::Task {
                partition,
                message: e.to_string(),
            })?
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cropwatch_core::config::PipelineConfig;
    use cropwatch_core::{BoundingBox, Field};
    use cropwatch_store::{ArtifactStore, RedbStore};

    use crate::catalog::Catalog;

    fn day(d: u32) -> PartitionKey {
        PartitionKey::from_ymd(2024, 1, d).unwrap()
    }

    fn pipeline() -> Arc<Pipeline> {
        let field = Field {
            id: "f1".into(),
            name: "North".into(),
            crop_type: "Wheat".into(),
            planting_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            polygon: vec![[10.2, 45.2], [10.4, 45.2], [10.4, 45.4], [10.2, 45.4]],
        };
        let catalog = Catalog::new(BoundingBox::default(), vec![field]).unwrap();
        let store: Arc<dyn ArtifactStore> = Arc::new(RedbStore::open_in_memory().unwrap());
        Arc::new(Pipeline::new(&PipelineConfig::default(), catalog, store).unwrap())
    }

    #[tokio::test]
    async fn backfill_from_start() {
        let p = pipeline();
        let report = backfill(p.clone(), day(1), day(5), 3).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.entries.len(), 10);
        assert_eq!(report.count(UnitState::Materialized), 9);
        assert_eq!(report.count(UnitState::NotApplicable), 1);
        assert_eq!(p.store().list("change/").unwrap().len(), 8);
        assert!(p.read_change(day(5)).unwrap().is_some());
    }

    #[tokio::test]
    async fn mid_range_without_prior_raw_reports_one_failure() {
        let p = pipeline();
        let report = backfill(p.clone(), day(3), day(4), 1).await.unwrap();

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].asset, Asset::Change);
        assert_eq!(failures[0].partition, day(3));
        assert!(matches!(
            failures[0].result,
            Err(PipelineError::MissingPriorDependency { .. })
        ));
        assert!(p.read_change(day(4)).unwrap().is_some());
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        assert!(backfill(pipeline(), day(5), day(1), 2).await.is_err());
    }
}
