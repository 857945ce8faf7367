//! The `raw` asset: per-field summary statistics for one day.

use std::sync::Arc;

use cropwatch_core::{Asset, Metric, PartitionKey, PixelGrid};
use cropwatch_scheduler::DailyPartitions;
use cropwatch_store::{ArtifactStore, artifact_key, tabular_key};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::artifact::{FORMAT_VERSION, RawArtifact, RawMetricsRecord, UnitState};
use crate::catalog::Catalog;
use crate::codec;
use crate::error::{PipelineError, PipelineResult};
use crate::observe::ObservationGenerator;
use crate::stats::summarize;

/// An artifact body together with where and how it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArtifact<T> {
    pub key: String,
    pub body: T,
    /// Size of the JSON body in bytes.
    pub bytes: usize,
    /// SHA-256 of the JSON body, hex encoded.
    pub digest: String,
}

/// Encode `body` as JSON plus its CSV companion and write both.
///
/// The CSV goes first and the JSON body last. If the JSON put fails, the
/// companion is put back to what it held before (or removed when there was
/// none), so a failed run leaves both representations as they were.
pub(crate) fn store_artifact<T, R>(
    store: &dyn ArtifactStore,
    asset: Asset,
    partition: PartitionKey,
    body: T,
    columns: &[&str],
    rows: &[R],
) -> PipelineResult<StoredArtifact<T>>
where
    T: serde::Serialize,
    R: serde::Serialize,
{
    let key = artifact_key(asset, partition);
    let csv_key = tabular_key(asset, partition);

    let json = codec::to_json(&key, &body)?;
    let csv = codec::to_csv(&csv_key, columns, rows)?;

    let previous_csv = store
        .get(&csv_key)
        .map_err(|source| PipelineError::StorageRead {
            key: csv_key.clone(),
            source,
        })?;
    store
        .put(&csv_key, &csv)
        .map_err(|source| PipelineError::StorageWrite {
            key: csv_key.clone(),
            source,
        })?;
    if let Err(source) = store.put(&key, &json) {
        restore_tabular(store, &csv_key, previous_csv);
        return Err(PipelineError::StorageWrite { key, source });
    }

    Ok(StoredArtifact {
        digest: hex::encode(Sha256::digest(&json)),
        bytes: json.len(),
        key,
        body,
    })
}

fn restore_tabular(store: &dyn ArtifactStore, csv_key: &str, previous: Option<Vec<u8>>) {
    let restored = match &previous {
        Some(bytes) => store.put(csv_key, bytes),
        None => store.delete(csv_key).map(|_| ()),
    };
    match restored {
        Ok(()) => debug!(key = csv_key, existed = previous.is_some(), "tabular companion restored"),
        Err(e) => warn!(key = csv_key, error = %e, "failed to restore tabular companion"),
    }
}

/// Read and decode the JSON body for `(asset, partition)`.
pub(crate) fn load_artifact<T: serde::de::DeserializeOwned>(
    store: &dyn ArtifactStore,
    asset: Asset,
    partition: PartitionKey,
) -> PipelineResult<Option<T>> {
    let key = artifact_key(asset, partition);
    let bytes = store
        .get(&key)
        .map_err(|source| PipelineError::StorageRead {
            key: key.clone(),
            source,
        })?;
    bytes.map(|b| codec::from_json(&key, &b)).transpose()
}

/// Builds the `raw` artifact for a partition from the catalog and the
/// synthetic observation generator.
pub struct RawMetricsUnit {
    catalog: Arc<Catalog>,
    store: Arc<dyn ArtifactStore>,
    partitions: DailyPartitions,
    generator: ObservationGenerator,
    grid: PixelGrid,
    max_pixels: usize,
}

impl RawMetricsUnit {
    pub fn new(
        catalog: Arc<Catalog>,
        store: Arc<dyn ArtifactStore>,
        partitions: DailyPartitions,
        grid: PixelGrid,
        max_pixels: usize,
    ) -> Self {
        Self {
            catalog,
            store,
            partitions,
            generator: ObservationGenerator::new(),
            grid,
            max_pixels,
        }
    }

    /// Compute the artifact body without writing it.
    pub fn compute(&self, partition: PartitionKey) -> PipelineResult<RawArtifact> {
        self.partitions.validate(partition)?;

        let active = self.catalog.fields_active_on(partition);
        let mut records = Vec::with_capacity(active.len() * Metric::ALL.len());

        for field in &active {
            let pixels = self.grid.pixels_inside(&field.geometry()).len();
            // Only the count matters: values come from the seeded stream.
            let count = pixels.min(self.max_pixels);
            if count == 0 {
                debug!(%partition, field = %field.id, "no pixel centres inside field, skipping");
                continue;
            }

            for metric in Metric::ALL {
                let samples = self.generator.pixel_samples(field, partition, metric, count);
                let Some(stats) = summarize(&samples) else {
                    continue;
                };
                records.push(RawMetricsRecord {
                    field_id: field.id.clone(),
                    partition,
                    metric,
                    min: stats.min,
                    max: stats.max,
                    mean: stats.mean,
                    std_dev: stats.std_dev,
                    sample_count: stats.count,
                    days_since_planting: field.days_since_planting(partition),
                });
            }
        }

        Ok(RawArtifact {
            format_version: FORMAT_VERSION,
            partition,
            bbox: self.catalog.bbox(),
            synthetic_fallback: self.catalog.is_synthetic_fallback(),
            fields: active.into_iter().cloned().collect(),
            records,
        })
    }

    /// Compute and durably write `raw/{partition}` (and its CSV companion).
    /// Re-running overwrites the previous artifact.
    pub fn materialize(&self, partition: PartitionKey) -> PipelineResult<StoredArtifact<RawArtifact>> {
        debug!(asset = "raw", %partition, state = %UnitState::Pending, "unit scheduled");
        let result = self.run(partition);
        match &result {
            Ok(stored) => info!(
                asset = "raw",
                %partition,
                state = %UnitState::Materialized,
                records = stored.body.records.len(),
                bytes = stored.bytes,
                "unit finished"
            ),
            Err(e) => warn!(
                asset = "raw",
                %partition,
                state = %UnitState::Failed,
                code = e.code(),
                error = %e,
                "unit failed"
            ),
        }
        result
    }

    fn run(&self, partition: PartitionKey) -> PipelineResult<StoredArtifact<RawArtifact>> {
        debug!(asset = "raw", %partition, state = %UnitState::Computing, "computing");
        let artifact = self.compute(partition)?;
        if artifact.fields.is_empty() {
            warn!(%partition, "no active fields, writing empty artifact");
        }
        let records = artifact.records.clone();
        store_artifact(
            self.store.as_ref(),
            Asset::Raw,
            partition,
            artifact,
            &codec::RAW_COLUMNS,
            &records,
        )
    }

    /// The stored artifact for `partition`, if it has been materialized.
    pub fn load(&self, partition: PartitionKey) -> PipelineResult<Option<RawArtifact>> {
        load_artifact(self.store.as_ref(), Asset::Raw, partition)
    }
}
