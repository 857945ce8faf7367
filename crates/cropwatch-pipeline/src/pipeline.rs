//! Trigger surface: `materialize(asset, partition)`.
//!
//! A [`Pipeline`] owns the catalog, the store and one unit per asset, and
//! dispatches a trigger to the right unit. Post-materialization hooks (plot
//! rendering, for instance) run after a successful write; their failures
//! are logged and never fail the materialization.

use std::sync::Arc;

use cropwatch_core::config::PipelineConfig;
use cropwatch_core::{Asset, CropwatchConfig, PartitionKey, PixelGrid};
use cropwatch_scheduler::DailyPartitions;
use cropwatch_store::{ArtifactStore, tabular_key};
use serde::Serialize;
use tracing::{info, warn};

use crate::artifact::{ChangeArtifact, RawArtifact, UnitState};
use crate::catalog::Catalog;
use crate::change::{ChangeAnalysisUnit, ChangeOutcome};
use crate::error::{PipelineError, PipelineResult};
use crate::raw::RawMetricsUnit;

pub type HookResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Side outputs produced after an artifact has been written.
pub trait MaterializeHook: Send + Sync {
    fn name(&self) -> &str;

    fn after_raw(&self, _store: &dyn ArtifactStore, _artifact: &RawArtifact) -> HookResult {
        Ok(())
    }

    fn after_change(&self, _store: &dyn ArtifactStore, _artifact: &ChangeArtifact) -> HookResult {
        Ok(())
    }
}

/// What a single trigger produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterializeReport {
    pub asset: Asset,
    pub partition: PartitionKey,
    pub state: UnitState,
    /// Store key of the JSON body; `None` when nothing was written.
    pub key: Option<String>,
    pub bytes: usize,
    /// Hex SHA-256 of the JSON body.
    pub digest: Option<String>,
    pub records: usize,
}

pub struct Pipeline {
    catalog: Arc<Catalog>,
    store: Arc<dyn ArtifactStore>,
    partitions: DailyPartitions,
    raw: RawMetricsUnit,
    change: ChangeAnalysisUnit,
    hooks: Vec<Arc<dyn MaterializeHook>>,
}

impl Pipeline {
    pub fn new(
        config: &PipelineConfig,
        catalog: Catalog,
        store: Arc<dyn ArtifactStore>,
    ) -> PipelineResult<Self> {
        let catalog = Arc::new(catalog);
        let partitions = DailyPartitions::new(config.start_date);
        let grid = PixelGrid::new(catalog.bbox(), config.resolution).ok_or_else(|| {
            PipelineError::Setup(format!("invalid pixel resolution {}", config.resolution))
        })?;

        let raw = RawMetricsUnit::new(
            catalog.clone(),
            store.clone(),
            partitions,
            grid,
            config.max_pixels_per_field,
        );
        let change = ChangeAnalysisUnit::new(store.clone(), partitions);

        Ok(Self {
            catalog,
            store,
            partitions,
            raw,
            change,
            hooks: Vec::new(),
        })
    }

    /// Load the catalog (with fallback) and open the configured store.
    pub fn from_config(config: &CropwatchConfig) -> PipelineResult<Self> {
        let location = config
            .store
            .location()
            .map_err(|e| PipelineError::Setup(e.to_string()))?;
        let store = cropwatch_store::open(&location)
            .map_err(|e| PipelineError::Setup(e.to_string()))?;

        Self::new(&config.pipeline, Catalog::from_config(config), store)
    }

    pub fn with_hook(mut self, hook: Arc<dyn MaterializeHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    pub fn partitions(&self) -> DailyPartitions {
        self.partitions
    }

    /// Materialize one `(asset, partition)` and run hooks on success.
    pub fn materialize(
        &self,
        asset: Asset,
        partition: PartitionKey,
    ) -> PipelineResult<MaterializeReport> {
        match asset {
            Asset::Raw => {
                let stored = self.raw.materialize(partition)?;
                self.run_hooks(partition, |hook, store| hook.after_raw(store, &stored.body));
                Ok(MaterializeReport {
                    asset,
                    partition,
                    state: UnitState::Materialized,
                    records: stored.body.records.len(),
                    bytes: stored.bytes,
                    digest: Some(stored.digest),
                    key: Some(stored.key),
                })
            }
            Asset::Change => match self.change.materialize(partition)? {
                ChangeOutcome::Materialized(stored) => {
                    self.run_hooks(partition, |hook, store| {
                        hook.after_change(store, &stored.body)
                    });
                    Ok(MaterializeReport {
                        asset,
                        partition,
                        state: UnitState::Materialized,
                        records: stored.body.records.len(),
                        bytes: stored.bytes,
                        digest: Some(stored.digest),
                        key: Some(stored.key),
                    })
                }
                ChangeOutcome::NotApplicable { partition } => Ok(MaterializeReport {
                    asset,
                    partition,
                    state: UnitState::NotApplicable,
                    key: None,
                    bytes: 0,
                    digest: None,
                    records: 0,
                }),
            },
        }
    }

    fn run_hooks<F>(&self, partition: PartitionKey, f: F)
    where
        F: Fn(&dyn MaterializeHook, &dyn ArtifactStore) -> HookResult,
    {
        for hook in &self.hooks {
            match f(hook.as_ref(), self.store.as_ref()) {
                Ok(()) => info!(hook = hook.name(), %partition, "hook completed"),
                Err(e) => warn!(hook = hook.name(), %partition, error = %e, "hook failed"),
            }
        }
    }

    pub fn read_raw(&self, partition: PartitionKey) -> PipelineResult<Option<RawArtifact>> {
        self.raw.load(partition)
    }

    pub fn read_change(&self, partition: PartitionKey) -> PipelineResult<Option<ChangeArtifact>> {
        self.change.load(partition)
    }

    /// The CSV companion for `(asset, partition)`, as stored.
    pub fn read_tabular(
        &self,
        asset: Asset,
        partition: PartitionKey,
    ) -> PipelineResult<Option<Vec<u8>>> {
        let key = tabular_key(asset, partition);
        self.store
            .get(&key)
            .map_err(|source| PipelineError::StorageRead { key, source })
    }
}
