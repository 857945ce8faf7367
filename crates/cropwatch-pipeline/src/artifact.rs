//! Artifact bodies for the `raw` and `change` assets.
//!
//! Both bodies are fully ordered (records sorted by field id, then metric)
//! and contain no timestamps, so materializing the same partition twice
//! with the same inputs produces byte-identical output.

use cropwatch_core::{BoundingBox, Field, Metric, PartitionKey};
use serde::{Deserialize, Serialize};

/// Version stamped into every artifact body.
pub const FORMAT_VERSION: u32 = 1;

/// Summary statistics for one (field, metric) on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetricsRecord {
    pub field_id: String,
    pub partition: PartitionKey,
    pub metric: Metric,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub sample_count: usize,
    pub days_since_planting: i64,
}

/// The `raw` asset for one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArtifact {
    pub format_version: u32,
    pub partition: PartitionKey,
    pub bbox: BoundingBox,
    /// True when the catalog fell back to generated fields.
    pub synthetic_fallback: bool,
    /// Active fields for this partition, including any that yielded no
    /// samples and therefore have no records.
    pub fields: Vec<Field>,
    pub records: Vec<RawMetricsRecord>,
}

impl RawArtifact {
    pub fn record(&self, field_id: &str, metric: Metric) -> Option<&RawMetricsRecord> {
        self.records
            .iter()
            .find(|r| r.field_id == field_id && r.metric == metric)
    }

    pub fn field(&self, field_id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Day-over-day change for one (field, metric).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub field_id: String,
    pub partition: PartitionKey,
    pub metric: Metric,
    /// `None` when the field/metric has no record on the previous day.
    pub previous_mean: Option<f64>,
    pub current_mean: f64,
    /// `current_mean − previous_mean`; `None` without a previous value.
    pub delta: Option<f64>,
    /// `delta / previous_mean × 100`; `None` without a previous value or
    /// when the previous mean is zero.
    pub pct_change: Option<f64>,
}

/// NDVI growth rate per field: NDVI delta divided by days since planting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGrowth {
    pub field_id: String,
    pub days_since_planting: i64,
    /// `None` on the planting day or without a previous NDVI value.
    pub ndvi_growth_rate: Option<f64>,
}

/// The `change` asset for one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeArtifact {
    pub format_version: u32,
    pub partition: PartitionKey,
    pub previous_partition: PartitionKey,
    /// Set when either raw input was built from synthetic fallback fields.
    #[serde(default)]
    pub synthetic_fallback: bool,
    pub records: Vec<ChangeRecord>,
    pub growth: Vec<FieldGrowth>,
}

impl ChangeArtifact {
    pub fn record(&self, field_id: &str, metric: Metric) -> Option<&ChangeRecord> {
        self.records
            .iter()
            .find(|r| r.field_id == field_id && r.metric == metric)
    }

    /// Distinct field ids in record order.
    pub fn field_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for r in &self.records {
            if ids.last() != Some(&r.field_id.as_str()) {
                ids.push(&r.field_id);
            }
        }
        ids
    }
}

// ── Unit lifecycle ─────────────────────────────────────────────────

/// Lifecycle of one `(asset, partition)` materialization.
///
/// Raw units move pending → computing → materialized | failed. Change units
/// additionally pass through waiting-on-dependency and can end as
/// not-applicable on the first partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Pending,
    WaitingOnDependency,
    Computing,
    Materialized,
    NotApplicable,
    Failed,
}

impl UnitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitState::Pending => "pending",
            UnitState::WaitingOnDependency => "waiting_on_dependency",
            UnitState::Computing => "computing",
            UnitState::Materialized => "materialized",
            UnitState::NotApplicable => "not_applicable",
            UnitState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnitState::Materialized | UnitState::NotApplicable | UnitState::Failed
        )
    }
}

impl std::fmt::Display for UnitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
