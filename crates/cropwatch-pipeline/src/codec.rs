//! Artifact encodings.
//!
//! The structured JSON body is authoritative and is what the pipeline reads
//! back. The CSV companion is a write-only tabular export with one row per
//! record; empty cells stand for absent optional values.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{PipelineError, PipelineResult};

fn codec_err(key: &str, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Codec {
        key: key.to_string(),
        message: e.to_string(),
    }
}

pub fn to_json<T: Serialize>(key: &str, value: &T) -> PipelineResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| codec_err(key, e))
}

pub fn from_json<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> PipelineResult<T> {
    serde_json::from_slice(bytes).map_err(|e| codec_err(key, e))
}

/// Encode `rows` as CSV under an explicit `header`, so an empty table still
/// carries its column names.
pub fn to_csv<R: Serialize>(key: &str, header: &[&str], rows: &[R]) -> PipelineResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(header).map_err(|e| codec_err(key, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| codec_err(key, e))?;
    }
    writer.into_inner().map_err(|e| codec_err(key, e))
}

/// Column order of the raw CSV, matching `RawMetricsRecord`.
pub const RAW_COLUMNS: [&str; 9] = [
    "field_id",
    "partition",
    "metric",
    "min",
    "max",
    "mean",
    "std_dev",
    "sample_count",
    "days_since_planting",
];

/// Column order of the change CSV, matching `ChangeRecord`.
pub const CHANGE_COLUMNS: [&str; 7] = [
    "field_id",
    "partition",
    "metric",
    "previous_mean",
    "current_mean",
    "delta",
    "pct_change",
];
