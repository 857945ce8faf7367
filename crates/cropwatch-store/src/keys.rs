//! Artifact key scheme.
//!
//! These paths are the only externally observable storage contract, so
//! every backend stores artifacts under exactly these names:
//!
//! ```text
//! {asset}/{YYYY-MM-DD}                         structured artifact (JSON)
//! {asset}/{YYYY-MM-DD}.csv                     tabular companion
//! plots/{metric}_{YYYY-MM-DD}.png              per-metric raster
//! plots/field_summary_{field}_{YYYY-MM-DD}.png per-field change summary
//! ```

use cropwatch_core::{Asset, Metric, PartitionKey};

use crate::error::{StoreError, StoreResult};

pub fn artifact_key(asset: Asset, partition: PartitionKey) -> String {
    format!("{asset}/{partition}")
}

pub fn tabular_key(asset: Asset, partition: PartitionKey) -> String {
    format!("{asset}/{partition}.csv")
}

pub fn raster_plot_key(metric: Metric, partition: PartitionKey) -> String {
    format!("plots/{metric}_{partition}.png")
}

pub fn field_summary_key(field_id: &str, partition: PartitionKey) -> String {
    format!("plots/field_summary_{field_id}_{partition}.png")
}

/// Reject keys that could escape a directory root or collide after
/// normalization: empty keys, absolute paths, backslashes, and empty,
/// `.` or `..` segments.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        Err(StoreError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> PartitionKey {
        PartitionKey::from_ymd(2024, 1, 2).unwrap()
    }

    #[test]
    fn key_scheme() {
        assert_eq!(artifact_key(Asset::Raw, day()), "raw/2024-01-02");
        assert_eq!(artifact_key(Asset::Change, day()), "change/2024-01-02");
        assert_eq!(tabular_key(Asset::Raw, day()), "raw/2024-01-02.csv");
        assert_eq!(
            raster_plot_key(Metric::SoilMoisture, day()),
            "plots/soil_moisture_2024-01-02.png"
        );
        assert_eq!(
            field_summary_key("field3", day()),
            "plots/field_summary_field3_2024-01-02.png"
        );
    }

    #[test]
    fn generated_keys_are_valid() {
        assert!(validate_key(&artifact_key(Asset::Raw, day())).is_ok());
        assert!(validate_key(&raster_plot_key(Metric::Ndvi, day())).is_ok());
    }

    #[test]
    fn rejects_escaping_keys() {
        for key in ["", "/raw/x", "raw/../etc", "raw//x", "raw/./x", "raw\\x", "raw/"] {
            assert!(validate_key(key).is_err(), "{key:?} should be rejected");
        }
    }
}
