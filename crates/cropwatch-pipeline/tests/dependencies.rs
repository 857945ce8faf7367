//! Change partitions and their raw inputs.

use std::sync::Arc;

use chrono::NaiveDate;
use cropwatch_core::config::PipelineConfig;
use cropwatch_core::{Asset, BoundingBox, Field, PartitionKey};
use cropwatch_pipeline::*;
use cropwatch_store::{ArtifactStore, RedbStore};

fn day(d: u32) -> PartitionKey {
    PartitionKey::from_ymd(2024, 1, d).unwrap()
}

fn setup() -> (Pipeline, Arc<dyn ArtifactStore>) {
    let field = Field {
        id: "f1".to_string(),
        name: "f1".to_string(),
        crop_type: "Barley".to_string(),
        planting_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        polygon: vec![[10.1, 45.1], [10.3, 45.1], [10.3, 45.3], [10.1, 45.3]],
    };
    let catalog = Catalog::new(BoundingBox::default(), vec![field]).unwrap();
    let store: Arc<dyn ArtifactStore> = Arc::new(RedbStore::open_in_memory().unwrap());
    let p = Pipeline::new(&PipelineConfig::default(), catalog, store.clone()).unwrap();
    (p, store)
}

#[test]
fn first_partition_is_not_applicable() {
    let (p, store) = setup();
    p.materialize(Asset::Raw, day(1)).unwrap();
    let report = p.materialize(Asset::Change, day(1)).unwrap();
    assert_eq!(report.state, UnitState::NotApplicable);
    assert!(store.list("change/").unwrap().is_empty());
}

#[test]
fn missing_prior_raw_then_success() {
    let (p, _) = setup();
    p.materialize(Asset::Raw, day(2)).unwrap();

    let err = p.materialize(Asset::Change, day(2)).unwrap_err();
    match err {
        PipelineError::MissingPriorDependency { partition, prior } => {
            assert_eq!(partition, day(2));
            assert_eq!(prior, day(1));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(p.read_change(day(2)).unwrap().is_none());

    p.materialize(Asset::Raw, day(1)).unwrap();
    let report = p.materialize(Asset::Change, day(2)).unwrap();
    assert_eq!(report.state, UnitState::Materialized);
}

#[test]
fn missing_current_raw_is_distinct() {
    let (p, _) = setup();
    p.materialize(Asset::Raw, day(1)).unwrap();

    let err = p.materialize(Asset::Change, day(2)).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingCurrentDependency { partition } if partition == day(2)
    ));
    assert_eq!(err.code(), "missing_current_dependency");
}

#[test]
fn failed_change_keeps_previous_artifact() {
    let (p, store) = setup();
    p.materialize(Asset::Raw, day(1)).unwrap();
    p.materialize(Asset::Raw, day(2)).unwrap();
    p.materialize(Asset::Change, day(2)).unwrap();
    let before = store.get("change/2024-01-02").unwrap().unwrap();

    // Losing the prior day's input makes the rerun fail before writing.
    assert!(store.delete("raw/2024-01-01").unwrap());
    assert!(p.materialize(Asset::Change, day(2)).is_err());
    assert_eq!(store.get("change/2024-01-02").unwrap().unwrap(), before);
}

#[test]
fn partition_before_start_is_rejected() {
    let (p, _) = setup();
    let err = p
        .materialize(Asset::Change, PartitionKey::from_ymd(2023, 12, 31).unwrap())
        .unwrap_err();
    assert_eq!(err.code(), "invalid_partition");
}
