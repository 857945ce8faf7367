//! Plots produced through the pipeline hook.

use std::sync::Arc;

use chrono::NaiveDate;
use cropwatch_core::config::PipelineConfig;
use cropwatch_core::{Asset, BoundingBox, Field, PartitionKey};
use cropwatch_pipeline::{Catalog, Pipeline};
use cropwatch_store::{ArtifactStore, RedbStore};
use cropwatch_viz::PlotPublisher;

fn day(d: u32) -> PartitionKey {
    PartitionKey::from_ymd(2024, 1, d).unwrap()
}

fn catalog() -> Catalog {
    let field = Field {
        id: "f1".into(),
        name: "Corn Field 1".into(),
        crop_type: "Corn".into(),
        planting_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        polygon: vec![[10.2, 45.2], [10.4, 45.2], [10.4, 45.4], [10.2, 45.4]],
    };
    Catalog::new(BoundingBox::default(), vec![field]).unwrap()
}

fn pipeline(store: Arc<dyn ArtifactStore>) -> Pipeline {
    Pipeline::new(&PipelineConfig::default(), catalog(), store)
        .unwrap()
        .with_hook(Arc::new(PlotPublisher::default()))
}

#[test]
fn raw_and_change_plots_are_stored() {
    let store: Arc<dyn ArtifactStore> = Arc::new(RedbStore::open_in_memory().unwrap());
    let p = pipeline(store.clone());

    p.materialize(Asset::Raw, day(1)).unwrap();
    p.materialize(Asset::Raw, day(2)).unwrap();
    p.materialize(Asset::Change, day(2)).unwrap();

    let plots = store.list("plots/").unwrap();
    assert!(plots.contains(&"plots/ndvi_2024-01-01.png".to_string()));
    assert!(plots.contains(&"plots/soil_moisture_2024-01-02.png".to_string()));
    assert!(plots.contains(&"plots/temperature_2024-01-02.png".to_string()));
    assert!(plots.contains(&"plots/field_summary_f1_2024-01-02.png".to_string()));
    assert_eq!(plots.len(), 7);

    let png = store.get("plots/ndvi_2024-01-02.png").unwrap().unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!(img.width(), 400);
}

#[test]
fn plots_do_not_change_artifact_bytes() {
    let plain: Arc<dyn ArtifactStore> = Arc::new(RedbStore::open_in_memory().unwrap());
    let without = Pipeline::new(&PipelineConfig::default(), catalog(), plain).unwrap();

    let with_store: Arc<dyn ArtifactStore> = Arc::new(RedbStore::open_in_memory().unwrap());
    let with = pipeline(with_store);

    assert_eq!(
        without.materialize(Asset::Raw, day(3)).unwrap().digest,
        with.materialize(Asset::Raw, day(3)).unwrap().digest
    );
}
