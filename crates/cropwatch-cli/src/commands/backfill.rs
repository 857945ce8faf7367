use std::sync::Arc;

use cropwatch_core::{CropwatchConfig, PartitionKey};
use cropwatch_pipeline::{UnitState, backfill};

use super::open_pipeline;

pub async fn run(
    config: &CropwatchConfig,
    from: PartitionKey,
    to: PartitionKey,
    plots: bool,
    parallelism: usize,
) -> anyhow::Result<()> {
    let pipeline = Arc::new(open_pipeline(config, plots)?);
    let report = backfill(pipeline, from, to, parallelism).await?;

    for entry in &report.entries {
        match &entry.result {
            Ok(r) => println!(
                "{:<7} {}  {:<15} {} records",
                entry.asset.as_str(),
                entry.partition,
                r.state.as_str(),
                r.records
            ),
            Err(e) => println!(
                "{:<7} {}  {:<15} {}",
                entry.asset.as_str(),
                entry.partition,
                UnitState::Failed.as_str(),
                e
            ),
        }
    }

    let failed = report.count(UnitState::Failed);
    anyhow::ensure!(failed == 0, "{failed} partition(s) failed");
    Ok(())
}
