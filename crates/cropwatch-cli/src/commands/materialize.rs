use cropwatch_core::{Asset, CropwatchConfig, PartitionKey};
use tracing::info;

use super::open_pipeline;

pub async fn run(
    config: &CropwatchConfig,
    asset: Asset,
    partition: PartitionKey,
    plots: bool,
) -> anyhow::Result<()> {
    let pipeline = open_pipeline(config, plots)?;
    let report = tokio::task::spawn_blocking(move || pipeline.materialize(asset, partition)).await??;
    info!(%asset, %partition, state = %report.state, "done");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
