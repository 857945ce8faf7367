use std::io::Write;

use anyhow::Context;
use cropwatch_core::{Asset, CropwatchConfig, PartitionKey};
use cropwatch_pipeline::Pipeline;

use crate::OutputFormat;

pub fn run(
    config: &CropwatchConfig,
    asset: Asset,
    partition: PartitionKey,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let missing = || format!("{asset} {partition} has not been materialized");

    match format {
        OutputFormat::Json => {
            let json = match asset {
                Asset::Raw => serde_json::to_string_pretty(
                    &pipeline.read_raw(partition)?.with_context(missing)?,
                )?,
                Asset::Change => serde_json::to_string_pretty(
                    &pipeline.read_change(partition)?.with_context(missing)?,
                )?,
            };
            println!("{json}");
        }
        OutputFormat::Csv => {
            let csv = pipeline
                .read_tabular(asset, partition)?
                .with_context(missing)?;
            std::io::stdout().write_all(&csv)?;
        }
    }
    Ok(())
}
