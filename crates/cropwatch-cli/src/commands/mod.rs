pub mod backfill;
pub mod catalog;
pub mod materialize;
pub mod show;

use std::sync::Arc;

use cropwatch_core::CropwatchConfig;
use cropwatch_pipeline::Pipeline;
use cropwatch_viz::{PlotPublisher, RasterStyle};

/// Build the pipeline from config, with the plot hook when requested.
pub fn open_pipeline(config: &CropwatchConfig, plots: bool) -> anyhow::Result<Pipeline> {
    let pipeline = Pipeline::from_config(config)?;
    if !plots {
        return Ok(pipeline);
    }
    let style = RasterStyle {
        resolution: config.pipeline.resolution,
        ..RasterStyle::default()
    };
    Ok(pipeline.with_hook(Arc::new(PlotPublisher::new(style))))
}
