//! Writes plots into the artifact store after each materialization.

use cropwatch_core::Metric;
use cropwatch_pipeline::{ChangeArtifact, HookResult, MaterializeHook, RawArtifact};
use cropwatch_store::{ArtifactStore, field_summary_key, raster_plot_key};
use tracing::debug;

use crate::error::VizResult;
use crate::raster::{RasterStyle, encode_png, render_metric};
use crate::summary::render_field_summary;

/// Renders `plots/{metric}_{date}.png` for every raw artifact and
/// `plots/field_summary_{field}_{date}.png` for every field in a change
/// artifact.
#[derive(Debug, Clone, Default)]
pub struct PlotPublisher {
    style: RasterStyle,
}

impl PlotPublisher {
    pub fn new(style: RasterStyle) -> Self {
        Self { style }
    }

    /// Returns the keys written.
    pub fn publish_raw(&self, store: &dyn ArtifactStore, artifact: &RawArtifact) -> VizResult<Vec<String>> {
        let mut written = Vec::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            let png = encode_png(render_metric(artifact, metric, self.style)?)?;
            let key = raster_plot_key(metric, artifact.partition);
            store.put(&key, &png)?;
            debug!(%key, bytes = png.len(), "plot written");
            written.push(key);
        }
        Ok(written)
    }

    pub fn publish_change(
        &self,
        store: &dyn ArtifactStore,
        artifact: &ChangeArtifact,
    ) -> VizResult<Vec<String>> {
        let mut written = Vec::new();
        for field_id in artifact.field_ids() {
            let Some(img) = render_field_summary(artifact, field_id) else {
                continue;
            };
            let png = encode_png(img)?;
            let key = field_summary_key(field_id, artifact.partition);
            store.put(&key, &png)?;
            debug!(%key, bytes = png.len(), "plot written");
            written.push(key);
        }
        Ok(written)
    }
}

impl MaterializeHook for PlotPublisher {
    fn name(&self) -> &str {
        "plots"
    }

    fn after_raw(&self, store: &dyn ArtifactStore, artifact: &RawArtifact) -> HookResult {
        self.publish_raw(store, artifact)?;
        Ok(())
    }

    fn after_change(&self, store: &dyn ArtifactStore, artifact: &ChangeArtifact) -> HookResult {
        self.publish_change(store, artifact)?;
        Ok(())
    }
}
