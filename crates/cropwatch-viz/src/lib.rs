//! cropwatch-viz: PNG plots for materialized artifacts.
//!
//! Rendering is pure (artifact in, image out); [`PlotPublisher`] plugs it
//! into the pipeline as a post-materialization hook and stores the images
//! under the `plots/` prefix.

pub mod colormap;
pub mod error;
pub mod publisher;
pub mod raster;
pub mod summary;

pub use colormap::Colormap;
pub use error::{VizError, VizResult};
pub use publisher::PlotPublisher;
pub use raster::{RasterStyle, encode_png, render_metric};
pub use summary::render_field_summary;
