//! cropwatch-core: shared vocabulary for the cropwatch pipeline.
//!
//! Holds the domain types every other crate speaks (bounding box, fields,
//! partition keys, metrics, assets), the `geo`-backed geometry helpers,
//! `cropwatch.toml` parsing, and store location URIs.

pub mod config;
pub mod geometry;
pub mod location;
pub mod types;

pub use config::CropwatchConfig;
pub use geometry::PixelGrid;
pub use location::{LocationError, StoreLocation};
pub use types::*;
