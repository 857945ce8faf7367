//! cropwatch.toml configuration parser.
//!
//! Every section is optional; missing values fall back to the defaults
//! below so an empty file (or no file at all) yields a runnable pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::location::StoreLocation;
use crate::types::{BoundingBox, DEFAULT_START_DATE, PartitionKey};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropwatchConfig {
    pub pipeline: PipelineConfig,
    pub catalog: CatalogConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// First valid partition key.
    pub start_date: PartitionKey,
    /// Analysis region, used when the catalog document carries none.
    pub bbox: BoundingBox,
    /// Pixel edge length in coordinate units.
    pub resolution: f64,
    /// Upper bound on sampled pixels per field and metric.
    pub max_pixels_per_field: usize,
    /// Concurrent materializations during a backfill.
    pub parallelism: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            start_date: PartitionKey::new(DEFAULT_START_DATE),
            bbox: BoundingBox::default(),
            resolution: 0.01,
            max_pixels_per_field: 400,
            parallelism: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog document path; `None` goes straight to the synthetic fallback.
    pub path: Option<PathBuf>,
    /// Number of fields generated when the catalog is unavailable.
    pub fallback_fields: usize,
    pub fallback_seed: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("field_definitions.json")),
            fallback_fields: 8,
            fallback_seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `file://<dir>`, `redb://<file>`, or a bare directory path.
    pub uri: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "file://./data".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn location(&self) -> Result<StoreLocation, crate::location::LocationError> {
        StoreLocation::parse(&self.uri)
    }
}

impl CropwatchConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: CropwatchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let p = &self.pipeline;
        anyhow::ensure!(
            p.resolution.is_finite() && p.resolution > 0.0,
            "pipeline.resolution must be positive, got {}",
            p.resolution
        );
        anyhow::ensure!(p.max_pixels_per_field > 0, "pipeline.max_pixels_per_field must be > 0");
        anyhow::ensure!(p.parallelism > 0, "pipeline.parallelism must be > 0");
        self.store.location()?;
        Ok(())
    }
}
