//! cropwatch-pipeline: the partitioned computation engine.
//!
//! For every daily partition the [`RawMetricsUnit`] turns the field catalog
//! and synthetic observations into per-field statistics, and the
//! [`ChangeAnalysisUnit`] compares them with the previous day. The
//! [`Pipeline`] is the single trigger surface; [`backfill`] drives it over
//! a date range.
//!
//! ```text
//! Catalog ──► ObservationGenerator ──► summarize ──► raw/{date}
//!                                                       │
//!                               raw/{date - 1} ─────────┴──► change/{date}
//! ```

pub mod artifact;
pub mod backfill;
pub mod catalog;
pub mod change;
pub mod codec;
pub mod error;
pub mod observe;
pub mod pipeline;
pub mod raw;
pub mod stats;

pub use artifact::{
    ChangeArtifact, ChangeRecord, FORMAT_VERSION, FieldGrowth, RawArtifact, RawMetricsRecord,
    UnitState,
};
pub use backfill::{BackfillEntry, BackfillReport, backfill};
pub use catalog::{Catalog, CatalogDocument, CatalogError, FallbackSpec, FieldDocument};
pub use change::{ChangeAnalysisUnit, ChangeOutcome};
pub use error::{PipelineError, PipelineResult};
pub use observe::ObservationGenerator;
pub use pipeline::{HookResult, MaterializeHook, MaterializeReport, Pipeline};
pub use raw::{RawMetricsUnit, StoredArtifact};
pub use stats::{FieldStats, summarize};
