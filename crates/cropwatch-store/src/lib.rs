//! cropwatch-store: durable artifact storage for cropwatch.
//!
//! Maps `(asset, partition)` keys to opaque byte blobs with last-write-wins,
//! atomic-put semantics. Two backends implement [`ArtifactStore`]:
//!
//! - [`RedbStore`]: embedded [redb](https://docs.rs/redb) database, one
//!   write transaction per put; also available in-memory for tests.
//! - [`DirStore`]: a directory tree laid out exactly like the key scheme,
//!   written via temp-file + rename.
//!
//! Both are `Send + Sync` and can be shared behind an `Arc` across threads.

pub mod dir;
pub mod error;
pub mod keys;
pub mod redb_store;
pub mod store;
pub mod tables;

pub use dir::DirStore;
pub use error::{StoreError, StoreResult};
pub use keys::{artifact_key, field_summary_key, raster_plot_key, tabular_key};
pub use redb_store::RedbStore;
pub use store::{ArtifactStore, open};
