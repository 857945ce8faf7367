//! redb table definitions for the artifact store.
//!
//! A single table holds every artifact. Keys are the slash paths produced by
//! [`crate::keys`] (`raw/2024-01-01`, `plots/ndvi_2024-01-01.png`), values
//! are the artifact bytes exactly as handed to `put`.

use redb::TableDefinition;

/// Artifact bytes keyed by `{asset}/{partition}` style paths.
pub const ARTIFACTS: TableDefinition<&str, &[u8]> = TableDefinition::new("artifacts");
