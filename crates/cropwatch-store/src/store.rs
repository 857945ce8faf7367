//! The `ArtifactStore` contract and backend selection.

use std::sync::Arc;

use cropwatch_core::StoreLocation;
use tracing::info;

use crate::dir::DirStore;
use crate::error::StoreResult;
use crate::redb_store::RedbStore;

/// Durable key → bytes storage for materialized artifacts.
///
/// Contract shared by every backend:
///
/// - `put` is atomic: a concurrent or later reader sees either the previous
///   bytes or the new bytes, never a mix.
/// - Writing an existing key replaces it (last write wins).
/// - A missing key is `Ok(None)` from `get`, not an error.
/// - Distinct keys may be written concurrently from many threads.
pub trait ArtifactStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()>;

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove a key. Returns true if it existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// All keys starting with `prefix`, sorted.
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Open the backend named by `location`.
pub fn open(location: &StoreLocation) -> StoreResult<Arc<dyn ArtifactStore>> {
    let store: Arc<dyn ArtifactStore> = match location {
        StoreLocation::Dir { root } => Arc::new(DirStore::open(root)?),
        StoreLocation::Redb { path } => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Arc::new(RedbStore::open(path)?)
        }
        StoreLocation::Memory => Arc::new(RedbStore::open_in_memory()?),
    };
    info!(backend = store.backend(), scheme = location.scheme(), "artifact store opened");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_memory_backend() {
        let store = open(&StoreLocation::Memory).unwrap();
        assert_eq!(store.backend(), "redb");
        assert!(!store.exists("raw/2024-01-01").unwrap());
    }

    #[test]
    fn open_dir_backend_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested/data");
        let store = open(&StoreLocation::Dir { root: root.clone() }).unwrap();
        assert_eq!(store.backend(), "dir");
        assert!(root.is_dir());
    }

    #[test]
    fn open_redb_backend_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/artifacts.redb");
        let store = open(&StoreLocation::Redb { path: path.clone() }).unwrap();
        store.put("raw/2024-01-01", b"{}").unwrap();
        assert!(path.exists());
    }
}
