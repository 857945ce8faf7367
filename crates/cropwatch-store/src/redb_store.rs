//! RedbStore: redb-backed artifact persistence.
//!
//! Every artifact lives in one `&str → &[u8]` table. Each `put` runs in its
//! own write transaction, so the commit is the unit of atomicity and readers
//! never observe a half-written value. The store supports both on-disk and
//! in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::keys::validate_key;
use crate::store::ArtifactStore;
use crate::tables::ARTIFACTS;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Thread-safe artifact store backed by redb.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "redb artifact store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory artifact store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }
}

impl ArtifactStore for RedbStore {
    fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        validate_key(key)?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
            table.insert(key, bytes).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, bytes = bytes.len(), "artifact stored");
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
        let value = table.get(key).map_err(map_err!(Read))?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
        Ok(table.get(key).map_err(map_err!(Read))?.is_some())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, "artifact deleted");
        Ok(existed)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, _) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(prefix) {
                results.push(key.value().to_string());
            }
        }
        Ok(results)
    }

    fn backend(&self) -> &'static str {
        "redb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_get() {
        let store = RedbStore::open_in_memory().unwrap();
        store.put("raw/2024-01-01", b"hello").unwrap();
        assert_eq!(store.get("raw/2024-01-01").unwrap().as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let store = RedbStore::open_in_memory().unwrap();
        assert!(store.get("raw/2024-01-01").unwrap().is_none());
        assert!(!store.exists("raw/2024-01-01").unwrap());
    }

    #[test]
    fn overwrite_is_last_write_wins() {
        let store = RedbStore::open_in_memory().unwrap();
        store.put("change/2024-01-02", b"first").unwrap();
        store.put("change/2024-01-02", b"second").unwrap();
        assert_eq!(
            store.get("change/2024-01-02").unwrap().as_deref(),
            Some(&b"second"[..])
        );
    }

    #[test]
    fn delete() {
        let store = RedbStore::open_in_memory().unwrap();
        store.put("raw/2024-01-01", b"x").unwrap();
        assert!(store.delete("raw/2024-01-01").unwrap());
        assert!(!store.delete("raw/2024-01-01").unwrap());
        assert!(!store.exists("raw/2024-01-01").unwrap());
    }

    #[test]
    fn list_by_prefix_is_sorted() {
        let store = RedbStore::open_in_memory().unwrap();
        store.put("raw/2024-01-02", b"b").unwrap();
        store.put("raw/2024-01-01", b"a").unwrap();
        store.put("change/2024-01-02", b"c").unwrap();
        assert_eq!(
            store.list("raw/").unwrap(),
            vec!["raw/2024-01-01".to_string(), "raw/2024-01-02".to_string()]
        );
        assert_eq!(store.list("").unwrap().len(), 3);
    }

    #[test]
    fn rejects_invalid_keys() {
        let store = RedbStore::open_in_memory().unwrap();
        assert!(matches!(
            store.put("../escape", b"x"),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("artifacts.redb");

        {
            let store = RedbStore::open(&db_path).unwrap();
            store.put("raw/2024-01-01", b"persisted").unwrap();
        }

        // Reopen the same database file.
        let store = RedbStore::open(&db_path).unwrap();
        assert_eq!(
            store.get("raw/2024-01-01").unwrap().as_deref(),
            Some(&b"persisted"[..])
        );
    }
}
