//! Backend contract tests.
//!
//! Runs the same checks against every `ArtifactStore` implementation.

use std::sync::Arc;
use std::thread;

use cropwatch_store::{ArtifactStore, DirStore, RedbStore};

fn backends() -> Vec<(tempfile::TempDir, Arc<dyn ArtifactStore>)> {
    let dir_root = tempfile::tempdir().unwrap();
    let dir_store: Arc<dyn ArtifactStore> = Arc::new(DirStore::open(dir_root.path()).unwrap());

    let redb_root = tempfile::tempdir().unwrap();
    let redb_store: Arc<dyn ArtifactStore> =
        Arc::new(RedbStore::open(&redb_root.path().join("a.redb")).unwrap());

    vec![(dir_root, dir_store), (redb_root, redb_store)]
}

#[test]
fn get_put_exists_roundtrip() {
    for (_guard, store) in backends() {
        assert!(!store.exists("raw/2024-01-01").unwrap(), "{}", store.backend());
        store.put("raw/2024-01-01", b"payload").unwrap();
        assert!(store.exists("raw/2024-01-01").unwrap());
        assert_eq!(store.get("raw/2024-01-01").unwrap().unwrap(), b"payload");
    }
}

#[test]
fn distinct_keys_written_concurrently() {
    for (_guard, store) in backends() {
        let handles: Vec<_> = (1..=16)
            .map(|day| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let key = format!("raw/2024-01-{day:02}");
                    store.put(&key, key.as_bytes()).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let keys = store.list("raw/").unwrap();
        assert_eq!(keys.len(), 16, "{}", store.backend());
        for key in keys {
            assert_eq!(store.get(&key).unwrap().unwrap(), key.as_bytes());
        }
    }
}

#[test]
fn same_key_races_never_interleave() {
    for (_guard, store) in backends() {
        let a = vec![b'a'; 64 * 1024];
        let b = vec![b'b'; 64 * 1024];
        let handles: Vec<_> = [a.clone(), b.clone()]
            .into_iter()
            .cycle()
            .take(8)
            .map(|payload| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.put("change/2024-01-02", &payload).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let got = store.get("change/2024-01-02").unwrap().unwrap();
        assert!(got == a || got == b, "{} produced a mixed artifact", store.backend());
    }
}
