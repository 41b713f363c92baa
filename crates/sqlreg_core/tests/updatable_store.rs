use sqlreg_core::{
    ConcurrentStore, InMemoryStore, SqliteStatementStore, StatementStore, StoreError,
    UpdatableStore,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const SEED: [(&str, &str); 3] = [
    ("userAdd", "insert into users"),
    ("userGet", "select * from users where id = ?"),
    ("userUpdate", "update users set level = ?"),
];

fn seed(store: &dyn UpdatableStore) {
    for (key, text) in SEED {
        store.register(key, text).unwrap();
    }
}

fn batch(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(key, text)| (key.to_string(), text.to_string()))
        .collect()
}

fn assert_batch_updates_every_key(store: &dyn UpdatableStore) {
    seed(store);

    store
        .update_batch(&batch(&[("userAdd", "insert v2"), ("userGet", "select v2")]))
        .unwrap();

    assert_eq!(store.find("userAdd").unwrap(), "insert v2");
    assert_eq!(store.find("userGet").unwrap(), "select v2");
    assert_eq!(store.find("userUpdate").unwrap(), SEED[2].1);
}

fn assert_failed_batch_leaves_state_unchanged(store: &dyn UpdatableStore) {
    seed(store);

    // BTreeMap order puts the missing key after two valid ones.
    let err = store
        .update_batch(&batch(&[
            ("userAdd", "changed"),
            ("userGet", "changed"),
            ("userZzz", "changed"),
        ]))
        .unwrap_err();

    assert!(matches!(err, StoreError::BatchUpdateFailed { key } if key == "userZzz"));
    for (key, text) in SEED {
        assert_eq!(store.find(key).unwrap(), text, "{key} was modified");
    }
    assert!(matches!(
        store.find("userZzz"),
        Err(StoreError::NotFound(_))
    ));
}

fn assert_update_one_requires_existing_key(store: &dyn UpdatableStore) {
    seed(store);

    store.update_one("userAdd", "insert v3").unwrap();
    assert_eq!(store.find("userAdd").unwrap(), "insert v3");

    assert!(matches!(
        store.update_one("unknown", "text"),
        Err(StoreError::NotFound(key)) if key == "unknown"
    ));
    assert!(store.find("unknown").is_err());
}

#[test]
fn in_memory_store_batch_semantics() {
    assert_batch_updates_every_key(&InMemoryStore::new());
    assert_failed_batch_leaves_state_unchanged(&InMemoryStore::new());
    assert_update_one_requires_existing_key(&InMemoryStore::new());
}

#[test]
fn concurrent_store_batch_semantics() {
    assert_batch_updates_every_key(&ConcurrentStore::new());
    assert_failed_batch_leaves_state_unchanged(&ConcurrentStore::new());
    assert_update_one_requires_existing_key(&ConcurrentStore::new());
}

#[test]
fn sqlite_store_batch_semantics() {
    assert_batch_updates_every_key(&SqliteStatementStore::open_in_memory().unwrap());
    assert_failed_batch_leaves_state_unchanged(&SqliteStatementStore::open_in_memory().unwrap());
    assert_update_one_requires_existing_key(&SqliteStatementStore::open_in_memory().unwrap());
}

#[test]
fn empty_batch_is_a_no_op() {
    let store = SqliteStatementStore::open_in_memory().unwrap();
    seed(&store);

    store.update_batch(&BTreeMap::new()).unwrap();
    assert_eq!(store.len().unwrap(), SEED.len());
}

#[test]
fn sqlite_store_persists_batches_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sqlmap.db");

    {
        let store = SqliteStatementStore::open(&path).unwrap();
        seed(&store);
        store
            .update_batch(&batch(&[("userUpdate", "update v2")]))
            .unwrap();
        assert!(store
            .update_batch(&batch(&[("userAdd", "lost"), ("zzz", "lost")]))
            .is_err());
    }

    let reopened = SqliteStatementStore::open(&path).unwrap();
    assert_eq!(reopened.find("userUpdate").unwrap(), "update v2");
    assert_eq!(reopened.find("userAdd").unwrap(), SEED[0].1);
    assert_eq!(reopened.len().unwrap(), SEED.len());
}

fn generation(text: &str) -> u32 {
    text.strip_prefix("gen-")
        .and_then(|number| number.parse().ok())
        .unwrap_or_else(|| panic!("unexpected text `{text}`"))
}

/// One writer bumps `a` and `b` together while readers watch.
///
/// Generations only grow and `a` is written before `b`, so a reader that
/// reads `a` then `b` sees `b` behind `a` only if a batch was half applied.
fn assert_readers_never_see_half_a_batch<S>(store: Arc<S>)
where
    S: UpdatableStore + Send + Sync + 'static,
{
    const GENERATIONS: u32 = 300;
    store.register("a", "gen-0").unwrap();
    store.register("b", "gen-0").unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut observed = 0;
                while !done.load(Ordering::Acquire) {
                    let a = generation(&store.find("a").unwrap());
                    let b = generation(&store.find("b").unwrap());
                    assert!(b >= a, "read a=gen-{a} then b=gen-{b}");
                    assert!(a >= observed, "generation went back to {a}");
                    observed = a;
                }
            })
        })
        .collect();

    for next in 1..=GENERATIONS {
        let text = format!("gen-{next}");
        store
            .update_batch(&batch(&[("a", text.as_str()), ("b", text.as_str())]))
            .unwrap();
    }
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(store.find("a").unwrap(), format!("gen-{GENERATIONS}"));
    assert_eq!(store.find("b").unwrap(), format!("gen-{GENERATIONS}"));
}

/// Two writers race batches over the same keys; the survivor is one whole batch.
fn assert_overlapping_batches_do_not_interleave<S>(store: Arc<S>)
where
    S: UpdatableStore + Send + Sync + 'static,
{
    for key in ["a", "b", "c"] {
        store.register(key, "seed").unwrap();
    }

    let writers: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|label| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for round in 0..100 {
                    let text = format!("{label}-{round}");
                    let entries = ["a", "b", "c"].map(|key| (key, text.as_str()));
                    store.update_batch(&batch(&entries)).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let a = store.find("a").unwrap();
    assert!(a == "left-99" || a == "right-99", "unexpected final text {a}");
    assert_eq!(store.find("b").unwrap(), a);
    assert_eq!(store.find("c").unwrap(), a);
}

#[test]
fn concurrent_store_batches_are_atomic_for_readers() {
    assert_readers_never_see_half_a_batch(Arc::new(ConcurrentStore::new()));
}

#[test]
fn sqlite_store_batches_are_atomic_for_readers() {
    assert_readers_never_see_half_a_batch(Arc::new(
        SqliteStatementStore::open_in_memory().unwrap(),
    ));
}

#[test]
fn concurrent_store_overlapping_batches_keep_one_winner() {
    assert_overlapping_batches_do_not_interleave(Arc::new(ConcurrentStore::new()));
}

#[test]
fn sqlite_store_overlapping_batches_keep_one_winner() {
    assert_overlapping_batches_do_not_interleave(Arc::new(
        SqliteStatementStore::open_in_memory().unwrap(),
    ));
}
