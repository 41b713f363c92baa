use serde_json::json;
use sqlreg_core::{
    ConcurrentStore, InMemoryStore, JsonStatementSource, LoadError, SourceError,
    SqliteStatementStore, StatementLoader, StatementService, StoreError, VecStatementSource,
};
use std::error::Error;
use std::io::Write;

fn write_source(value: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(value.to_string().as_bytes()).unwrap();
    file
}

#[test]
fn loaded_statements_resolve_through_service() {
    let source = VecStatementSource::new([("k1", "v1"), ("k2", "v2")]);
    let service = StatementService::initialize(source, ConcurrentStore::new()).unwrap();

    assert_eq!(service.get_statement("k1").unwrap(), "v1");
    assert_eq!(service.get_statement("k2").unwrap(), "v2");
}

#[test]
fn missing_key_is_a_retrieval_failure() {
    let source = VecStatementSource::new([("k1", "v1")]);
    let service = StatementService::initialize(source, InMemoryStore::new()).unwrap();

    let err = service.get_statement("missing").unwrap_err();
    assert_eq!(err.key(), "missing");
    assert!(matches!(err.cause(), StoreError::NotFound(_)));
    assert!(err.source().is_some());
    assert!(err.to_string().contains("missing"));
}

#[test]
fn retrieval_failure_is_the_same_kind_for_every_backend() {
    let pairs = [("userGet", "select")];
    let memory = StatementService::initialize(VecStatementSource::new(pairs), InMemoryStore::new())
        .unwrap();
    let sqlite = StatementService::initialize(
        VecStatementSource::new(pairs),
        SqliteStatementStore::open_in_memory().unwrap(),
    )
    .unwrap();

    let from_memory = memory.get_statement("absent").unwrap_err();
    let from_sqlite = sqlite.get_statement("absent").unwrap_err();
    assert_eq!(from_memory.key(), from_sqlite.key());
    assert_eq!(sqlite.get_statement("userGet").unwrap(), "select");
}

#[test]
fn json_source_loads_in_declaration_order() {
    let file = write_source(&json!({
        "statements": [
            { "key": "userAdd", "text": "insert v1" },
            { "key": "userGet", "text": "select" },
            { "key": "userAdd", "text": "insert v2" }
        ]
    }));
    let store = SqliteStatementStore::open_in_memory().unwrap();

    let count = StatementLoader::new(JsonStatementSource::new(file.path()))
        .load_into(&store)
        .unwrap();

    assert_eq!(count, 3);
    assert_eq!(store.len().unwrap(), 2);
    let service = StatementService::new(store);
    assert_eq!(service.get_statement("userAdd").unwrap(), "insert v2");
}

#[test]
fn empty_json_source_is_fatal() {
    let file = write_source(&json!({ "statements": [] }));

    let result = StatementService::initialize(
        JsonStatementSource::new(file.path()),
        ConcurrentStore::new(),
    );
    assert!(matches!(result, Err(LoadError::Empty { .. })));
}

#[test]
fn unreadable_or_malformed_source_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    let missing_result =
        StatementService::initialize(JsonStatementSource::new(&missing), ConcurrentStore::new());
    assert!(matches!(
        missing_result,
        Err(LoadError::Source(SourceError::Io { .. }))
    ));

    let file = write_source(&json!({ "entries": [{ "key": "k" }] }));
    let malformed_result =
        StatementService::initialize(JsonStatementSource::new(file.path()), ConcurrentStore::new());
    assert!(matches!(
        malformed_result,
        Err(LoadError::Source(SourceError::Parse { .. }))
    ));
}
