//! Integration tests for memvault-store
//!
//! These tests verify the full record lifecycle against a real SQLite
//! database: insert, duplicate rejection, lookup, search, and revocation.

use chrono::{TimeZone, Utc};
use memvault_domain::traits::{FactQuery, FactStore, RevokeOutcome, StoreError};
use memvault_domain::{FactId, FactRecord, SourceType};

fn record(content: &str, source_id: &str, recorded_by: &str, created_secs: i64) -> FactRecord {
    FactRecord {
        id: FactId::new(),
        content: content.to_string(),
        source_type: SourceType::Document,
        source_id: source_id.to_string(),
        recorded_by: recorded_by.to_string(),
        created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        signature: vec![7u8; 32],
        revocation: None,
    }
}

#[test]
fn test_store_initialization() {
    let store = memvault_store::SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_store_initialization_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("facts.db");
    let store = memvault_store::SqliteStore::new(&path);
    assert!(store.is_ok());
    assert!(path.exists());
}

#[test]
fn test_insert_and_get() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    let rec = record("Paris is the capital of France", "doc:42", "ingest-1", 1_700_000_000);

    store.insert(&rec).unwrap();

    let retrieved = store.get(rec.id).unwrap().expect("record should exist");
    assert_eq!(retrieved, rec);
    assert!(!retrieved.is_revoked());
}

#[test]
fn test_get_unknown_id_is_none() {
    let store = memvault_store::SqliteStore::new(":memory:").unwrap();
    assert!(store.get(FactId::new()).unwrap().is_none());
}

#[test]
fn test_duplicate_triple_rejected_atomically() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    let first = record("same claim", "src:1", "agent-a", 1_700_000_000);
    store.insert(&first).unwrap();

    // Same (content, source_id, recorded_by) triple, different id and time
    let mut second = record("same claim", "src:1", "agent-a", 1_700_000_500);
    second.source_type = SourceType::UserInput;

    let err = store.insert(&second).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate));

    // The first record is untouched
    assert_eq!(store.get(first.id).unwrap().unwrap(), first);
}

#[test]
fn test_distinct_triples_coexist() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    store.insert(&record("claim", "src:1", "agent-a", 1)).unwrap();
    store.insert(&record("claim", "src:1", "agent-b", 2)).unwrap();
    store.insert(&record("claim", "src:2", "agent-a", 3)).unwrap();
    store.insert(&record("other", "src:1", "agent-a", 4)).unwrap();

    let page = store.search(&FactQuery { size: 50, ..Default::default() }).unwrap();
    assert_eq!(page.total, 4);
}

#[test]
fn test_batch_is_all_or_nothing() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    store.insert(&record("existing", "src:1", "agent-a", 1)).unwrap();

    let batch = vec![
        record("new-one", "src:1", "agent-a", 2),
        record("existing", "src:1", "agent-a", 3), // duplicate, aborts the batch
        record("new-two", "src:1", "agent-a", 4),
    ];
    let err = store.insert_batch(&batch).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate));

    // Nothing from the batch was written, including the row before the failure
    let page = store.search(&FactQuery { size: 50, ..Default::default() }).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].content, "existing");
}

#[test]
fn test_batch_commit() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    let batch = vec![
        record("one", "src:1", "agent-a", 1),
        record("two", "src:1", "agent-a", 2),
    ];
    store.insert_batch(&batch).unwrap();

    for rec in &batch {
        assert!(store.get(rec.id).unwrap().is_some());
    }
}

#[test]
fn test_search_filters_are_conjunctive() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    store.insert(&record("a", "src:1", "agent-a", 10)).unwrap();
    store.insert(&record("b", "src:1", "agent-b", 20)).unwrap();
    store.insert(&record("c", "src:2", "agent-a", 30)).unwrap();

    let page = store
        .search(&FactQuery {
            source_id: Some("src:1".to_string()),
            recorded_by: Some("agent-a".to_string()),
            size: 50,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].content, "a");
}

#[test]
fn test_search_date_bounds_are_inclusive() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    store.insert(&record("before", "src:1", "agent-a", 99)).unwrap();
    store.insert(&record("on-from", "src:1", "agent-a", 100)).unwrap();
    store.insert(&record("inside", "src:1", "agent-a", 150)).unwrap();
    store.insert(&record("on-to", "src:1", "agent-a", 200)).unwrap();
    store.insert(&record("after", "src:1", "agent-a", 201)).unwrap();

    let page = store
        .search(&FactQuery {
            from_date: Some(Utc.timestamp_opt(100, 0).unwrap()),
            to_date: Some(Utc.timestamp_opt(200, 0).unwrap()),
            size: 50,
            ..Default::default()
        })
        .unwrap();

    let mut contents: Vec<_> = page.items.iter().map(|r| r.content.as_str()).collect();
    contents.sort_unstable();
    assert_eq!(contents, vec!["inside", "on-from", "on-to"]);
}

#[test]
fn test_search_by_source_type() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    let mut inferred = record("guessed", "src:1", "agent-a", 1);
    inferred.source_type = SourceType::AgentInference;
    store.insert(&inferred).unwrap();
    store.insert(&record("read", "src:1", "agent-a", 2)).unwrap();

    let page = store
        .search(&FactQuery {
            source_type: Some(SourceType::AgentInference),
            size: 50,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].content, "guessed");
}

#[test]
fn test_search_pagination_is_stable() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    for i in 0..25 {
        store
            .insert(&record(&format!("claim-{i}"), "src:1", "agent-a", i))
            .unwrap();
    }

    let first = store.search(&FactQuery { page: 0, size: 10, ..Default::default() }).unwrap();
    let second = store.search(&FactQuery { page: 1, size: 10, ..Default::default() }).unwrap();
    let third = store.search(&FactQuery { page: 2, size: 10, ..Default::default() }).unwrap();

    assert_eq!(first.total, 25);
    assert_eq!(first.items.len(), 10);
    assert_eq!(second.items.len(), 10);
    assert_eq!(third.items.len(), 5);

    // Re-running the same query yields the same page
    let first_again = store.search(&FactQuery { page: 0, size: 10, ..Default::default() }).unwrap();
    assert_eq!(first.items, first_again.items);

    // No record appears on two pages
    let mut all: Vec<_> = first
        .items
        .iter()
        .chain(&second.items)
        .chain(&third.items)
        .map(|r| r.id)
        .collect();
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), 25);
}

#[test]
fn test_search_huge_page_number_is_an_empty_page() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    store.insert(&record("claim", "src:1", "agent-a", 1)).unwrap();

    // page * size would overflow usize; the offset must saturate past the
    // end of the table instead of panicking or wrapping back to page 0
    let page = store
        .search(&FactQuery { page: usize::MAX, size: 2, ..Default::default() })
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 1);

    let page = store
        .search(&FactQuery { page: usize::MAX, size: usize::MAX, ..Default::default() })
        .unwrap();
    assert!(page.items.is_empty());
}

#[test]
fn test_revoke_lifecycle() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    let rec = record("to revoke", "src:1", "agent-a", 1_700_000_000);
    store.insert(&rec).unwrap();

    let when = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
    let outcome = store.revoke(rec.id, "found to be false", when).unwrap();
    assert_eq!(outcome, RevokeOutcome::Revoked);

    let retrieved = store.get(rec.id).unwrap().unwrap();
    let revocation = retrieved.revocation.expect("should carry overlay");
    assert_eq!(revocation.reason, "found to be false");
    assert_eq!(revocation.revoked_at, when);
}

#[test]
fn test_revoke_is_first_wins() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    let rec = record("to revoke", "src:1", "agent-a", 1_700_000_000);
    store.insert(&rec).unwrap();

    let first = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
    let second = Utc.timestamp_opt(1_700_000_200, 0).unwrap();

    assert_eq!(store.revoke(rec.id, "first reason", first).unwrap(), RevokeOutcome::Revoked);
    assert_eq!(
        store.revoke(rec.id, "second reason", second).unwrap(),
        RevokeOutcome::AlreadyRevoked
    );

    // The first writer's reason and timestamp are retained
    let revocation = store.get(rec.id).unwrap().unwrap().revocation.unwrap();
    assert_eq!(revocation.reason, "first reason");
    assert_eq!(revocation.revoked_at, first);
}

#[test]
fn test_revoke_unknown_id() {
    let mut store = memvault_store::SqliteStore::new(":memory:").unwrap();
    let outcome = store
        .revoke(FactId::new(), "reason", Utc.timestamp_opt(0, 0).unwrap())
        .unwrap();
    assert_eq!(outcome, RevokeOutcome::NotFound);
}
