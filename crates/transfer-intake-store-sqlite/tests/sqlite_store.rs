// crates/transfer-intake-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Intake Store Tests
// Description: Validate durable submission and counter store behavior.
// Purpose: Ensure persistence, integrity checks, and atomic increments.
// Dependencies: transfer-intake-store-sqlite, transfer-intake-core, rusqlite,
//               tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed intake store. Exercises record
//! round trips, merge-patch semantics, integrity failures under tampered
//! storage, counter persistence across reopen, and pagination.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use transfer_intake_core::Bucket;
use transfer_intake_core::CounterKey;
use transfer_intake_core::FormMode;
use transfer_intake_core::HashSecret;
use transfer_intake_core::ListRequest;
use transfer_intake_core::RateLimitCounter;
use transfer_intake_core::RateLimitStore;
use transfer_intake_core::StoreError;
use transfer_intake_core::StudyLevel;
use transfer_intake_core::Submission;
use transfer_intake_core::SubmissionFields;
use transfer_intake_core::SubmissionId;
use transfer_intake_core::SubmissionPatch;
use transfer_intake_core::SubmissionStore;
use transfer_intake_store_sqlite::SqliteIntakeStore;
use transfer_intake_store_sqlite::SqliteStoreConfig;
use transfer_intake_store_sqlite::SqliteStoreMode;
use transfer_intake_store_sqlite::SqliteSyncMode;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn store_for(path: &std::path::Path) -> SqliteIntakeStore {
    let config = SqliteStoreConfig {
        path: path.to_path_buf(),
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    };
    SqliteIntakeStore::new(config).expect("store init")
}

fn sample_submission(id: &str, created_at: i64) -> Submission {
    Submission {
        id: SubmissionId::from(id),
        mode: FormMode::Full,
        created_at,
        ip_hash: "a".repeat(64),
        user_agent: Some("intake-tests/1.0".to_string()),
        fields: SubmissionFields {
            full_name: Some("Alice Example".to_string()),
            phone: Some("+15550100100".to_string()),
            address: Some("1 Campus Way, Springfield".to_string()),
            consent: Some(true),
            ..SubmissionFields::default()
        },
    }
}

fn counter_key(identifier: &str) -> CounterKey {
    CounterKey::derive(Bucket::Ip, identifier, &HashSecret::new("store-test-secret"))
}

// ============================================================================
// SECTION: Submission Tests
// ============================================================================

#[test]
fn submission_roundtrip_preserves_the_record() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    let submission = sample_submission("sub-1", 1_700_000_000_000);

    store.create(&submission).expect("create");
    let loaded = store.load(&submission.id).expect("load").expect("record present");
    assert_eq!(loaded, submission);
}

#[test]
fn duplicate_identifiers_are_rejected() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    let submission = sample_submission("sub-1", 1_700_000_000_000);

    store.create(&submission).expect("create");
    let error = store.create(&submission).unwrap_err();
    assert!(matches!(error, StoreError::Invalid(_)));
}

#[test]
fn patch_merges_disjoint_fields_without_clobbering() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    let submission = sample_submission("sub-1", 1_700_000_000_000);
    store.create(&submission).expect("create");

    let study = SubmissionPatch {
        study_level: Some(StudyLevel::Undergraduate),
        ..SubmissionPatch::default()
    };
    let major = SubmissionPatch {
        major: Some("Computer Science".to_string()),
        ..SubmissionPatch::default()
    };
    store.patch(&submission.id, &study, 1_700_000_001_000).expect("patch").expect("present");
    let merged = store
        .patch(&submission.id, &major, 1_700_000_002_000)
        .expect("patch")
        .expect("present");

    assert_eq!(merged.fields.full_name.as_deref(), Some("Alice Example"));
    assert_eq!(merged.fields.address.as_deref(), Some("1 Campus Way, Springfield"));
    assert_eq!(merged.fields.study_level, Some(StudyLevel::Undergraduate));
    assert_eq!(merged.fields.major.as_deref(), Some("Computer Science"));
    assert_eq!(merged.fields.previous_gpa, None);

    let reloaded = store.load(&submission.id).expect("load").expect("present");
    assert_eq!(reloaded.fields, merged.fields);
}

#[test]
fn patch_against_missing_record_returns_none() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    let result = store
        .patch(&SubmissionId::from("missing"), &SubmissionPatch::default(), 0)
        .expect("patch call");
    assert!(result.is_none());
}

#[test]
fn tampered_payloads_fail_closed() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("intake.sqlite");
    let store = store_for(&path);
    let submission = sample_submission("sub-1", 1_700_000_000_000);
    store.create(&submission).expect("create");
    drop(store);

    let connection = rusqlite::Connection::open(&path).unwrap();
    connection
        .execute(
            "UPDATE submissions SET record_json = ?1 WHERE id = ?2",
            rusqlite::params![b"{}".to_vec(), "sub-1"],
        )
        .unwrap();
    drop(connection);

    let reopened = store_for(&path);
    let error = reopened.load(&submission.id).unwrap_err();
    assert!(matches!(error, StoreError::Corrupt(_)));
}

#[test]
fn delete_removes_the_record() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    let submission = sample_submission("sub-1", 1_700_000_000_000);
    store.create(&submission).expect("create");

    assert!(store.delete(&submission.id).expect("delete"));
    assert!(store.load(&submission.id).expect("load").is_none());
    assert!(!store.delete(&submission.id).expect("second delete"));
}

#[test]
fn list_pages_newest_first_with_cursor() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    for index in 0..5_i64 {
        let mut submission =
            sample_submission(&format!("sub-{index}"), 1_700_000_000_000 + index);
        if index % 2 == 0 {
            submission.mode = FormMode::Partial;
        }
        store.create(&submission).expect("create");
    }

    let first_page = store
        .list(&ListRequest {
            cursor: None,
            limit: 2,
            mode: None,
        })
        .expect("list");
    assert_eq!(first_page.items.len(), 2);
    assert_eq!(first_page.items[0].id.as_str(), "sub-4");
    assert_eq!(first_page.items[1].id.as_str(), "sub-3");

    let second_page = store
        .list(&ListRequest {
            cursor: first_page.next_token.clone(),
            limit: 2,
            mode: None,
        })
        .expect("list");
    assert_eq!(second_page.items[0].id.as_str(), "sub-2");

    let partial_only = store
        .list(&ListRequest {
            cursor: None,
            limit: 10,
            mode: Some(FormMode::Partial),
        })
        .expect("list");
    assert!(partial_only.items.iter().all(|record| record.mode == FormMode::Partial));
    assert_eq!(partial_only.items.len(), 3);
}

// ============================================================================
// SECTION: Counter Tests
// ============================================================================

#[test]
fn counter_put_and_load_roundtrip() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    let key = counter_key("203.0.113.7");
    let counter = RateLimitCounter {
        count: 7,
        window_start: 1_700_000_000_000,
    };

    store.put(&key, &counter).expect("put");
    let loaded = store.get(&key).expect("load").expect("counter present");
    assert_eq!(loaded, counter);
}

#[test]
fn increment_creates_at_one_and_advances() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    let key = counter_key("203.0.113.7");

    let first = store.increment(&key, 1_700_000_000_000).expect("increment");
    assert_eq!(first.count, 1);
    assert_eq!(first.window_start, 1_700_000_000_000);

    let second = store.increment(&key, 1_700_000_999_999).expect("increment");
    assert_eq!(second.count, 2);
    assert_eq!(second.window_start, 1_700_000_000_000);
}

#[test]
fn counters_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("intake.sqlite");
    let key = counter_key("203.0.113.7");
    {
        let store = store_for(&path);
        store.increment(&key, 1_700_000_000_000).expect("increment");
        store.increment(&key, 1_700_000_000_001).expect("increment");
    }

    let reopened = store_for(&path);
    let loaded = reopened.get(&key).expect("load").expect("counter present");
    assert_eq!(loaded.count, 2);
    let advanced = reopened.increment(&key, 1_700_000_000_002).expect("increment");
    assert_eq!(advanced.count, 3);
}

#[test]
fn sweep_removes_only_stale_counters() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    let stale = counter_key("203.0.113.7");
    let live = counter_key("203.0.113.8");
    store
        .put(&stale, &RateLimitCounter {
            count: 3,
            window_start: 1_000,
        })
        .expect("put stale");
    store
        .put(&live, &RateLimitCounter {
            count: 3,
            window_start: 2_000,
        })
        .expect("put live");

    let removed = store.sweep_expired(2_000).expect("sweep");
    assert_eq!(removed, 1);
    assert!(store.get(&stale).expect("load").is_none());
    assert!(store.get(&live).expect("load").is_some());
}

#[test]
fn readiness_probe_succeeds_on_initialized_store() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("intake.sqlite"));
    assert!(store.readiness().is_ok());
}
