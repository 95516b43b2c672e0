// crates/dnr-replay-core/tests/orchestrator.rs
// ============================================================================
// Module: Run Orchestrator Tests
// Description: End-to-end replay scenarios against in-memory backends.
// Purpose: Validate step sequencing and the skip-download path.
// Dependencies: dnr-replay-core
// ============================================================================

//! Run orchestrator integration tests.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

mod common;

use std::fs;

use dnr_replay_core::FileRole;
use dnr_replay_core::ReplayError;
use dnr_replay_core::RunRequest;
use dnr_replay_core::SearchScope;

use crate::common::Harness;
use crate::common::id;

#[test]
fn run_replays_sentinel_scoped_run_end_to_end() {
    let harness = Harness::new();
    harness.seed_abc();
    let runner = harness.runner();

    let returned = runner.run(&RunRequest::new(id("abc"))).unwrap();

    assert_eq!(returned, id("abc"));
    assert_eq!(fs::read_dir(harness.root.path().join("abc")).unwrap().count(), 4);
    assert_eq!(harness.solver.submissions().len(), 1);
    assert!(harness.destination.object("new-run-1").is_some());
}

#[test]
fn run_with_hint_scopes_to_current_period() {
    let harness = Harness::new();
    harness.seed_abc_artifacts("2024-07-15/");
    let runner = harness.runner();

    let request = RunRequest {
        scope_hint: Some(SearchScope::Month),
        ..RunRequest::new(id("abc"))
    };
    runner.run(&request).unwrap();

    assert!(runner.local().file_path(&id("abc"), FileRole::Request).is_file());
    assert_eq!(harness.destination.put_count(), 0);
}

#[test]
fn run_with_explicit_prefix_uses_it() {
    let harness = Harness::new();
    harness.seed_abc_artifacts("archive/2022/");
    harness.seed_abc_artifacts("2024-03-02/");
    let runner = harness.runner();

    let request = RunRequest {
        prefix: Some("archive/".to_string()),
        ..RunRequest::new(id("abc"))
    };
    runner.run(&request).unwrap();

    assert!(harness.root.path().join("abc").join("model.mps").is_file());
}

#[test]
fn skip_download_reuses_local_run_directory() {
    let harness = Harness::new();
    harness.seed_abc();
    let runner = harness.runner();
    runner.run(&RunRequest::new(id("abc"))).unwrap();

    let request = RunRequest {
        skip_download: true,
        ..RunRequest::new(id("abc"))
    };
    runner.run(&request).unwrap();

    assert_eq!(harness.solver.submissions().len(), 2);
    assert_eq!(harness.destination.put_count(), 2);
}

#[test]
fn skip_download_without_local_files_fails() {
    let harness = Harness::new();
    harness.seed_abc();
    let request = RunRequest {
        skip_download: true,
        ..RunRequest::new(id("abc"))
    };

    let err = harness.runner().run(&request).unwrap_err();

    assert!(matches!(err, ReplayError::LocalIo { .. }));
    assert!(harness.solver.submissions().is_empty());
}

#[test]
fn incomplete_file_set_aborts_before_solving() {
    let harness = Harness::new();
    let err = harness.runner().run(&RunRequest::new(id("abc"))).unwrap_err();
    assert!(matches!(err, ReplayError::IncompleteFileSet { .. }));
    assert!(harness.solver.submissions().is_empty());
}
