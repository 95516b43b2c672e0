// crates/dnr-replay-core/tests/file_locator.rs
// ============================================================================
// Module: File Locator Tests
// Description: Key classification and file-set validation.
// Purpose: Validate role matching, last-seen-wins, and missing-role failures.
// Dependencies: dnr-replay-core
// ============================================================================

//! File locator integration tests.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

mod common;

use dnr_replay_core::FileRole;
use dnr_replay_core::FileRoleMatches;
use dnr_replay_core::ReplayError;
use dnr_replay_core::ReplayEvent;

use crate::common::Harness;
use crate::common::SENTINEL_MODIFIED;
use crate::common::gz;
use crate::common::id;

#[test]
fn classify_follows_priority_order() {
    assert_eq!(FileRole::classify("2024/abc-request.json"), Some(FileRole::Request));
    assert_eq!(FileRole::classify("2024/abc-request-response.json"), Some(FileRole::Request));
    assert_eq!(FileRole::classify("2024/abc-response.mps"), Some(FileRole::SolutionValues));
    assert_eq!(FileRole::classify("2024/abc-model.mps"), Some(FileRole::ModelDescriptor));
    assert_eq!(FileRole::classify("2024/abc-notes.txt"), None);
}

#[test]
fn only_raw_screen_usage_is_optional() {
    assert!(!FileRole::RawScreenUsage.is_required());
    assert_eq!(
        FileRole::ALL.into_iter().filter(|role| role.is_required()).collect::<Vec<_>>(),
        FileRole::REQUIRED.to_vec()
    );

    let mut matches = FileRoleMatches::new();
    matches.assign(FileRole::Request, "2024/abc-request.json");
    assert_eq!(matches.key(FileRole::Request), Some("2024/abc-request.json"));
    assert_eq!(matches.missing(), vec![FileRole::SolutionValues, FileRole::ModelDescriptor]);

    matches.assign(FileRole::SolutionValues, "2024/abc-response.json");
    matches.assign(FileRole::ModelDescriptor, "2024/abc-model.mps");
    assert!(matches.missing().is_empty());
    let files = matches.complete().unwrap();
    assert_eq!(files.raw_screen_usage, None);
}

#[test]
fn locates_all_roles_under_sentinel_prefix() {
    let harness = Harness::new();
    harness.seed_abc();
    harness.source.insert("2024-03-02/xyz-request.json", gz("{}"), SENTINEL_MODIFIED).unwrap();

    let files = harness.runner().locate(&id("abc"), "2024-03-02").unwrap();

    assert_eq!(files.request, "2024-03-02/abc-request.json");
    assert_eq!(files.solution_values, "2024-03-02/abc-response.json");
    assert_eq!(files.model_descriptor, "2024-03-02/abc-model.mps");
    assert_eq!(files.raw_screen_usage.as_deref(), Some("abc"));
}

#[test]
fn empty_prefix_scans_whole_bucket() {
    let harness = Harness::new();
    harness.seed_abc_artifacts("2023-11-30/");
    let files = harness.runner().locate(&id("abc"), "").unwrap();
    assert_eq!(files.request, "2023-11-30/abc-request.json");
    assert_eq!(files.raw_screen_usage, None);
}

#[test]
fn missing_mandatory_role_fails() {
    let harness = Harness::new();
    harness.source.insert("2024-03-02/abc-request.json", gz("{}"), SENTINEL_MODIFIED).unwrap();
    harness.source.insert("2024-03-02/abc-model.mps", gz("NAME"), SENTINEL_MODIFIED).unwrap();
    harness.source.insert("abc", gz("usage"), SENTINEL_MODIFIED).unwrap();

    let err = harness.runner().locate(&id("abc"), "2024-03-02").unwrap_err();
    match err {
        ReplayError::IncompleteFileSet {
            missing,
            prefix,
            ..
        } => {
            assert_eq!(missing, vec![FileRole::SolutionValues]);
            assert_eq!(prefix, "2024-03-02");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn artifacts_outside_prefix_are_not_found() {
    let harness = Harness::new();
    harness.seed_abc_artifacts("2024-03-01/");
    let err = harness.runner().locate(&id("abc"), "2024-03-02").unwrap_err();
    match err {
        ReplayError::IncompleteFileSet {
            missing, ..
        } => assert_eq!(missing, FileRole::REQUIRED.to_vec()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn raw_screen_usage_is_optional() {
    let harness = Harness::new();
    harness.seed_abc_artifacts("2024-03-02/");
    let files = harness.runner().locate(&id("abc"), "2024-03-02").unwrap();
    assert!(files.raw_screen_usage.is_none());
    assert_eq!(files.entries().len(), 3);
}

#[test]
fn duplicate_matches_keep_last_listed_key() {
    let harness = Harness::new();
    harness.seed_abc();
    harness
        .source
        .insert("2024-03-02/abc-request-retry.json", gz("{}"), SENTINEL_MODIFIED)
        .unwrap();

    let files = harness.runner().locate(&id("abc"), "2024-03-02").unwrap();

    assert_eq!(files.request, "2024-03-02/abc-request.json");
    let duplicate = harness.events.events().into_iter().find_map(|event| match event {
        ReplayEvent::DuplicateRoleMatch {
            role,
            replaced,
            kept,
            ..
        } => Some((role, replaced, kept)),
        _ => None,
    });
    assert_eq!(
        duplicate,
        Some((
            FileRole::Request,
            "2024-03-02/abc-request-retry.json".to_string(),
            "2024-03-02/abc-request.json".to_string(),
        ))
    );
}
