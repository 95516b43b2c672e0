// crates/dnr-replay-core/tests/scope_resolver.rs
// ============================================================================
// Module: Scope Resolver Tests
// Description: Prefix derivation from sentinel, hint, and explicit inputs.
// Purpose: Validate the sentinel > hint > unscoped precedence.
// Dependencies: dnr-replay-core
// ============================================================================

//! Scope resolver integration tests.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

mod common;

use dnr_replay_core::ReplayError;
use dnr_replay_core::ReplayEvent;
use dnr_replay_core::ReplayOptions;
use dnr_replay_core::SearchScope;
use dnr_replay_core::SentinelMode;
use dnr_replay_core::runtime::ScopeSource;

use crate::common::Harness;
use crate::common::SENTINEL_MODIFIED;
use crate::common::gz;
use crate::common::id;

#[test]
fn sentinel_date_wins_over_any_hint() {
    let harness = Harness::new();
    harness.source.insert("abc", gz("usage"), SENTINEL_MODIFIED).unwrap();
    let runner = harness.runner();

    for hint in [None, Some(SearchScope::Year), Some(SearchScope::Month), Some(SearchScope::Day)] {
        let scope = runner.resolve_scope(&id("abc"), hint, None).unwrap();
        assert_eq!(scope.prefix, "2024-03-02");
        assert_eq!(scope.source, ScopeSource::Sentinel);
    }
}

#[test]
fn missing_sentinel_uses_current_time_at_hinted_granularity() {
    let harness = Harness::new();
    let runner = harness.runner();

    let year = runner.resolve_scope(&id("abc"), Some(SearchScope::Year), None).unwrap();
    let month = runner.resolve_scope(&id("abc"), Some(SearchScope::Month), None).unwrap();
    let day = runner.resolve_scope(&id("abc"), Some(SearchScope::Day), None).unwrap();

    assert_eq!(year.prefix, "2024");
    assert_eq!(month.prefix, "2024-07");
    assert_eq!(day.prefix, "2024-07-15");
    assert_eq!(day.source, ScopeSource::Hint);
}

#[test]
fn missing_sentinel_without_hint_is_unscoped() {
    let harness = Harness::new();
    let scope = harness.runner().resolve_scope(&id("abc"), None, None).unwrap();
    assert_eq!(scope.prefix, "");
    assert_eq!(scope.source, ScopeSource::Unscoped);
    assert!(harness.events.events().iter().any(|event| matches!(
        event,
        ReplayEvent::SentinelMissing { bucket, .. } if bucket == "prod-bucket"
    )));
}

#[test]
fn explicit_prefix_skips_sentinel_probe() {
    let harness = Harness::new();
    harness.source.insert("abc", gz("usage"), SENTINEL_MODIFIED).unwrap();
    let scope =
        harness.runner().resolve_scope(&id("abc"), Some(SearchScope::Year), Some("2023-12")).unwrap();
    assert_eq!(scope.prefix, "2023-12");
    assert_eq!(scope.source, ScopeSource::Explicit);
}

#[test]
fn empty_explicit_prefix_falls_back_to_resolution() {
    let harness = Harness::new();
    harness.source.insert("abc", gz("usage"), SENTINEL_MODIFIED).unwrap();
    let scope = harness.runner().resolve_scope(&id("abc"), None, Some("")).unwrap();
    assert_eq!(scope.prefix, "2024-03-02");
}

#[test]
fn strict_mode_rejects_missing_sentinel() {
    let harness = Harness::new();
    let runner = harness.runner_with(ReplayOptions {
        sentinel_mode: SentinelMode::Strict,
        ..ReplayOptions::default()
    });
    let err = runner.resolve_scope(&id("abc"), Some(SearchScope::Day), None).unwrap_err();
    assert!(matches!(err, ReplayError::SentinelNotFound { .. }));
}

#[test]
fn strict_mode_accepts_present_sentinel() {
    let harness = Harness::new();
    harness.source.insert("abc", gz("usage"), SENTINEL_MODIFIED).unwrap();
    let runner = harness.runner_with(ReplayOptions {
        sentinel_mode: SentinelMode::Strict,
        ..ReplayOptions::default()
    });
    let scope = runner.resolve_scope(&id("abc"), None, None).unwrap();
    assert_eq!(scope.prefix, "2024-03-02");
}
