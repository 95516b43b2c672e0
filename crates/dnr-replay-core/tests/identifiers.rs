// crates/dnr-replay-core/tests/identifiers.rs
// ============================================================================
// Module: Identifier Tests
// Description: Correlation id validation and scope formatting.
// Purpose: Validate identifier invariants and serde forms.
// Dependencies: dnr-replay-core, serde_json, time
// ============================================================================

//! Identifier unit tests.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use dnr_replay_core::CorrelationId;
use dnr_replay_core::IdentifierError;
use dnr_replay_core::MAX_CORRELATION_ID_LENGTH;
use dnr_replay_core::SearchScope;
use dnr_replay_core::SentinelMode;
use dnr_replay_core::SolveResponse;
use serde_json::json;
use time::macros::datetime;

#[test]
fn correlation_id_rejects_path_like_values() {
    assert_eq!(CorrelationId::parse(""), Err(IdentifierError::Empty));
    assert_eq!(CorrelationId::parse("  "), Err(IdentifierError::Empty));
    assert!(matches!(CorrelationId::parse(".."), Err(IdentifierError::InvalidSegment(_))));
    assert!(matches!(CorrelationId::parse("a/b"), Err(IdentifierError::InvalidSegment(_))));
    assert!(matches!(CorrelationId::parse("a\\b"), Err(IdentifierError::InvalidSegment(_))));
    let long = "x".repeat(MAX_CORRELATION_ID_LENGTH + 1);
    assert_eq!(CorrelationId::parse(long), Err(IdentifierError::TooLong));
}

#[test]
fn correlation_id_accepts_uuid_like_values() {
    let id = CorrelationId::parse("8f14e45f-ceea-467a-9575-8c0f6a1b2c3d").unwrap();
    assert_eq!(id.as_str(), "8f14e45f-ceea-467a-9575-8c0f6a1b2c3d");
    assert_eq!(serde_json::to_value(&id).unwrap(), json!("8f14e45f-ceea-467a-9575-8c0f6a1b2c3d"));
}

#[test]
fn search_scope_formats_prefixes() {
    let at = datetime!(2025-01-09 23:59:59 UTC);
    assert_eq!(SearchScope::Year.prefix_for(at), "2025");
    assert_eq!(SearchScope::Month.prefix_for(at), "2025-01");
    assert_eq!(SearchScope::Day.prefix_for(at), "2025-01-09");
}

#[test]
fn scope_and_mode_use_snake_case_labels() {
    assert_eq!(serde_json::from_value::<SearchScope>(json!("month")).unwrap(), SearchScope::Month);
    assert_eq!(serde_json::from_value::<SentinelMode>(json!("strict")).unwrap(), SentinelMode::Strict);
}

#[test]
fn solve_response_requires_valid_correlation_id() {
    let response: SolveResponse =
        serde_json::from_value(json!({"correlation_id": "run-9", "status": "queued"})).unwrap();
    assert_eq!(response.correlation_id.as_str(), "run-9");
    assert_eq!(response.extra.get("status"), Some(&json!("queued")));

    assert!(serde_json::from_value::<SolveResponse>(json!({"status": "queued"})).is_err());
    assert!(serde_json::from_value::<SolveResponse>(json!({"correlation_id": ""})).is_err());
    assert!(serde_json::from_value::<SolveResponse>(json!({"correlation_id": "   "})).is_err());
}

#[test]
fn solve_response_accepts_opaque_solver_ids() {
    let nested: SolveResponse =
        serde_json::from_value(json!({"correlation_id": "runs/2024/xyz"})).unwrap();
    assert_eq!(nested.correlation_id.as_str(), "runs/2024/xyz");

    let windows: SolveResponse =
        serde_json::from_value(json!({"correlation_id": "runs\\xyz"})).unwrap();
    assert_eq!(windows.correlation_id.as_str(), "runs\\xyz");

    let dots: SolveResponse = serde_json::from_value(json!({"correlation_id": ".."})).unwrap();
    assert_eq!(dots.correlation_id.as_str(), "..");

    let long = "r".repeat(300);
    let response: SolveResponse =
        serde_json::from_value(json!({"correlation_id": long.clone()})).unwrap();
    assert_eq!(response.correlation_id.as_str(), long);
    assert!(CorrelationId::parse(long).is_err());
}
