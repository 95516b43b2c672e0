// crates/dnr-replay-core/src/core/solve.rs
// ============================================================================
// Module: Solver Response Schema
// Description: Typed response returned by the remote solving service.
// Purpose: Replace field-name lookups with an explicit, validated contract.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The solver answers a submission with a JSON object carrying the
//! correlation id of the newly produced run. That id is the only required
//! field; anything else is preserved in [`SolveResponse::extra`].
//!
//! The new id is chosen by the solver and only ever used as the destination
//! object key, so it is kept as an opaque [`SolvedRunId`] rather than a
//! path-segment [`CorrelationId`](crate::core::identifiers::CorrelationId).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::IdentifierError;

// ============================================================================
// SECTION: Solved Run Identifier
// ============================================================================

/// Correlation id assigned by the solver to a replayed run.
///
/// # Invariants
/// - Not empty or whitespace-only. No other shape is imposed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SolvedRunId(String);

impl SolvedRunId {
    /// Wraps a solver-issued id.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Empty`] when the value is blank.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdentifierError::Empty);
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SolvedRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for SolvedRunId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SolvedRunId> for String {
    fn from(value: SolvedRunId) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Solver response body.
///
/// # Invariants
/// - `correlation_id` is a non-blank [`SolvedRunId`] (enforced on decode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    /// Correlation id of the run produced by this submission.
    pub correlation_id: SolvedRunId,
    /// Remaining response fields, untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
