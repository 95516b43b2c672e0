// crates/dnr-replay-core/src/core/identifiers.rs
// ============================================================================
// Module: DNR Replay Identifiers
// Description: Correlation identifiers, search scopes, and sentinel modes.
// Purpose: Provide validated, serializable identifiers with stable string forms.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! A [`CorrelationId`] names one simulation run. It is used verbatim as an
//! object key (the sentinel / raw screen usage object), as a substring pattern
//! for sibling keys, and as the name of the local run directory, so it is
//! validated as a single path segment at construction.
//!
//! [`SearchScope`] coarsens a timestamp into a key prefix when no sentinel is
//! available.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a correlation identifier in bytes.
pub const MAX_CORRELATION_ID_LENGTH: usize = 255;

/// `YYYY` prefix format.
const YEAR_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]");
/// `YYYY-MM` prefix format.
const MONTH_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]");
/// `YYYY-MM-DD` prefix format.
const DAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier is empty after trimming.
    #[error("correlation id must be non-empty")]
    Empty,
    /// Identifier exceeds [`MAX_CORRELATION_ID_LENGTH`].
    #[error("correlation id exceeds {MAX_CORRELATION_ID_LENGTH} bytes")]
    TooLong,
    /// Identifier is not a single path segment.
    #[error("correlation id must be a single path segment: {0}")]
    InvalidSegment(String),
}

// ============================================================================
// SECTION: Correlation Identifier
// ============================================================================

/// Opaque identifier of one simulation run.
///
/// # Invariants
/// - Non-empty, at most [`MAX_CORRELATION_ID_LENGTH`] bytes.
/// - Contains no `/` or `\` and is not `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Parses and validates a correlation identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value is not a valid single segment.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdentifierError::Empty);
        }
        if value.len() > MAX_CORRELATION_ID_LENGTH {
            return Err(IdentifierError::TooLong);
        }
        if value == "." || value == ".." || value.contains(['/', '\\']) {
            return Err(IdentifierError::InvalidSegment(value));
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CorrelationId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CorrelationId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CorrelationId> for String {
    fn from(value: CorrelationId) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Search Scope
// ============================================================================

/// Granularity used to coarsen a timestamp into a key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// `YYYY`.
    Year,
    /// `YYYY-MM`.
    Month,
    /// `YYYY-MM-DD`.
    Day,
}

impl SearchScope {
    /// Returns a stable label for the scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
        }
    }

    /// Formats a timestamp as a key prefix at this granularity.
    #[must_use]
    pub fn prefix_for(self, at: OffsetDateTime) -> String {
        let format = match self {
            Self::Year => YEAR_FORMAT,
            Self::Month => MONTH_FORMAT,
            Self::Day => DAY_FORMAT,
        };
        // Calendar-only format items cannot fail for a valid OffsetDateTime.
        at.format(format).unwrap_or_default()
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Sentinel Mode
// ============================================================================

/// Handling of a missing sentinel object during scope resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelMode {
    /// Missing sentinel falls back to the scope hint, then to a full scan.
    #[default]
    Lenient,
    /// Missing sentinel fails resolution.
    Strict,
}

impl SentinelMode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}
