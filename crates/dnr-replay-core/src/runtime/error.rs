// crates/dnr-replay-core/src/runtime/error.rs
// ============================================================================
// Module: Replay Errors
// Description: Error taxonomy for the replay pipeline.
// Purpose: Classify fatal failures by the step that produced them.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Absence of optional signals (the sentinel in lenient mode, the raw screen
//! usage file) never surfaces here; it is handled by fallbacks. Everything
//! in [`ReplayError`] aborts the run. Files already written stay in place so
//! a later run can resume with `skip_download`.

use std::path::Path;

use thiserror::Error;

use crate::core::CorrelationId;
use crate::core::FileRole;
use crate::core::IdentifierError;
use crate::interfaces::SolverError;
use crate::interfaces::StoreError;
use crate::runtime::codec::CodecError;

/// Fatal replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Sentinel object is absent and strict sentinel handling is enabled.
    #[error("sentinel object {correlation_id} not found in bucket {bucket}")]
    SentinelNotFound {
        /// Correlation id of the run.
        correlation_id: CorrelationId,
        /// Source bucket.
        bucket: String,
    },
    /// Mandatory roles are unresolved after the scan.
    #[error("incomplete file set for {correlation_id} under prefix {prefix:?}: missing {}", format_roles(.missing))]
    IncompleteFileSet {
        /// Correlation id of the run.
        correlation_id: CorrelationId,
        /// Prefix that was scanned.
        prefix: String,
        /// Unresolved mandatory roles.
        missing: Vec<FileRole>,
    },
    /// Object store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Solver submission failure.
    #[error(transparent)]
    Solver(#[from] SolverError),
    /// Compression failure.
    #[error("{role}: {source}")]
    Codec {
        /// Role of the artifact being processed.
        role: FileRole,
        /// Underlying codec error.
        source: CodecError,
    },
    /// Local filesystem failure.
    #[error("local io error at {path}: {message}")]
    LocalIo {
        /// Path involved.
        path: String,
        /// Error message.
        message: String,
    },
    /// Local request payload is not valid JSON.
    #[error("request payload at {path} is not valid json: {message}")]
    InvalidPayload {
        /// Path of the request file.
        path: String,
        /// Parse error message.
        message: String,
    },
    /// Invalid caller input.
    #[error(transparent)]
    InvalidInput(#[from] IdentifierError),
}

impl ReplayError {
    /// Builds a [`ReplayError::LocalIo`] for a path.
    pub(crate) fn local_io(path: &Path, err: &std::io::Error) -> Self {
        Self::LocalIo {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Joins role labels for error messages.
fn format_roles(roles: &[FileRole]) -> String {
    roles.iter().map(|role| role.as_str()).collect::<Vec<_>>().join(", ")
}
