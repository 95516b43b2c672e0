// crates/dnr-replay-core/src/interfaces/mod.rs
// ============================================================================
// Module: DNR Replay Interfaces
// Description: Backend-agnostic seams for object storage and solving.
// Purpose: Let the pipeline run against S3, HTTP, or in-memory fakes.
// Dependencies: crate::core, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! [`ObjectStore`] is the object store gateway: each instance is bound to one
//! bucket and one set of credentials at construction, so callers never pass
//! either per call. [`SolverClient`] submits a request payload to the remote
//! solving service.
//!
//! Absent objects are a normal negative result for
//! [`ObjectStore::head_timestamp`] and [`ObjectStore::exists`]; only transport
//! and authorization failures are errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::SolveResponse;

// ============================================================================
// SECTION: Object Store
// ============================================================================

/// Object store errors, carrying bucket/key context.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Invalid configuration or key input.
    #[error("object store invalid: {0}")]
    Invalid(String),
    /// Object does not exist (fetch only; probes return a negative result).
    #[error("object not found: {bucket}/{key}")]
    NotFound {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
    },
    /// Network, authorization, or backend failure.
    #[error("object store transport error on {bucket}/{key}: {message}")]
    Transport {
        /// Bucket name.
        bucket: String,
        /// Object key or prefix.
        key: String,
        /// Backend error message.
        message: String,
    },
    /// Object exceeds the configured size limit.
    #[error("object too large: {bucket}/{key} ({actual_bytes} > {max_bytes})")]
    TooLarge {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual size in bytes.
        actual_bytes: usize,
    },
}

/// Lazy, finite sequence of keys produced by a prefix listing.
pub type KeyListing<'a> = Box<dyn Iterator<Item = Result<String, StoreError>> + 'a>;

/// Object body and metadata for a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    /// Object body.
    pub bytes: Vec<u8>,
    /// Optional `Content-Type`.
    pub content_type: Option<String>,
    /// Optional `Content-Encoding`.
    pub content_encoding: Option<String>,
}

impl PutObject {
    /// Creates a write request with no metadata.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: None,
            content_encoding: None,
        }
    }
}

/// Object store gateway bound to a single bucket.
pub trait ObjectStore: Send + Sync {
    /// Returns the bucket this store is bound to.
    fn bucket(&self) -> &str;

    /// Returns the last-modified timestamp of an object, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport or authorization failure.
    fn head_timestamp(&self, key: &str) -> Result<Option<OffsetDateTime>, StoreError>;

    /// Returns true when the object exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport or authorization failure.
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.head_timestamp(key)?.is_some())
    }

    /// Lists keys under a prefix; an empty prefix lists the whole bucket.
    ///
    /// Pagination is handled internally. Each call starts a fresh listing.
    fn list_by_prefix<'a>(&'a self, prefix: &str) -> KeyListing<'a>;

    /// Fetches an object body, failing when it exceeds `max_bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the object is missing, too large, or the
    /// transport fails.
    fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, StoreError>;

    /// Writes an object unconditionally, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport or authorization failure.
    fn put(&self, key: &str, object: PutObject) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Solver Client
// ============================================================================

/// Solver submission errors.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Request could not be built or sent.
    #[error("solver http error: {0}")]
    Http(String),
    /// Solver answered with a non-success status.
    #[error("solver returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },
    /// Response body does not match the expected schema.
    #[error("solver response invalid: {0}")]
    InvalidResponse(String),
    /// Response body exceeds the configured size limit.
    #[error("solver response too large ({actual_bytes} > {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual size in bytes.
        actual_bytes: usize,
    },
}

/// Remote solving service.
pub trait SolverClient: Send + Sync {
    /// Returns the solver endpoint label used in events.
    fn endpoint(&self) -> &str;

    /// Submits a request payload and returns the solver response.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] on transport failure, non-success status, or a
    /// malformed response.
    fn submit(&self, payload: &Value) -> Result<SolveResponse, SolverError>;
}
