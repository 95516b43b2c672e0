// crates/dnr-replay-core/src/core/mod.rs
// ============================================================================
// Module: DNR Replay Core Types
// Description: Domain types shared by the replay pipeline.
// Purpose: Group identifiers, file roles, and solver schemas.
// Dependencies: crate::core::{files, identifiers, solve}
// ============================================================================

//! ## Overview
//! Data model for the replay pipeline: identifiers, artifact roles, and the
//! solver response contract.

pub mod files;
pub mod identifiers;
pub mod solve;

pub use files::FileRole;
pub use files::FileRoleMatches;
pub use files::FileRoleSet;
pub use identifiers::CorrelationId;
pub use identifiers::IdentifierError;
pub use identifiers::MAX_CORRELATION_ID_LENGTH;
pub use identifiers::SearchScope;
pub use identifiers::SentinelMode;
pub use solve::SolveResponse;
pub use solve::SolvedRunId;
