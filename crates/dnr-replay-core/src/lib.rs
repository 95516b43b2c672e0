// crates/dnr-replay-core/src/lib.rs
// ============================================================================
// Module: DNR Replay Core Library
// Description: Public API surface for the DNR replay pipeline.
// Purpose: Expose domain types, interfaces, and runtime components.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! DNR replay re-runs a past solve: it finds the artifacts of a run in a
//! time-partitioned source bucket, downloads them, resubmits the request to
//! the solver, and republishes the raw screen usage under the solver's new
//! correlation id in a destination bucket. Storage and solver backends plug
//! in through [`ObjectStore`] and [`SolverClient`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::KeyListing;
pub use interfaces::ObjectStore;
pub use interfaces::PutObject;
pub use interfaces::SolverClient;
pub use interfaces::SolverError;
pub use interfaces::StoreError;
pub use runtime::InMemoryObjectStore;
pub use runtime::ReplayError;
pub use runtime::ReplayEvent;
pub use runtime::ReplayEventSink;
pub use runtime::ReplayOptions;
pub use runtime::ReplayRunner;
pub use runtime::ReplayRunnerConfig;
pub use runtime::RunRequest;
