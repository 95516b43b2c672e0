// crates/dnr-replay-solver/src/lib.rs
// ============================================================================
// Module: DNR Replay Solver Client
// Description: HTTP implementation of the replay solver client.
// Purpose: Submit persisted solve requests to the remote solver.
// Dependencies: crate::http
// ============================================================================

//! ## Overview
//! Exposes [`HttpSolverClient`], a blocking client bound to one solver URL.

pub mod http;

pub use http::HttpSolverClient;
