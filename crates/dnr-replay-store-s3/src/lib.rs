// crates/dnr-replay-store-s3/src/lib.rs
// ============================================================================
// Module: DNR Replay S3 Store
// Description: S3 implementation of the replay object store gateway.
// Purpose: Provide bucket access for the source and destination stores.
// Dependencies: crate::store
// ============================================================================

//! ## Overview
//! Exposes [`S3ObjectStore`], one instance per bucket.

pub mod store;

pub use store::S3ObjectStore;
