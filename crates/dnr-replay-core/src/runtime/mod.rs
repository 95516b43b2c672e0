// crates/dnr-replay-core/src/runtime/mod.rs
// ============================================================================
// Module: DNR Replay Runtime
// Description: Replay pipeline components and their wiring.
// Purpose: Group scope resolution, location, transfer, and orchestration.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime components, leaves first: gzip codec, local run storage, scope
//! resolver, file locator, transfer pipeline, and the run orchestrator.

pub mod codec;
pub mod error;
pub mod events;
pub mod local;
pub mod locator;
pub mod memory;
pub mod orchestrator;
pub mod pipeline;
pub mod scope;

pub use codec::CodecError;
pub use codec::gzip_compress;
pub use codec::gzip_decompress;
pub use codec::gzip_decompress_text;
pub use error::ReplayError;
pub use events::FileEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::ReplayEvent;
pub use events::ReplayEventSink;
pub use events::ScopeSource;
pub use events::StderrEventSink;
pub use local::LocalRunStore;
pub use local::PreparedRunDirectory;
pub use locator::FileLocator;
pub use memory::InMemoryObjectStore;
pub use memory::StoredObject;
pub use orchestrator::ReplayOptions;
pub use orchestrator::ReplayRunner;
pub use orchestrator::ReplayRunnerConfig;
pub use orchestrator::RunRequest;
pub use pipeline::DEFAULT_MAX_OBJECT_BYTES;
pub use pipeline::TransferPipeline;
pub use scope::Clock;
pub use scope::FixedClock;
pub use scope::ResolvedScope;
pub use scope::ScopeResolver;
pub use scope::SystemClock;
