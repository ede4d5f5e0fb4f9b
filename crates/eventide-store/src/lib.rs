//! Persistence layer for Eventide.
//!
//! The registry never talks to storage directly. It hands snapshots to a
//! [`StoreWriter`], which owns a bounded worker pool and dispatches them
//! through the [`PersistenceGateway`] trait. Exactly one backend is active
//! per process, chosen at initialization; there is no mid-session fallback.
//!
//! # Key types
//!
//! - [`PersistenceGateway`] — the async storage contract
//! - [`MemoryStore`] — in-process backend (tests, embedded use)
//! - [`JsonFileStore`] — one JSON file per event under a data directory
//! - [`StoreWriter`] — fire-and-forget dispatch with batching and a
//!   bounded shutdown drain

mod error;
mod gateway;
mod json_file;
mod memory;
mod writer;

pub use error::StoreError;
pub use gateway::PersistenceGateway;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use writer::{StoreConfig, StoreWriter};
