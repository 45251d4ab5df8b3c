//! tunedex-ui library interface
//!
//! Exposes the sync core for the CLI binary and integration testing:
//! - Remote catalog client (HTTP)
//! - Persisted local song cache
//! - Reconciliation store (canonical in-memory state)
//! - Query projections over canonical state

pub mod cache;
pub mod query;
pub mod remote;
pub mod store;

pub use store::{FetchStatus, Store};
