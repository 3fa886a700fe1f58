//! Projection Store
//!
//! The result sink: where projections are created, listed, removed and
//! finally stamped with their observed value. Three backends share the
//! [`ProjectionStore`] trait: an in-memory map for tests, a single JSON file
//! for local use and Postgres for deployments.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod postgres;
pub mod store;

pub use config::{StoreBackend, StoreConfig};
pub use error::{Result, StoreError};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{open_store, ProjectionStore};
