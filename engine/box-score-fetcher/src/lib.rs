//! Box Score Fetcher
//!
//! One adapter per sport translating upstream schedule and box-score payloads
//! into the shapes defined in `projection-model`. Adapters are looked up through
//! an [`AdapterRegistry`] keyed by sport, so adding a sport means registering
//! another adapter.

pub mod adapter;
pub mod config;
pub mod error;
pub mod mlb;
pub mod nba;
pub mod static_provider;

pub use adapter::{AdapterRegistry, ProviderAdapter};
pub use config::FetcherConfig;
pub use error::{FetchError, Result};
pub use mlb::MlbStatsAdapter;
pub use nba::NbaStatsAdapter;
pub use static_provider::StaticProvider;
