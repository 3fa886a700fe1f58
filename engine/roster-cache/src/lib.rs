//! Roster Cache
//!
//! Keyed cache of "players eligible on date D for sport S" with TTL expiry.
//! The clock and the storage backend are injected so that expiry can be tested
//! without real time passing and so the cache survives process restarts.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod storage;

pub use cache::{CacheStats, RosterCache, RosterCacheEntry, RosterKey};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RosterCacheConfig, MAX_TTL_HOURS};
pub use error::{CacheError, Result};
pub use storage::{JsonFileStorage, MemoryStorage, RosterStorage};
