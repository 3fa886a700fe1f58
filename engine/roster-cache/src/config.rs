use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest accepted `ttl_hours` (ten years)
pub const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

/// Configuration for the roster cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterCacheConfig {
    /// Cache file location
    pub path: PathBuf,

    /// Maximum entry age in hours
    pub ttl_hours: u64,
}

impl Default for RosterCacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/roster_cache.json"),
            ttl_hours: 72, // 3 days
        }
    }
}

impl RosterCacheConfig {
    /// TTL as a chrono duration, capped at [`MAX_TTL_HOURS`]
    pub fn ttl(&self) -> Duration {
        Duration::hours(self.ttl_hours.min(MAX_TTL_HOURS) as i64)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.ttl_hours == 0 {
            return Err("cache.ttl_hours must be greater than zero".to_string());
        }
        if self.ttl_hours > MAX_TTL_HOURS {
            return Err(format!("cache.ttl_hours must be at most {MAX_TTL_HOURS}"));
        }
        Ok(())
    }
}
