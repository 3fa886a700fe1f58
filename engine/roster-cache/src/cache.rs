use box_score_fetcher::AdapterRegistry;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::RwLock;
use projection_model::Sport;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::RosterCacheConfig;
use crate::error::CacheError;
use crate::storage::{JsonFileStorage, RosterStorage};

/// Cache key: one roster per sport and date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RosterKey {
    pub sport: Sport,
    pub date: NaiveDate,
}

impl RosterKey {
    pub fn new(sport: Sport, date: NaiveDate) -> Self {
        Self { sport, date }
    }
}

impl fmt::Display for RosterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sport.code(), self.date.format("%Y-%m-%d"))
    }
}

impl FromStr for RosterKey {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sport, date) = s.split_once(':').ok_or_else(|| CacheError::InvalidKey(s.to_string()))?;
        let sport = sport.parse::<Sport>().map_err(|_| CacheError::InvalidKey(s.to_string()))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| CacheError::InvalidKey(s.to_string()))?;
        Ok(Self { sport, date })
    }
}

/// Cached roster for one sport and date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterCacheEntry {
    /// Ordered, de-duplicated player names
    pub players: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl RosterCacheEntry {
    /// Valid while `now - created_at <= ttl`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at <= ttl
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetch_failures: u64,
    pub write_failures: u64,
    pub entries: usize,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fetch_failures: AtomicU64,
    write_failures: AtomicU64,
}

/// TTL cache of eligible players, refreshed from the provider adapters
pub struct RosterCache {
    registry: Arc<AdapterRegistry>,
    storage: Arc<dyn RosterStorage>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: RwLock<HashMap<RosterKey, RosterCacheEntry>>,
    counters: Counters,
}

impl RosterCache {
    /// Create a cache, loading whatever the storage already holds.
    ///
    /// Unreadable storage is logged and the cache starts empty.
    pub fn new(
        registry: Arc<AdapterRegistry>,
        storage: Arc<dyn RosterStorage>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        let entries = match storage.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Roster cache storage unreadable, starting empty: {}", e);
                HashMap::new()
            }
        };

        info!("Roster cache opened with {} entries (ttl {}h)", entries.len(), ttl.num_hours());

        Self {
            registry,
            storage,
            clock,
            ttl,
            entries: RwLock::new(entries),
            counters: Counters::default(),
        }
    }

    /// File-backed cache on the wall clock
    pub fn from_config(registry: Arc<AdapterRegistry>, config: &RosterCacheConfig) -> Self {
        Self::new(
            registry,
            Arc::new(JsonFileStorage::new(config.path.clone())),
            Arc::new(SystemClock),
            config.ttl(),
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Players eligible for `sport` on `date`.
    ///
    /// Serves a fresh entry without touching the network. Otherwise asks the
    /// sport's adapter and caches the result. A missing adapter, a failed
    /// discovery or a date with no started games yields an empty list and
    /// caches nothing.
    pub async fn get_or_fetch(&self, sport: Sport, date: NaiveDate) -> Vec<String> {
        let key = RosterKey::new(sport, date);

        if let Some(players) = self.lookup(&key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, players = players.len(), "Roster cache hit");
            return players;
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(%key, "Roster cache miss");

        let Some(adapter) = self.registry.get(sport) else {
            self.counters.fetch_failures.fetch_add(1, Ordering::Relaxed);
            warn!(%key, "No provider registered for {}", sport);
            return Vec::new();
        };

        let players = match adapter.list_players(date).await {
            Ok(players) => players,
            Err(e) => {
                self.counters.fetch_failures.fetch_add(1, Ordering::Relaxed);
                warn!(%key, provider = adapter.name(), "Roster discovery failed: {}", e);
                return Vec::new();
            }
        };

        if players.is_empty() {
            debug!(%key, "No players discovered, not caching");
            return players;
        }

        let entry = RosterCacheEntry { players: players.clone(), created_at: self.clock.now() };
        self.entries.write().insert(key, entry);
        self.persist().await;

        info!(%key, players = players.len(), "Cached roster");
        players
    }

    /// Drop the entry for a sport and date. Returns whether one existed.
    pub async fn invalidate(&self, sport: Sport, date: NaiveDate) -> bool {
        let removed = self.entries.write().remove(&RosterKey::new(sport, date)).is_some();
        if removed {
            self.persist().await;
        }
        removed
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
            before - entries.len()
        };

        if removed > 0 {
            debug!("Purged {} expired roster entries", removed);
            self.persist().await;
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fetch_failures: self.counters.fetch_failures.load(Ordering::Relaxed),
            write_failures: self.counters.write_failures.load(Ordering::Relaxed),
            entries: self.entries.read().len(),
        }
    }

    fn lookup(&self, key: &RosterKey) -> Option<Vec<String>> {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.players.clone())
    }

    /// Write the current entries through the storage on the blocking pool
    async fn persist(&self) {
        let snapshot = self.entries.read().clone();
        let storage = self.storage.clone();

        let error = match tokio::task::spawn_blocking(move || storage.save(&snapshot)).await {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("save task failed: {e}"),
        };
        self.counters.write_failures.fetch_add(1, Ordering::Relaxed);
        warn!("Failed to persist roster cache: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use box_score_fetcher::StaticProvider;
    use projection_model::{BoxScoreRecord, GameId, GameStatus, PlayerLine};
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
    }

    fn mlb_provider() -> Arc<StaticProvider> {
        let provider = StaticProvider::new(Sport::Mlb);
        let mut record = BoxScoreRecord::new(GameId::new("745123"));
        record.push(PlayerLine::new("Aaron Judge"));
        record.push(PlayerLine::new("Mookie Betts").with_stat("hits", 2.0));
        provider.add_game(date(), GameStatus::Final, record);
        Arc::new(provider)
    }

    fn registry_with(provider: Arc<StaticProvider>) -> Arc<AdapterRegistry> {
        let mut registry = AdapterRegistry::new();
        registry.register(provider);
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_ttl_expiry_with_manual_clock() {
        let provider = mlb_provider();
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = RosterCache::new(
            registry_with(provider.clone()),
            Arc::new(MemoryStorage::new()),
            clock.clone(),
            Duration::days(3),
        );

        let players = cache.get_or_fetch(Sport::Mlb, date()).await;
        assert_eq!(players, vec!["Aaron Judge", "Mookie Betts"]);
        assert_eq!(provider.schedule_calls(), 1);

        // T + 2 days: served from cache
        clock.advance(Duration::days(2));
        cache.get_or_fetch(Sport::Mlb, date()).await;
        assert_eq!(provider.schedule_calls(), 1);

        // T + 4 days: expired, refetched
        clock.advance(Duration::days(2));
        cache.get_or_fetch(Sport::Mlb, date()).await;
        assert_eq!(provider.schedule_calls(), 2);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let provider = mlb_provider();
        provider.set_schedule_down(true);
        let cache = RosterCache::new(
            registry_with(provider.clone()),
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock),
            Duration::days(3),
        );

        assert!(cache.get_or_fetch(Sport::Mlb, date()).await.is_empty());
        assert_eq!(cache.stats().entries, 0);

        provider.set_schedule_down(false);
        assert_eq!(cache.get_or_fetch(Sport::Mlb, date()).await.len(), 2);
        assert_eq!(provider.schedule_calls(), 2);
        assert_eq!(cache.stats().fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_missing_provider_returns_empty() {
        let cache = RosterCache::new(
            registry_with(mlb_provider()),
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock),
            Duration::days(3),
        );

        assert!(cache.get_or_fetch(Sport::Nba, date()).await.is_empty());
        assert_eq!(cache.stats().entries, 0);
    }

    #[tokio::test]
    async fn test_empty_discovery_is_not_cached() {
        let provider = Arc::new(StaticProvider::new(Sport::Mlb));
        let mut pending = BoxScoreRecord::new(GameId::new("745200"));
        pending.push(PlayerLine::new("Shohei Ohtani"));
        provider.add_game(date(), GameStatus::Scheduled, pending);

        let storage = Arc::new(MemoryStorage::new());
        let cache = RosterCache::new(
            registry_with(provider.clone()),
            storage.clone(),
            Arc::new(SystemClock),
            Duration::days(3),
        );

        assert!(cache.get_or_fetch(Sport::Mlb, date()).await.is_empty());
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.stats().fetch_failures, 0);
        assert!(storage.is_empty());

        let mut started = BoxScoreRecord::new(GameId::new("745123"));
        started.push(PlayerLine::new("Mookie Betts").with_stat("hits", 1.0));
        provider.add_game(date(), GameStatus::Final, started);

        assert_eq!(cache.get_or_fetch(Sport::Mlb, date()).await, vec!["Mookie Betts"]);
        assert_eq!(provider.schedule_calls(), 2);
        assert_eq!(cache.stats().entries, 1);
    }

    /// Storage that records which thread each save ran on
    #[derive(Default)]
    struct ThreadRecordingStorage {
        save_threads: parking_lot::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl RosterStorage for ThreadRecordingStorage {
        fn load(&self) -> crate::error::Result<HashMap<RosterKey, RosterCacheEntry>> {
            Ok(HashMap::new())
        }

        fn save(&self, _entries: &HashMap<RosterKey, RosterCacheEntry>) -> crate::error::Result<()> {
            self.save_threads.lock().push(std::thread::current().id());
            Ok(())
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_saves_run_off_the_runtime_thread() {
        let storage = Arc::new(ThreadRecordingStorage::default());
        let cache = RosterCache::new(
            registry_with(mlb_provider()),
            storage.clone(),
            Arc::new(SystemClock),
            Duration::days(3),
        );

        cache.get_or_fetch(Sport::Mlb, date()).await;
        cache.invalidate(Sport::Mlb, date()).await;

        let runtime_thread = std::thread::current().id();
        let save_threads = storage.save_threads.lock().clone();
        assert_eq!(save_threads.len(), 2);
        assert!(save_threads.iter().all(|thread| *thread != runtime_thread));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_entry() {
        let provider = mlb_provider();
        let storage = Arc::new(MemoryStorage::new());
        storage.set_fail_writes(true);
        let cache = RosterCache::new(
            registry_with(provider.clone()),
            storage.clone(),
            Arc::new(SystemClock),
            Duration::days(3),
        );

        assert_eq!(cache.get_or_fetch(Sport::Mlb, date()).await.len(), 2);
        assert_eq!(cache.get_or_fetch(Sport::Mlb, date()).await.len(), 2);

        assert_eq!(provider.schedule_calls(), 1);
        assert_eq!(cache.stats().write_failures, 1);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let config = RosterCacheConfig {
            path: temp_dir.path().join("roster_cache.json"),
            ..Default::default()
        };

        let provider = mlb_provider();
        let cache = RosterCache::from_config(registry_with(provider.clone()), &config);
        cache.get_or_fetch(Sport::Mlb, date()).await;
        drop(cache);

        let reopened = RosterCache::from_config(registry_with(provider.clone()), &config);
        assert_eq!(reopened.get_or_fetch(Sport::Mlb, date()).await, vec!["Aaron Judge", "Mookie Betts"]);
        assert_eq!(provider.schedule_calls(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let config = RosterCacheConfig {
            path: temp_dir.path().join("roster_cache.json"),
            ..Default::default()
        };
        std::fs::write(&config.path, "garbage").unwrap();

        let provider = mlb_provider();
        let cache = RosterCache::from_config(registry_with(provider.clone()), &config);
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.get_or_fetch(Sport::Mlb, date()).await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_and_purge() {
        let provider = mlb_provider();
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = RosterCache::new(
            registry_with(provider.clone()),
            Arc::new(MemoryStorage::new()),
            clock.clone(),
            Duration::hours(72),
        );

        cache.get_or_fetch(Sport::Mlb, date()).await;
        assert!(cache.invalidate(Sport::Mlb, date()).await);
        assert!(!cache.invalidate(Sport::Mlb, date()).await);

        cache.get_or_fetch(Sport::Mlb, date()).await;
        assert_eq!(provider.schedule_calls(), 2);

        assert_eq!(cache.purge_expired().await, 0);
        clock.advance(Duration::hours(73));
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_key_format() {
        let key = RosterKey::new(Sport::Nba, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(key.to_string(), "NBA:2024-01-05");
        assert_eq!("NBA:2024-01-05".parse::<RosterKey>().unwrap(), key);
        assert!("NBA-2024-01-05".parse::<RosterKey>().is_err());
        assert!("NHL:2024-01-05".parse::<RosterKey>().is_err());
    }
}
