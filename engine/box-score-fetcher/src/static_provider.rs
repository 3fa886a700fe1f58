//! In-memory provider with canned schedules and box scores
//!
//! Used for offline runs and as the upstream double in tests. Individual
//! games or the whole schedule can be made to fail, responses can be delayed,
//! and every call is counted.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use projection_model::{BoxScoreRecord, GameId, GameStatus, GameSummary, Metric, Sport};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::adapter::ProviderAdapter;
use crate::error::{FetchError, Result};
use crate::mlb::mlb_stat_fields;
use crate::nba::nba_stat_fields;

pub struct StaticProvider {
    sport: Sport,
    schedules: RwLock<HashMap<NaiveDate, Vec<GameSummary>>>,
    boxscores: RwLock<HashMap<GameId, BoxScoreRecord>>,
    failing_games: RwLock<HashSet<GameId>>,
    delays: RwLock<HashMap<GameId, Duration>>,
    schedule_down: AtomicBool,
    schedule_calls: AtomicUsize,
    boxscore_calls: AtomicUsize,
}

impl StaticProvider {
    /// Create an empty provider for a sport
    pub fn new(sport: Sport) -> Self {
        Self {
            sport,
            schedules: RwLock::new(HashMap::new()),
            boxscores: RwLock::new(HashMap::new()),
            failing_games: RwLock::new(HashSet::new()),
            delays: RwLock::new(HashMap::new()),
            schedule_down: AtomicBool::new(false),
            schedule_calls: AtomicUsize::new(0),
            boxscore_calls: AtomicUsize::new(0),
        }
    }

    /// Add a game to a date's schedule, in call order, along with its box score
    pub fn add_game(&self, date: NaiveDate, status: GameStatus, record: BoxScoreRecord) {
        let summary = GameSummary { id: record.game_id.clone(), status };
        self.schedules.write().entry(date).or_default().push(summary);
        self.boxscores.write().insert(record.game_id.clone(), record);
    }

    /// Replace a game's box score, e.g. to simulate a live stat update
    pub fn update_boxscore(&self, record: BoxScoreRecord) {
        self.boxscores.write().insert(record.game_id.clone(), record);
    }

    /// Make every box-score request for a game fail
    pub fn fail_game(&self, game_id: &GameId) {
        self.failing_games.write().insert(game_id.clone());
    }

    /// Let a previously failing game succeed again
    pub fn recover_game(&self, game_id: &GameId) {
        self.failing_games.write().remove(game_id);
    }

    /// Delay box-score responses for a game
    pub fn delay_game(&self, game_id: &GameId, delay: Duration) {
        self.delays.write().insert(game_id.clone(), delay);
    }

    /// Make schedule requests fail (or succeed again)
    pub fn set_schedule_down(&self, down: bool) {
        self.schedule_down.store(down, Ordering::SeqCst);
    }

    /// Number of schedule requests served or refused
    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }

    /// Number of box-score requests served or refused
    pub fn boxscore_calls(&self) -> usize {
        self.boxscore_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for StaticProvider {
    fn sport(&self) -> Sport {
        self.sport
    }

    fn name(&self) -> &str {
        "static"
    }

    async fn list_schedule(&self, date: NaiveDate) -> Result<Vec<GameSummary>> {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);

        if self.schedule_down.load(Ordering::SeqCst) {
            return Err(FetchError::unavailable(format!("{} schedule is down", self.sport)));
        }

        Ok(self.schedules.read().get(&date).cloned().unwrap_or_default())
    }

    async fn fetch_boxscore(&self, game_id: &GameId) -> Result<BoxScoreRecord> {
        self.boxscore_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.read().get(game_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_games.read().contains(game_id) {
            return Err(FetchError::unavailable(format!("box score for game {game_id} failed")));
        }

        self.boxscores
            .read()
            .get(game_id)
            .cloned()
            .ok_or_else(|| FetchError::malformed(format!("no box score for game {game_id}")))
    }

    fn stat_fields(&self, metric: Metric) -> &'static [&'static str] {
        match self.sport {
            Sport::Mlb => mlb_stat_fields(metric),
            Sport::Nba => nba_stat_fields(metric),
        }
    }
}
