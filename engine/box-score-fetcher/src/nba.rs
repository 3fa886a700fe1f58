//! API-NBA (RapidAPI) adapter

use async_trait::async_trait;
use chrono::NaiveDate;
use projection_model::{BoxScoreRecord, GameId, GameStatus, GameSummary, Metric, PlayerLine, Sport};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::adapter::{build_client, fetch_json, numeric_fields, ProviderAdapter};
use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};

/// Adapter for the API-NBA service
pub struct NbaStatsAdapter {
    client: Client,
    base_url: String,
    api_host: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl NbaStatsAdapter {
    /// Create a new NBA adapter. A missing API key only fails at request time.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.nba.base_url.trim_end_matches('/').to_string(),
            api_host: config.nba.api_host.clone(),
            api_key_env: config.nba.api_key_env.clone(),
            api_key: config.get_nba_api_key().ok(),
        })
    }

    async fn get(&self, url: &str) -> Result<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::MissingCredentials(self.api_key_env.clone()))?;

        let request = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", self.api_host.as_str());

        fetch_json(request, url).await
    }

    fn response_items(body: &Value) -> Result<&Vec<Value>> {
        body.get("response")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::malformed("payload has no response array"))
    }

    /// Parse a `/games?date=` payload
    pub fn parse_schedule(body: &Value) -> Result<Vec<GameSummary>> {
        let games = Self::response_items(body)?
            .iter()
            .filter_map(|game| {
                let id = match game.get("id")? {
                    Value::Number(number) => number.to_string(),
                    Value::String(text) => text.clone(),
                    _ => return None,
                };
                Some(GameSummary { id: GameId::new(id), status: Self::parse_status(game.get("status")) })
            })
            .collect();
        Ok(games)
    }

    fn parse_status(status: Option<&Value>) -> GameStatus {
        let Some(status) = status else {
            return GameStatus::Unknown;
        };

        match status.get("short").and_then(Value::as_u64) {
            Some(1) => return GameStatus::Scheduled,
            Some(2) => return GameStatus::Live,
            Some(3) => return GameStatus::Final,
            _ => {}
        }

        match status.get("long").and_then(Value::as_str) {
            Some("Finished") => GameStatus::Final,
            Some("In Play") | Some("Halftime") => GameStatus::Live,
            Some("Scheduled") | Some("Not Started") => GameStatus::Scheduled,
            _ => GameStatus::Unknown,
        }
    }

    /// Parse a `/players/statistics?game=` payload.
    ///
    /// Stat keys may sit directly on each entry or under a `statistics`
    /// object (or a one-element `statistics` array).
    pub fn parse_boxscore(game_id: &GameId, body: &Value) -> Result<BoxScoreRecord> {
        let mut record = BoxScoreRecord::new(game_id.clone());

        for entry in Self::response_items(body)? {
            let Some(name) = Self::player_name(entry) else {
                continue;
            };

            let stats = match entry.get("statistics") {
                Some(Value::Object(nested)) => Some(nested),
                Some(Value::Array(items)) => items.first().and_then(Value::as_object),
                _ => entry.as_object(),
            };

            let mut line = PlayerLine::new(name);
            if let Some(stats) = stats {
                line.stats = numeric_fields(stats);
            }
            record.push(line);
        }

        Ok(record)
    }

    fn player_name(entry: &Value) -> Option<String> {
        let player = entry.get("player")?;
        let first = player.get("firstname").and_then(Value::as_str).unwrap_or_default();
        let last = player.get("lastname").and_then(Value::as_str).unwrap_or_default();

        let name = format!("{} {}", first.trim(), last.trim()).trim().to_string();
        (!name.is_empty()).then_some(name)
    }
}

/// Raw box-score keys for each NBA metric
pub fn nba_stat_fields(metric: Metric) -> &'static [&'static str] {
    match metric {
        Metric::Points => &["points"],
        Metric::Rebounds => &["totReb"],
        Metric::Assists => &["assists"],
        Metric::Pra => &["points", "totReb", "assists"],
        Metric::Blocks => &["blocks"],
        Metric::Steals => &["steals"],
        Metric::ThreePointersMade => &["tpm"],
        _ => &[],
    }
}

#[async_trait]
impl ProviderAdapter for NbaStatsAdapter {
    fn sport(&self) -> Sport {
        Sport::Nba
    }

    fn name(&self) -> &str {
        "api-nba"
    }

    async fn list_schedule(&self, date: NaiveDate) -> Result<Vec<GameSummary>> {
        let url = format!("{}/games?date={}", self.base_url, date.format("%Y-%m-%d"));
        let body = self.get(&url).await?;

        let games = Self::parse_schedule(&body)?;
        info!("Fetched {} NBA games for {}", games.len(), date);
        Ok(games)
    }

    async fn fetch_boxscore(&self, game_id: &GameId) -> Result<BoxScoreRecord> {
        let url = format!("{}/players/statistics?game={}", self.base_url, game_id);
        let body = self.get(&url).await?;

        let record = Self::parse_boxscore(game_id, &body)?;
        debug!("Parsed {} NBA player lines for game {}", record.len(), game_id);
        Ok(record)
    }

    fn stat_fields(&self, metric: Metric) -> &'static [&'static str] {
        nba_stat_fields(metric)
    }
}
