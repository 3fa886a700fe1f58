//! Provider adapter trait and sport registry

use async_trait::async_trait;
use chrono::NaiveDate;
use projection_model::{BoxScoreRecord, GameId, GameSummary, Metric, MetricCatalog, Sport};
use reqwest::{Client, RequestBuilder};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use crate::mlb::MlbStatsAdapter;
use crate::nba::NbaStatsAdapter;

/// Capability interface every sport integration implements
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Sport served by this adapter
    fn sport(&self) -> Sport;

    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Every game scheduled on a date, with its status
    async fn list_schedule(&self, date: NaiveDate) -> Result<Vec<GameSummary>>;

    /// Fetch one game's box score
    async fn fetch_boxscore(&self, game_id: &GameId) -> Result<BoxScoreRecord>;

    /// Raw stat keys summed to produce a metric
    fn stat_fields(&self, metric: Metric) -> &'static [&'static str];

    /// In-scope (live or final) games on a date, in provider order
    async fn list_games(&self, date: NaiveDate) -> Result<Vec<GameId>> {
        let schedule = self.list_schedule(date).await?;
        let total = schedule.len();

        let games: Vec<GameId> = schedule
            .into_iter()
            .filter(|game| game.status.is_in_scope())
            .map(|game| game.id)
            .collect();

        debug!(
            provider = self.name(),
            %date,
            total,
            in_scope = games.len(),
            "Listed games"
        );
        Ok(games)
    }

    /// Extract a metric value for a player from a box score.
    ///
    /// Returns `None` when the player is not in the record. A metric name
    /// outside the sport's catalog yields `Some(0.0)`.
    fn extract_stat(&self, record: &BoxScoreRecord, player_name: &str, metric: &str) -> Option<f64> {
        let line = record.player(player_name)?;

        match MetricCatalog::new().lookup(self.sport(), metric) {
            Some(metric) => Some(self.stat_fields(metric).iter().map(|field| line.stat(field)).sum()),
            None => {
                warn!(
                    provider = self.name(),
                    metric,
                    player = player_name,
                    "Unknown metric, falling back to 0"
                );
                Some(0.0)
            }
        }
    }

    /// Players who appeared in any in-scope game on a date.
    ///
    /// Any failed box score fails the whole discovery, so callers never cache
    /// a partial roster.
    async fn list_players(&self, date: NaiveDate) -> Result<Vec<String>> {
        let games = self.list_games(date).await?;

        let mut seen = HashSet::new();
        let mut players = Vec::new();
        for game_id in &games {
            let record = self.fetch_boxscore(game_id).await?;
            for name in record.player_names() {
                if seen.insert(name.to_string()) {
                    players.push(name.to_string());
                }
            }
        }

        debug!(provider = self.name(), %date, games = games.len(), players = players.len(), "Discovered roster");
        Ok(players)
    }
}

/// Registry mapping each sport to its adapter
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Sport, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { adapters: HashMap::new() }
    }

    /// Register the HTTP adapters for every supported sport
    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(MlbStatsAdapter::new(config)?));
        registry.register(Arc::new(NbaStatsAdapter::new(config)?));
        Ok(registry)
    }

    /// Register an adapter, replacing any previous adapter for the same sport
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.insert(adapter.sport(), adapter)
    }

    /// Adapter for a sport, if one is registered
    pub fn get(&self, sport: Sport) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&sport).cloned()
    }

    /// Registered sports, sorted
    pub fn sports(&self) -> Vec<Sport> {
        let mut sports: Vec<Sport> = self.adapters.keys().copied().collect();
        sports.sort();
        sports
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Build the shared HTTP client for an adapter
pub(crate) fn build_client(config: &FetcherConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.http.request_timeout_secs))
        .user_agent(config.http.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Send a request and decode a JSON body, turning non-2xx into errors
pub(crate) async fn fetch_json(request: RequestBuilder, url: &str) -> Result<Value> {
    debug!("Fetching {}", url);

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status { url: url.to_string(), status: response.status().as_u16() });
    }

    let body = response.json::<Value>().await?;
    Ok(body)
}

/// Collect the numeric entries of a JSON object.
///
/// Numbers are taken as-is and numeric strings are parsed. Anything else
/// (nested objects, clock strings like "35:12") is ignored.
pub(crate) fn numeric_fields(object: &Map<String, Value>) -> HashMap<String, f64> {
    object
        .iter()
        .filter_map(|(key, value)| {
            let number = match value {
                Value::Number(number) => number.as_f64(),
                Value::String(text) => text.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            number.is_finite().then(|| (key.clone(), number))
        })
        .collect()
}
