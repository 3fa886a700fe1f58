//! Resolution engine
//!
//! Walks a batch of projections, finds each player's game through the sport's
//! provider adapter and turns the observed statistic into a
//! [`ResolvedProjection`]. Nothing here writes to the result sink; callers
//! apply `EvaluationReport::resolved` themselves.

use box_score_fetcher::{AdapterRegistry, ProviderAdapter};
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use projection_model::{
    BoxScoreRecord, GameId, MetricCatalog, NameMatcher, Projection, ResolvedProjection, Sport,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::events::{EvaluationReport, Outcome, ResolutionEvent};
use crate::metrics::ResolutionMetrics;

/// Upstream responses fetched during one batch, failures included
#[derive(Default)]
struct BatchMemo {
    games: HashMap<(Sport, NaiveDate), Result<Vec<GameId>, String>>,
    boxscores: HashMap<(Sport, GameId), Result<Arc<BoxScoreRecord>, String>>,
}

impl BatchMemo {
    async fn games(
        &mut self,
        adapter: &dyn ProviderAdapter,
        date: NaiveDate,
    ) -> Result<Vec<GameId>, String> {
        let key = (adapter.sport(), date);
        if let Some(games) = self.games.get(&key) {
            return games.clone();
        }

        let games = adapter.list_games(date).await.map_err(|e| e.to_string());
        self.games.insert(key, games.clone());
        games
    }

    async fn boxscore(
        &mut self,
        adapter: &dyn ProviderAdapter,
        game_id: &GameId,
    ) -> Result<Arc<BoxScoreRecord>, String> {
        let key = (adapter.sport(), game_id.clone());
        if let Some(record) = self.boxscores.get(&key) {
            return record.clone();
        }

        let record = adapter.fetch_boxscore(game_id).await.map(Arc::new).map_err(|e| e.to_string());
        self.boxscores.insert(key, record.clone());
        record
    }

    /// Fetch every not-yet-seen box score of a game list concurrently
    async fn prefetch(&mut self, adapter: &dyn ProviderAdapter, games: &[GameId]) {
        let sport = adapter.sport();
        let missing: Vec<&GameId> =
            games.iter().filter(|game_id| !self.boxscores.contains_key(&(sport, (*game_id).clone()))).collect();
        if missing.is_empty() {
            return;
        }

        let results = join_all(missing.iter().map(|game_id| adapter.fetch_boxscore(game_id))).await;
        for (game_id, result) in missing.into_iter().zip(results) {
            let record = result.map(Arc::new).map_err(|e| e.to_string());
            self.boxscores.insert((sport, game_id.clone()), record);
        }
    }
}

/// Resolves projections against upstream box scores
pub struct ResolutionEngine {
    registry: Arc<AdapterRegistry>,
    catalog: MetricCatalog,
    matcher: NameMatcher,
    parallel_fetch: bool,
    metrics: Arc<ResolutionMetrics>,
}

impl ResolutionEngine {
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            registry,
            catalog: MetricCatalog::new(),
            matcher: NameMatcher::new(),
            parallel_fetch: false,
            metrics: Arc::new(ResolutionMetrics::new()),
        }
    }

    /// Fetch a projection's box scores concurrently instead of one at a time
    pub fn with_parallel_fetch(mut self, parallel_fetch: bool) -> Self {
        self.parallel_fetch = parallel_fetch;
        self
    }

    pub fn metrics(&self) -> Arc<ResolutionMetrics> {
        self.metrics.clone()
    }

    /// Evaluate a batch of projections.
    ///
    /// Projections are processed in order. Schedules and box scores fetched
    /// for one projection are reused by the rest of the batch; a new call
    /// starts from fresh upstream data.
    pub async fn evaluate(&self, projections: &[Projection]) -> EvaluationReport {
        let mut memo = BatchMemo::default();
        let mut report = EvaluationReport::default();

        info!("Evaluating {} projections", projections.len());

        for projection in projections {
            self.metrics.evaluated_total.inc();
            let outcome = self.evaluate_one(projection, &mut memo, &mut report.events).await;

            if let Outcome::Resolved { resolution, .. } = &outcome {
                report.resolved.push(*resolution);
            }
            report.outcomes.push((projection.id, outcome));
        }

        report.events.push(ResolutionEvent::BatchCompleted {
            evaluated: report.evaluated(),
            resolved: report.resolved_count(),
            timestamp: Utc::now(),
        });

        info!(
            evaluated = report.evaluated(),
            resolved = report.resolved_count(),
            unresolved = report.unresolved_count(),
            games_skipped = report.games_skipped(),
            "Batch completed"
        );
        report
    }

    async fn evaluate_one(
        &self,
        projection: &Projection,
        memo: &mut BatchMemo,
        events: &mut Vec<ResolutionEvent>,
    ) -> Outcome {
        if projection.is_resolved() {
            self.metrics.already_resolved_total.inc();
            debug!(id = %projection.id, "Already resolved, skipping");
            return Outcome::AlreadyResolved;
        }

        if self.catalog.lookup(projection.sport, &projection.metric).is_none() {
            self.metrics.unknown_metric_total.inc();
            warn!(
                id = %projection.id,
                sport = %projection.sport,
                metric = %projection.metric,
                "Unknown metric, leaving unresolved"
            );
            events.push(ResolutionEvent::UnknownMetric {
                id: projection.id,
                sport: projection.sport,
                metric: projection.metric.clone(),
            });
            return Outcome::UnknownMetric;
        }

        let Some(adapter) = self.registry.get(projection.sport) else {
            self.metrics.provider_failures_total.inc();
            warn!(id = %projection.id, sport = %projection.sport, "No provider registered");
            events.push(ResolutionEvent::NoProvider { id: projection.id, sport: projection.sport });
            return Outcome::NoProvider;
        };

        let games = match memo.games(adapter.as_ref(), projection.date).await {
            Ok(games) => games,
            Err(e) => {
                self.metrics.provider_failures_total.inc();
                error!(
                    id = %projection.id,
                    provider = adapter.name(),
                    date = %projection.date,
                    "Game list unavailable: {}", e
                );
                events.push(ResolutionEvent::ProviderUnavailable {
                    id: projection.id,
                    sport: projection.sport,
                    date: projection.date,
                    error: e,
                });
                return Outcome::ProviderUnavailable;
            }
        };

        if self.parallel_fetch {
            memo.prefetch(adapter.as_ref(), &games).await;
        }

        for game_id in &games {
            let record = match memo.boxscore(adapter.as_ref(), game_id).await {
                Ok(record) => record,
                Err(e) => {
                    self.metrics.games_skipped_total.inc();
                    warn!(id = %projection.id, game_id = %game_id, "Skipping game: {}", e);
                    events.push(ResolutionEvent::GameSkipped {
                        id: projection.id,
                        sport: projection.sport,
                        game_id: game_id.clone(),
                        error: e,
                    });
                    continue;
                }
            };

            let Some(name) = self.matcher.find_match(&projection.player, record.player_names()) else {
                continue;
            };
            let Some(actual) = adapter.extract_stat(&record, name, &projection.metric) else {
                continue;
            };

            let resolution: ResolvedProjection = projection.resolve(actual);
            self.metrics.resolved_total.inc();
            info!(
                id = %projection.id,
                player = %projection.player,
                matched = name,
                game_id = %game_id,
                actual,
                target = projection.target,
                met = resolution.met,
                "Resolved projection"
            );
            events.push(ResolutionEvent::ProjectionResolved {
                id: projection.id,
                player: projection.player.clone(),
                matched_name: name.to_string(),
                game_id: game_id.clone(),
                actual,
                met: resolution.met,
            });
            return Outcome::Resolved { resolution, game_id: game_id.clone() };
        }

        self.metrics.not_found_total.inc();
        debug!(
            id = %projection.id,
            player = %projection.player,
            date = %projection.date,
            games = games.len(),
            "Player not found"
        );
        events.push(ResolutionEvent::PlayerNotFound {
            id: projection.id,
            player: projection.player.clone(),
            date: projection.date,
            games_scanned: games.len(),
        });
        Outcome::NotFound
    }
}
