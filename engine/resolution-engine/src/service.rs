//! Projection service facade
//!
//! Wires the result sink, the roster cache and the resolution engine together
//! behind the operations the CLI and the worker need.

use box_score_fetcher::{AdapterRegistry, FetchError};
use chrono::NaiveDate;
use projection_model::{
    MetricCatalog, NameMatcher, NewProjection, Projection, ProjectionId, Sport, ValidationError,
};
use projection_store::{open_store, ProjectionStore, StoreError};
use roster_cache::RosterCache;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::engine::ResolutionEngine;
use crate::events::{EvaluationReport, ResolutionEvent};
use crate::metrics::ResolutionMetrics;

/// Errors surfaced by the projection service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Provider setup error: {0}")]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Entry point for adding, listing, removing and evaluating projections
pub struct ProjectionService {
    store: Arc<dyn ProjectionStore>,
    cache: Arc<RosterCache>,
    engine: ResolutionEngine,
    catalog: MetricCatalog,
    matcher: NameMatcher,
}

impl ProjectionService {
    pub fn new(store: Arc<dyn ProjectionStore>, cache: Arc<RosterCache>, engine: ResolutionEngine) -> Self {
        Self { store, cache, engine, catalog: MetricCatalog::new(), matcher: NameMatcher::new() }
    }

    /// Build the HTTP adapters, file-backed roster cache and configured store
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let registry = Arc::new(AdapterRegistry::from_config(&config.fetcher)?);
        let cache = Arc::new(RosterCache::from_config(registry.clone(), &config.cache));
        let store = open_store(&config.store).await?;
        let engine = ResolutionEngine::new(registry).with_parallel_fetch(config.evaluation.parallel_fetch);

        info!(sports = ?Sport::ALL, parallel_fetch = config.evaluation.parallel_fetch, "Projection service ready");
        Ok(Self::new(store, cache, engine))
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn metrics(&self) -> Arc<ResolutionMetrics> {
        self.engine.metrics()
    }

    pub fn cache(&self) -> &RosterCache {
        &self.cache
    }

    /// Players who appeared in a live or final game for the sport and date
    pub async fn eligible_players(&self, sport: Sport, date: NaiveDate) -> Vec<String> {
        self.cache.get_or_fetch(sport, date).await
    }

    /// Validate and store a new projection.
    ///
    /// When a roster is available for the date the player must be on it. An
    /// empty roster (provider down, no games yet) does not block the add.
    pub async fn add(&self, new: NewProjection) -> Result<Projection> {
        new.validate(&self.catalog)?;

        let roster = self.eligible_players(new.sport, new.date).await;
        if !roster.is_empty()
            && self.matcher.find_match(&new.player, roster.iter().map(String::as_str)).is_none()
        {
            return Err(ValidationError::PlayerNotEligible { player: new.player, date: new.date }.into());
        }

        let projection = self.store.create(new).await?;
        info!(id = %projection.id, player = %projection.player, metric = %projection.metric, "Added projection");
        Ok(projection)
    }

    /// Delete a projection owned by `user_id`. Returns false if nothing matched.
    pub async fn remove(&self, user_id: &str, id: ProjectionId) -> Result<bool> {
        let removed = self.store.delete(user_id, id).await?;
        if removed {
            info!(%id, "Removed projection");
        }
        Ok(removed)
    }

    /// Every projection owned by `user_id`, newest date first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Projection>> {
        let mut projections = self.store.list(user_id).await?;
        projections.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(projections)
    }

    /// Resolve every pending projection of `user_id` and write the results.
    ///
    /// A failed write is logged and counted; the remaining updates still run.
    /// A record resolved since the pending list was read keeps its stored result.
    pub async fn evaluate_pending(&self, user_id: &str) -> Result<EvaluationReport> {
        let pending = self.store.list_pending(user_id).await?;
        let mut report = self.engine.evaluate(&pending).await;

        let metrics = self.engine.metrics();
        for resolution in report.resolved.clone() {
            match self.store.update_result(resolution.id, resolution.actual, resolution.met).await {
                Ok(()) => {}
                Err(StoreError::AlreadyResolved { id }) => {
                    metrics.already_resolved_total.inc();
                    info!(%id, "Result already recorded, keeping stored value");
                }
                Err(e) => {
                    metrics.sink_failures_total.inc();
                    warn!(id = %resolution.id, "Failed to record result: {}", e);
                    report.events.push(ResolutionEvent::SinkUpdateFailed { id: resolution.id, error: e.to_string() });
                }
            }
        }

        Ok(report)
    }
}
