//! Per-projection outcomes and batch diagnostics

use chrono::{DateTime, NaiveDate, Utc};
use projection_model::{GameId, ProjectionId, ResolvedProjection, Sport};
use serde::Serialize;

/// What happened to one projection during a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    /// Already carried an actual value; untouched
    AlreadyResolved,

    /// Metric is not in the sport's catalog; left unresolved
    UnknownMetric,

    /// No adapter registered for the sport; left unresolved
    NoProvider,

    /// The game list could not be fetched; left unresolved
    ProviderUnavailable,

    /// The player was not found in any reachable game; left unresolved
    NotFound,

    /// Matched in `game_id`
    Resolved { resolution: ResolvedProjection, game_id: GameId },
}

impl Outcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Outcome::Resolved { .. })
    }
}

/// Diagnostics emitted while resolving a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResolutionEvent {
    ProjectionResolved {
        id: ProjectionId,
        player: String,
        matched_name: String,
        game_id: GameId,
        actual: f64,
        met: bool,
    },

    UnknownMetric {
        id: ProjectionId,
        sport: Sport,
        metric: String,
    },

    NoProvider {
        id: ProjectionId,
        sport: Sport,
    },

    ProviderUnavailable {
        id: ProjectionId,
        sport: Sport,
        date: NaiveDate,
        error: String,
    },

    GameSkipped {
        id: ProjectionId,
        sport: Sport,
        game_id: GameId,
        error: String,
    },

    PlayerNotFound {
        id: ProjectionId,
        player: String,
        date: NaiveDate,
        games_scanned: usize,
    },

    /// The sink rejected a resolved update
    SinkUpdateFailed {
        id: ProjectionId,
        error: String,
    },

    BatchCompleted {
        evaluated: usize,
        resolved: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Result of one batch evaluation
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    /// Outcome per projection, in input order
    pub outcomes: Vec<(ProjectionId, Outcome)>,

    /// Updates to hand to the result sink, in input order
    pub resolved: Vec<ResolvedProjection>,

    pub events: Vec<ResolutionEvent>,
}

impl EvaluationReport {
    pub fn outcome(&self, id: ProjectionId) -> Option<&Outcome> {
        self.outcomes.iter().find(|(outcome_id, _)| *outcome_id == id).map(|(_, outcome)| outcome)
    }

    pub fn evaluated(&self) -> usize {
        self.outcomes.len()
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    /// Projections still without an actual value after this batch
    pub fn unresolved_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !matches!(outcome, Outcome::Resolved { .. } | Outcome::AlreadyResolved))
            .count()
    }

    pub fn games_skipped(&self) -> usize {
        self.events.iter().filter(|event| matches!(event, ResolutionEvent::GameSkipped { .. })).count()
    }
}
