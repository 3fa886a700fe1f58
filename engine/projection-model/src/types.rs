use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::metrics::MetricCatalog;

/// Identifier assigned to a projection by the result sink
pub type ProjectionId = Uuid;

/// Sports with a registered box-score provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sport {
    #[serde(rename = "MLB")]
    Mlb,
    #[serde(rename = "NBA")]
    Nba,
}

impl Sport {
    /// Every supported sport, in display order
    pub const ALL: [Sport; 2] = [Sport::Mlb, Sport::Nba];

    /// Upper-case code used in storage and cache keys (e.g., "MLB")
    pub fn code(&self) -> &'static str {
        match self {
            Sport::Mlb => "MLB",
            Sport::Nba => "NBA",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Sport {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MLB" => Ok(Sport::Mlb),
            "NBA" => Ok(Sport::Nba),
            other => Err(ValidationError::UnknownSport(other.to_string())),
        }
    }
}

/// A user-submitted prediction that a player's statistic reaches a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub id: ProjectionId,

    /// Opaque scoping key, never interpreted by the engine
    pub user_id: String,

    pub sport: Sport,

    /// Player display name as entered at creation time
    pub player: String,

    /// Metric display name (e.g., "hits", "PRA")
    pub metric: String,

    /// Non-negative threshold
    pub target: f64,

    /// Game date being evaluated
    pub date: NaiveDate,

    /// Observed value, `None` while unresolved
    pub actual: Option<f64>,

    /// `actual >= target`, `None` while unresolved
    pub met: Option<bool>,
}

impl Projection {
    /// Build a fresh, unresolved projection from creation fields
    pub fn from_new(id: ProjectionId, new: NewProjection) -> Self {
        Self {
            id,
            user_id: new.user_id,
            sport: new.sport,
            player: new.player,
            metric: new.metric,
            target: new.target,
            date: new.date,
            actual: None,
            met: None,
        }
    }

    /// A projection is resolved once an actual value has been recorded
    pub fn is_resolved(&self) -> bool {
        self.actual.is_some()
    }

    /// Compute the resolution for an observed value without mutating
    pub fn resolve(&self, actual: f64) -> ResolvedProjection {
        ResolvedProjection { id: self.id, actual, met: actual >= self.target }
    }

    /// Apply a resolution. Already-resolved projections are left untouched.
    pub fn apply(&mut self, resolved: &ResolvedProjection) -> bool {
        if self.is_resolved() || resolved.id != self.id {
            return false;
        }
        self.actual = Some(resolved.actual);
        self.met = Some(resolved.met);
        true
    }
}

/// Fields supplied when a projection is added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProjection {
    pub user_id: String,
    pub sport: Sport,
    pub player: String,
    pub metric: String,
    pub target: f64,
    pub date: NaiveDate,
}

impl NewProjection {
    /// Check the creation fields against the metric catalog
    pub fn validate(&self, catalog: &MetricCatalog) -> Result<(), ValidationError> {
        if self.player.trim().is_empty() {
            return Err(ValidationError::EmptyPlayer);
        }

        if !self.target.is_finite() || self.target < 0.0 {
            return Err(ValidationError::InvalidTarget(self.target));
        }

        if catalog.lookup(self.sport, &self.metric).is_none() {
            return Err(ValidationError::UnknownMetric {
                sport: self.sport,
                metric: self.metric.clone(),
            });
        }

        Ok(())
    }
}

/// The single update the engine emits for a resolved projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProjection {
    pub id: ProjectionId,
    pub actual: f64,
    pub met: bool,
}

/// Errors raised while validating projection input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown sport: {0}")]
    UnknownSport(String),

    #[error("Metric '{metric}' is not tracked for {sport}")]
    UnknownMetric { sport: Sport, metric: String },

    #[error("Target must be a non-negative number, got {0}")]
    InvalidTarget(f64),

    #[error("Player name must not be empty")]
    EmptyPlayer,

    #[error("{player} did not play on {date}")]
    PlayerNotEligible { player: String, date: NaiveDate },
}
