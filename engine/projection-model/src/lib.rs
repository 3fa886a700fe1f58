//! Projection Model - shared types for the projection resolution engine
//!
//! This crate holds everything the other crates agree on: the projection
//! record and its lifecycle, the per-sport metric catalog, the player name
//! matcher and the ephemeral box-score shapes produced by the fetchers.

pub mod boxscore;
pub mod matcher;
pub mod metrics;
pub mod types;

pub use boxscore::{BoxScoreRecord, GameId, GameStatus, GameSummary, PlayerLine};
pub use matcher::NameMatcher;
pub use metrics::{Metric, MetricCatalog};
pub use types::{
    NewProjection, Projection, ProjectionId, ResolvedProjection, Sport, ValidationError,
};
