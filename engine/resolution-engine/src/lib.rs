//! Resolution Engine
//!
//! Decides whether stored projections were met by looking up the player's
//! actual statistic in upstream box scores, and wires the roster cache and
//! result sink into a single [`ProjectionService`].

pub mod config;
pub mod engine;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod service;


pub use config::{load_config, validate_config, EvaluationConfig, LoggingConfig, ServiceConfig};
pub use engine::ResolutionEngine;
pub use events::{EvaluationReport, Outcome, ResolutionEvent};
pub use logging::initialize_logging;
pub use metrics::{MetricsSnapshot, ResolutionMetrics};
pub use service::{ProjectionService, ServiceError};
