//! Service configuration management

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use box_score_fetcher::FetcherConfig;
use projection_store::StoreConfig;
use roster_cache::RosterCacheConfig;

/// Prefix for environment overrides, e.g. `PROJECTIONS__CACHE__TTL_HOURS`
pub const ENV_PREFIX: &str = "PROJECTIONS";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upstream provider configuration
    pub fetcher: FetcherConfig,

    /// Roster cache configuration
    pub cache: RosterCacheConfig,

    /// Result sink configuration
    pub store: StoreConfig,

    /// Batch evaluation settings
    pub evaluation: EvaluationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Batch evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Fetch all box scores of a game list concurrently
    pub parallel_fetch: bool,

    /// User evaluated when none is given on the command line
    pub default_user: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { parallel_fetch: false, default_user: "guest".to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Load configuration: defaults, then the optional TOML file, then
/// `PROJECTIONS__*` environment variables
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let environment = Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true);
    load_config_with_env(path, environment)
}

fn load_config_with_env(path: Option<&Path>, environment: Environment) -> Result<ServiceConfig> {
    let defaults =
        Config::try_from(&ServiceConfig::default()).context("Failed to build default configuration")?;

    let mut builder = Config::builder().add_source(defaults);
    if let Some(path) = path {
        tracing::debug!("Loading configuration from file: {:?}", path);
        builder = builder.add_source(File::from(path).required(true));
    }

    let config: ServiceConfig = builder
        .add_source(environment)
        .build()
        .context("Failed to read configuration sources")?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.evaluation.default_user.trim().is_empty() {
        return Err(anyhow::anyhow!("evaluation.default_user must not be empty"));
    }

    config.fetcher.validate().map_err(|e| anyhow::anyhow!(e))?;
    config.cache.validate().map_err(|e| anyhow::anyhow!(e))?;
    config.store.validate().map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection_store::StoreBackend;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> =
            vars.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
        Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true).source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = load_config_with_env(None, env(&[])).unwrap();
        assert_eq!(config.cache.ttl_hours, 72);
        assert_eq!(config.evaluation.default_user, "guest");
        assert!(!config.evaluation.parallel_fetch);
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.fetcher.http.request_timeout_secs, 10);
    }

    #[test]
    fn test_file_then_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("projections.toml");
        std::fs::write(
            &path,
            r#"
[cache]
ttl_hours = 24

[store]
backend = "memory"

[evaluation]
parallel_fetch = true
"#,
        )
        .unwrap();

        let config = load_config_with_env(
            Some(&path),
            env(&[("PROJECTIONS__CACHE__TTL_HOURS", "48"), ("PROJECTIONS__LOGGING__LEVEL", "debug")]),
        )
        .unwrap();

        assert_eq!(config.cache.ttl_hours, 48);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.evaluation.parallel_fetch);
        // untouched sections keep their defaults
        assert_eq!(config.evaluation.default_user, "guest");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_config_with_env(Some(Path::new("/nonexistent/projections.toml")), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load_config_with_env(None, env(&[("PROJECTIONS__LOGGING__LEVEL", "loud")])).is_err());
        assert!(load_config_with_env(None, env(&[("PROJECTIONS__LOGGING__FORMAT", "xml")])).is_err());
        assert!(load_config_with_env(None, env(&[("PROJECTIONS__CACHE__TTL_HOURS", "0")])).is_err());
    }
}
