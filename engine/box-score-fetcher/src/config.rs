use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

/// Configuration for the upstream provider adapters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// MLB Stats API configuration
    pub mlb: MlbApiConfig,

    /// API-NBA configuration
    pub nba: NbaApiConfig,

    /// Shared HTTP client settings
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlbApiConfig {
    /// Base URL of the MLB Stats API
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NbaApiConfig {
    /// Base URL of the API-NBA service
    pub base_url: String,

    /// Value sent as the X-RapidAPI-Host header
    pub api_host: String,

    /// Environment variable holding the RapidAPI key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request read timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for MlbApiConfig {
    fn default() -> Self {
        Self { base_url: "https://statsapi.mlb.com/api/v1".to_string() }
    }
}

impl Default for NbaApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-nba-v1.p.rapidapi.com".to_string(),
            api_host: "api-nba-v1.p.rapidapi.com".to_string(),
            api_key_env: "RAPIDAPI_KEY".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { request_timeout_secs: 10, user_agent: "bet-tracker/0.1".to_string() }
    }
}

impl FetcherConfig {
    /// Get the API-NBA key from the environment
    pub fn get_nba_api_key(&self) -> Result<String> {
        std::env::var(&self.nba.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| FetchError::MissingCredentials(self.nba.api_key_env.clone()))
    }

    /// Validate settings that would otherwise hang or break every request
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.http.request_timeout_secs == 0 {
            return Err("http.request_timeout_secs must be greater than zero".to_string());
        }
        if self.mlb.base_url.trim().is_empty() || self.nba.base_url.trim().is_empty() {
            return Err("provider base URLs must not be empty".to_string());
        }
        Ok(())
    }
}
