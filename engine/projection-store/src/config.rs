use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which backend holds projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
    Postgres,
}

/// Configuration for the projection store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// JSON file used by the `file` backend
    pub path: PathBuf,

    /// Connection string for the `postgres` backend
    pub database_url: Option<String>,

    /// Pool size for the `postgres` backend
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            path: PathBuf::from("./data/projections.json"),
            database_url: None,
            max_connections: 5,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self.backend {
            StoreBackend::Postgres => {
                if self.database_url.as_deref().map_or(true, |url| url.trim().is_empty()) {
                    return Err("store.database_url is required for the postgres backend".to_string());
                }
                if self.max_connections == 0 {
                    return Err("store.max_connections must be greater than zero".to_string());
                }
            }
            StoreBackend::File => {
                if self.path.as_os_str().is_empty() {
                    return Err("store.path is required for the file backend".to_string());
                }
            }
            StoreBackend::Memory => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_file_backend() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StoreBackend::File);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_requires_url() {
        let config = StoreConfig { backend: StoreBackend::Postgres, ..Default::default() };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            backend: StoreBackend::Postgres,
            database_url: Some("postgres://localhost/projections".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_names() {
        let backend: StoreBackend = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(backend, StoreBackend::Postgres);
    }
}
