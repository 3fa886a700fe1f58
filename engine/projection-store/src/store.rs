//! Projection store trait and backend selection

use async_trait::async_trait;
use projection_model::{NewProjection, Projection, ProjectionId};
use std::sync::Arc;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{Result, StoreError};
use crate::file::JsonFileStore;
use crate::memory::MemoryStore;
use crate::postgres::PgStore;

/// Abstract trait for projection storage backends
#[async_trait]
pub trait ProjectionStore: Send + Sync {
    /// Every projection owned by `user_id`
    async fn list(&self, user_id: &str) -> Result<Vec<Projection>>;

    /// Projections owned by `user_id` that have no actual value yet
    async fn list_pending(&self, user_id: &str) -> Result<Vec<Projection>> {
        let projections = self.list(user_id).await?;
        Ok(projections.into_iter().filter(|projection| !projection.is_resolved()).collect())
    }

    /// Store a new unresolved projection under a fresh id
    async fn create(&self, new: NewProjection) -> Result<Projection>;

    /// Delete a projection scoped by owner. Returns false if nothing matched.
    async fn delete(&self, user_id: &str, id: ProjectionId) -> Result<bool>;

    /// Record the observed value for a projection.
    ///
    /// Fails with [`StoreError::AlreadyResolved`] if a result is already stored.
    async fn update_result(&self, id: ProjectionId, actual: f64, met: bool) -> Result<()>;
}

/// Open the backend named in the configuration
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn ProjectionStore>> {
    config.validate().map_err(StoreError::config)?;

    let store: Arc<dyn ProjectionStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(JsonFileStore::open(&config.path).await?),
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| StoreError::config("database_url is not set"))?;
            let store = PgStore::connect(url, config.max_connections).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
    };

    info!("Opened {:?} projection store", config.backend);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_memory_store() {
        let config = StoreConfig { backend: StoreBackend::Memory, ..Default::default() };
        let store = open_store(&config).await.unwrap();
        assert!(store.list("guest").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig {
            backend: StoreBackend::File,
            path: temp_dir.path().join("projections.json"),
            ..Default::default()
        };
        let store = open_store(&config).await.unwrap();
        assert!(store.list("guest").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_postgres_without_url_fails() {
        let config = StoreConfig { backend: StoreBackend::Postgres, ..Default::default() };
        assert!(matches!(open_store(&config).await, Err(StoreError::InvalidConfig { .. })));
    }
}
