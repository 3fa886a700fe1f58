//! Single-file JSON projection store

use async_trait::async_trait;
use projection_model::{NewProjection, Projection, ProjectionId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::ProjectionStore;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    projections: Vec<Projection>,
}

/// Projections kept in one JSON file, rewritten on every mutation
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreFile>,
}

impl JsonFileStore {
    /// Open the store, creating an empty one if the file does not exist
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let state = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => StoreFile::default(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        debug!("Loaded {} projections from {}", state.projections.len(), path.display());
        Ok(Self { path, state: Mutex::new(state) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, state: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectionStore for JsonFileStore {
    async fn list(&self, user_id: &str) -> Result<Vec<Projection>> {
        let state = self.state.lock().await;
        Ok(state
            .projections
            .iter()
            .filter(|projection| projection.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewProjection) -> Result<Projection> {
        let projection = Projection::from_new(Uuid::new_v4(), new);

        let mut state = self.state.lock().await;
        state.projections.push(projection.clone());
        if let Err(e) = self.write(&state).await {
            state.projections.pop();
            return Err(e);
        }

        Ok(projection)
    }

    async fn delete(&self, user_id: &str, id: ProjectionId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(index) = state
            .projections
            .iter()
            .position(|projection| projection.id == id && projection.user_id == user_id)
        else {
            return Ok(false);
        };

        let removed = state.projections.remove(index);
        if let Err(e) = self.write(&state).await {
            state.projections.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }

    async fn update_result(&self, id: ProjectionId, actual: f64, met: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        let index = state
            .projections
            .iter()
            .position(|projection| projection.id == id)
            .ok_or(StoreError::NotFound { id })?;
        if state.projections[index].is_resolved() {
            return Err(StoreError::AlreadyResolved { id });
        }

        state.projections[index].actual = Some(actual);
        state.projections[index].met = Some(met);

        if let Err(e) = self.write(&state).await {
            let projection = &mut state.projections[index];
            projection.actual = None;
            projection.met = None;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use projection_model::Sport;
    use tempfile::TempDir;

    fn new_projection(player: &str, target: f64) -> NewProjection {
        NewProjection {
            user_id: "guest".to_string(),
            sport: Sport::Nba,
            player: player.to_string(),
            metric: "PRA".to_string(),
            target,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("projections.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        let luka = store.create(new_projection("Luka Doncic", 40.0)).await.unwrap();
        let jokic = store.create(new_projection("Nikola Jokic", 50.0)).await.unwrap();
        store.update_result(luka.id, 45.0, true).await.unwrap();
        assert!(store.delete("guest", jokic.id).await.unwrap());
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let listed = reopened.list("guest").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, luka.id);
        assert_eq!(listed[0].actual, Some(45.0));
        assert_eq!(listed[0].met, Some(true));
        assert!(reopened.list_pending("guest").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path().join("none.json")).await.unwrap();
        assert!(store.list("guest").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("projections.json");
        std::fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(JsonFileStore::open(&path).await, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_resolved_record_is_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("projections.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        let luka = store.create(new_projection("Luka Doncic", 40.0)).await.unwrap();
        store.update_result(luka.id, 45.0, true).await.unwrap();

        let result = store.update_result(luka.id, 12.0, false).await;
        assert!(matches!(result, Err(StoreError::AlreadyResolved { id }) if id == luka.id));
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let listed = reopened.list("guest").await.unwrap();
        assert_eq!(listed[0].actual, Some(45.0));
        assert_eq!(listed[0].met, Some(true));
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path().join("projections.json")).await.unwrap();
        let result = store.update_result(Uuid::new_v4(), 1.0, true).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
