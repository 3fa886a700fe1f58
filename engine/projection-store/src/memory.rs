//! In-memory projection store

use async_trait::async_trait;
use parking_lot::RwLock;
use projection_model::{NewProjection, Projection, ProjectionId};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::ProjectionStore;

/// Projections held in process memory, in creation order
#[derive(Default)]
pub struct MemoryStore {
    projections: RwLock<Vec<Projection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records
    pub fn with_projections(projections: Vec<Projection>) -> Self {
        Self { projections: RwLock::new(projections) }
    }

    /// Look up a projection regardless of owner
    pub fn get(&self, id: ProjectionId) -> Option<Projection> {
        self.projections.read().iter().find(|projection| projection.id == id).cloned()
    }
}

#[async_trait]
impl ProjectionStore for MemoryStore {
    async fn list(&self, user_id: &str) -> Result<Vec<Projection>> {
        Ok(self
            .projections
            .read()
            .iter()
            .filter(|projection| projection.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewProjection) -> Result<Projection> {
        let projection = Projection::from_new(Uuid::new_v4(), new);
        self.projections.write().push(projection.clone());
        Ok(projection)
    }

    async fn delete(&self, user_id: &str, id: ProjectionId) -> Result<bool> {
        let mut projections = self.projections.write();
        let before = projections.len();
        projections.retain(|projection| !(projection.id == id && projection.user_id == user_id));
        Ok(projections.len() != before)
    }

    async fn update_result(&self, id: ProjectionId, actual: f64, met: bool) -> Result<()> {
        let mut projections = self.projections.write();
        let projection = projections
            .iter_mut()
            .find(|projection| projection.id == id)
            .ok_or(StoreError::NotFound { id })?;
        if projection.is_resolved() {
            return Err(StoreError::AlreadyResolved { id });
        }

        projection.actual = Some(actual);
        projection.met = Some(met);
        Ok(())
    }
}
