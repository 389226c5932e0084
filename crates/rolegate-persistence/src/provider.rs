//! Persistence trait and provider selection.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use rolegate_core::AppResult;
use rolegate_core::config::persistence::{PersistenceConfig, PersistenceProvider};
use rolegate_core::types::SubjectId;
use rolegate_entity::permission::PermissionSet;
use rolegate_entity::role::RoleName;
use rolegate_entity::snapshot::PermissionSnapshot;

use crate::json::JsonFilePersistence;
use crate::memory::MemoryPersistence;

/// Durable storage for role defaults, overrides, and subject roles.
///
/// Each write must be committed when the future resolves `Ok`; callers
/// treat in-memory state as authoritative only after that.
#[async_trait]
pub trait PermissionPersistence: Send + Sync + std::fmt::Debug + 'static {
    /// Load the stored snapshot. `None` means nothing has been stored yet.
    async fn load(&self) -> AppResult<Option<PermissionSnapshot>>;

    /// Replace the entire stored state.
    async fn store_snapshot(&self, snapshot: &PermissionSnapshot) -> AppResult<()>;

    /// Store a role's default permission set, creating the role if needed.
    async fn save_role(&self, role: &RoleName, permissions: &PermissionSet) -> AppResult<()>;

    /// Store a subject's override.
    async fn save_override(
        &self,
        subject_id: SubjectId,
        permissions: &PermissionSet,
    ) -> AppResult<()>;

    /// Delete a subject's override. Deleting a missing override succeeds.
    async fn delete_override(&self, subject_id: SubjectId) -> AppResult<()>;

    /// Store a subject's role assignment.
    async fn save_subject(&self, subject_id: SubjectId, role: &RoleName) -> AppResult<()>;
}

/// Build the persistence collaborator selected by configuration.
pub fn create_persistence(config: &PersistenceConfig) -> Arc<dyn PermissionPersistence> {
    match config.provider {
        PersistenceProvider::Memory => {
            info!("Initializing in-memory permission persistence");
            Arc::new(MemoryPersistence::new())
        }
        PersistenceProvider::Json => {
            info!(path = %config.path, "Initializing JSON file permission persistence");
            Arc::new(JsonFilePersistence::new(&config.path))
        }
    }
}
