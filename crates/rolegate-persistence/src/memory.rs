//! In-memory persistence collaborator.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use rolegate_core::types::SubjectId;
use rolegate_core::{AppError, AppResult};
use rolegate_entity::permission::PermissionSet;
use rolegate_entity::role::RoleName;
use rolegate_entity::snapshot::PermissionSnapshot;

use crate::provider::PermissionPersistence;

/// Process-local persistence.
///
/// `load` returns `None` until the first write.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    /// Stored state; `None` until something is written.
    state: RwLock<Option<PermissionSnapshot>>,
    /// When set, every write fails with a storage error.
    fail_writes: AtomicBool,
}

impl MemoryPersistence {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `snapshot`.
    pub fn with_snapshot(snapshot: PermissionSnapshot) -> Self {
        Self {
            state: RwLock::new(Some(snapshot)),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Return a copy of the stored state.
    pub async fn current(&self) -> Option<PermissionSnapshot> {
        self.state.read().await.clone()
    }

    async fn write<F>(&self, apply: F) -> AppResult<()>
    where
        F: FnOnce(&mut PermissionSnapshot) + Send,
    {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::storage("Permission store is unavailable"));
        }
        let mut state = self.state.write().await;
        apply(state.get_or_insert_with(PermissionSnapshot::default));
        Ok(())
    }
}

#[async_trait]
impl PermissionPersistence for MemoryPersistence {
    async fn load(&self) -> AppResult<Option<PermissionSnapshot>> {
        Ok(self.state.read().await.clone())
    }

    async fn store_snapshot(&self, snapshot: &PermissionSnapshot) -> AppResult<()> {
        let snapshot = snapshot.clone();
        self.write(move |state| *state = snapshot).await
    }

    async fn save_role(&self, role: &RoleName, permissions: &PermissionSet) -> AppResult<()> {
        let (role, permissions) = (role.clone(), permissions.clone());
        self.write(move |state| state.upsert_role(role, permissions))
            .await
    }

    async fn save_override(
        &self,
        subject_id: SubjectId,
        permissions: &PermissionSet,
    ) -> AppResult<()> {
        let permissions = permissions.clone();
        self.write(move |state| {
            state.overrides.insert(subject_id, permissions);
        })
        .await
    }

    async fn delete_override(&self, subject_id: SubjectId) -> AppResult<()> {
        self.write(move |state| {
            state.overrides.remove(&subject_id);
        })
        .await
    }

    async fn save_subject(&self, subject_id: SubjectId, role: &RoleName) -> AppResult<()> {
        let role = role.clone();
        self.write(move |state| {
            state.subjects.insert(subject_id, role);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::error::ErrorKind;
    use rolegate_entity::permission::Permission;

    #[tokio::test]
    async fn test_load_is_none_until_written() {
        let store = MemoryPersistence::new();
        assert!(store.load().await.unwrap().is_none());

        store
            .save_role(&RoleName::new("Staff").unwrap(), &PermissionSet::empty())
            .await
            .unwrap();
        let snapshot = store.load().await.unwrap().unwrap();
        assert_eq!(snapshot.roles.len(), 1);
    }

    #[tokio::test]
    async fn test_override_lifecycle() {
        let store = MemoryPersistence::new();
        let subject = SubjectId::new();

        store
            .save_override(subject, &PermissionSet::from([Permission::ViewReports]))
            .await
            .unwrap();
        assert!(store.current().await.unwrap().overrides.contains_key(&subject));

        store.delete_override(subject).await.unwrap();
        store.delete_override(subject).await.unwrap();
        assert!(store.current().await.unwrap().overrides.is_empty());
    }

    #[tokio::test]
    async fn test_failing_writes_leave_state_untouched() {
        let store = MemoryPersistence::new();
        store.set_fail_writes(true);

        let err = store
            .save_subject(SubjectId::new(), &RoleName::new("Staff").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(store.current().await.is_none());
    }
}
