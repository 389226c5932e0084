//! JSON file persistence collaborator.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use rolegate_core::error::ErrorKind;
use rolegate_core::types::SubjectId;
use rolegate_core::{AppError, AppResult};
use rolegate_entity::permission::PermissionSet;
use rolegate_entity::role::RoleName;
use rolegate_entity::snapshot::PermissionSnapshot;

use crate::provider::PermissionPersistence;

/// Stores the permission snapshot as a single pretty-printed JSON file.
///
/// Every write serializes the full document to a sibling temp file and
/// renames it over the target, so readers of the file never see a
/// partial document. Writers are serialized by a mutex.
#[derive(Debug)]
pub struct JsonFilePersistence {
    /// Target file.
    path: PathBuf,
    /// Last committed snapshot; `None` until first read or write.
    committed: Mutex<Option<PermissionSnapshot>>,
}

impl JsonFilePersistence {
    /// Create a store backed by the file at `path`. The file need not exist.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            committed: Mutex::new(None),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> AppResult<Option<PermissionSnapshot>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read {}", self.path.display()),
                    e,
                ));
            }
        };

        let snapshot: PermissionSnapshot = serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Invalid permission document {}: {e}", self.path.display()),
                e,
            )
        })?;
        snapshot.validate()?;
        Ok(Some(snapshot))
    }

    async fn write_file(&self, snapshot: &PermissionSnapshot) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace {}", self.path.display()),
                e,
            )
        })?;

        debug!(path = %self.path.display(), "Permission document written");
        Ok(())
    }

    /// Apply `mutate` to the committed snapshot and write the result.
    ///
    /// The cached snapshot only advances after the file write succeeds.
    async fn update<F>(&self, mutate: F) -> AppResult<()>
    where
        F: FnOnce(&mut PermissionSnapshot) + Send,
    {
        let mut committed = self.committed.lock().await;
        let mut next = match committed.as_ref() {
            Some(snapshot) => snapshot.clone(),
            None => self.read_file().await?.unwrap_or_default(),
        };
        mutate(&mut next);
        self.write_file(&next).await?;
        *committed = Some(next);
        Ok(())
    }
}

#[async_trait]
impl PermissionPersistence for JsonFilePersistence {
    async fn load(&self) -> AppResult<Option<PermissionSnapshot>> {
        let mut committed = self.committed.lock().await;
        let snapshot = self.read_file().await?;
        if let Some(ref snapshot) = snapshot {
            info!(
                path = %self.path.display(),
                roles = snapshot.roles.len(),
                overrides = snapshot.overrides.len(),
                "Loaded permission document"
            );
        }
        *committed = snapshot.clone();
        Ok(snapshot)
    }

    async fn store_snapshot(&self, snapshot: &PermissionSnapshot) -> AppResult<()> {
        let snapshot = snapshot.clone();
        self.update(move |state| *state = snapshot).await
    }

    async fn save_role(&self, role: &RoleName, permissions: &PermissionSet) -> AppResult<()> {
        let (role, permissions) = (role.clone(), permissions.clone());
        self.update(move |state| state.upsert_role(role, permissions))
            .await
    }

    async fn save_override(
        &self,
        subject_id: SubjectId,
        permissions: &PermissionSet,
    ) -> AppResult<()> {
        let permissions = permissions.clone();
        self.update(move |state| {
            state.overrides.insert(subject_id, permissions);
        })
        .await
    }

    async fn delete_override(&self, subject_id: SubjectId) -> AppResult<()> {
        self.update(move |state| {
            state.overrides.remove(&subject_id);
        })
        .await
    }

    async fn save_subject(&self, subject_id: SubjectId, role: &RoleName) -> AppResult<()> {
        let role = role.clone();
        self.update(move |state| {
            state.subjects.insert(subject_id, role);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_entity::permission::Permission;

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePersistence::new(dir.path().join("absent.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_writes_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("permissions.json");
        let subject = SubjectId::new();

        let store = JsonFilePersistence::new(&path);
        store
            .save_role(
                &RoleName::new("Manager").unwrap(),
                &PermissionSet::from([Permission::ViewReports]),
            )
            .await
            .unwrap();
        store
            .save_subject(subject, &RoleName::new("Manager").unwrap())
            .await
            .unwrap();
        store
            .save_override(subject, &PermissionSet::empty())
            .await
            .unwrap();

        let reopened = JsonFilePersistence::new(&path);
        let snapshot = reopened.load().await.unwrap().unwrap();
        assert_eq!(snapshot.roles.len(), 1);
        assert_eq!(snapshot.subjects.get(&subject).unwrap().as_str(), "Manager");
        assert_eq!(snapshot.overrides.get(&subject), Some(&PermissionSet::empty()));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_delete_override_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.json");
        let subject = SubjectId::new();

        let store = JsonFilePersistence::new(&path);
        store
            .save_override(subject, &PermissionSet::all())
            .await
            .unwrap();
        store.delete_override(subject).await.unwrap();

        let snapshot = JsonFilePersistence::new(&path).load().await.unwrap().unwrap();
        assert!(snapshot.overrides.is_empty());
    }

    #[tokio::test]
    async fn test_document_with_unknown_permission_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permissions.json");
        std::fs::write(
            &path,
            r#"{"roles":[{"name":"Staff","permissions":["VIEW_REPORTS","FIRE_EVERYONE"]}]}"#,
        )
        .unwrap();

        let err = JsonFilePersistence::new(&path).load().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
        assert!(err.message.contains("FIRE_EVERYONE"));
    }
}
