//! Engine wiring: builds the registries from persistence and hands out
//! the resolver and the administration service.

use std::sync::Arc;

use tracing::{info, warn};

use rolegate_auth::overrides::OverrideStore;
use rolegate_auth::rbac::{PermissionResolver, RoleRegistry};
use rolegate_auth::subject::SubjectRegistry;
use rolegate_core::{AppError, AppResult};
use rolegate_core::config::AppConfig;
use rolegate_core::config::access::RoleSeedConfig;
use rolegate_core::events::EventBus;
use rolegate_core::types::SubjectId;
use rolegate_entity::permission::Permission;
use rolegate_entity::role::RoleName;
use rolegate_entity::snapshot::PermissionSnapshot;
use rolegate_entity::subject::Subject;
use rolegate_persistence::{PermissionPersistence, create_persistence};

use crate::admin::{AdministrationService, SubjectPermissionView};

/// The running permission engine.
///
/// Owns the role registry, override store, and subject registry. The
/// resolver and administration service share them through `Arc`, so a
/// committed administrative write is visible to the very next check.
#[derive(Debug, Clone)]
pub struct PermissionEngine {
    roles: Arc<RoleRegistry>,
    overrides: Arc<OverrideStore>,
    subjects: Arc<SubjectRegistry>,
    persistence: Arc<dyn PermissionPersistence>,
    resolver: PermissionResolver,
    admin: AdministrationService,
    events: EventBus,
    seeds: Vec<RoleSeedConfig>,
}

impl PermissionEngine {
    /// Builds an engine using the persistence provider named in `config`.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let persistence = create_persistence(&config.persistence);
        Self::load(config, persistence).await
    }

    /// Builds an engine over an explicit persistence collaborator.
    ///
    /// If the store is empty, the configured role seeds are written to it
    /// before the engine starts serving.
    pub async fn load(
        config: &AppConfig,
        persistence: Arc<dyn PermissionPersistence>,
    ) -> AppResult<Self> {
        let admin_permission: Permission = config.access.admin_permission.parse()?;
        let seeds = config.access.roles.clone();

        let snapshot = match persistence.load().await? {
            Some(snapshot) => snapshot,
            None => {
                let snapshot = PermissionSnapshot::from_seeds(&seeds)?;
                persistence.store_snapshot(&snapshot).await?;
                info!(roles = snapshot.roles.len(), "Seeded permission store from configuration");
                snapshot
            }
        };
        snapshot.validate()?;

        let roles = Arc::new(RoleRegistry::from_records(snapshot.roles));
        let overrides = Arc::new(OverrideStore::new());
        overrides.replace_all(snapshot.overrides);
        let subjects = Arc::new(SubjectRegistry::new());
        subjects.replace_all(snapshot.subjects);

        let resolver = PermissionResolver::new(Arc::clone(&roles), Arc::clone(&overrides));
        let events = EventBus::default();
        let admin = AdministrationService::new(
            resolver.clone(),
            Arc::clone(&roles),
            Arc::clone(&overrides),
            Arc::clone(&subjects),
            Arc::clone(&persistence),
            events.clone(),
            admin_permission,
            config.access.unknown_role,
        );

        info!(
            roles = roles.len(),
            overrides = overrides.len(),
            admin_permission = %admin_permission,
            "Permission engine ready"
        );

        Ok(Self {
            roles,
            overrides,
            subjects,
            persistence,
            resolver,
            admin,
            events,
            seeds,
        })
    }

    /// Re-reads persistence and replaces in-memory state.
    ///
    /// An empty store is re-seeded from configuration and the seeds are
    /// written back before they are served, as on startup.
    ///
    /// Concurrent checks observe either the old or the new value per key;
    /// a role present in both never disappears mid-reload.
    pub async fn reload(&self) -> AppResult<()> {
        let snapshot = match self.persistence.load().await? {
            Some(snapshot) => snapshot,
            None => {
                let snapshot = PermissionSnapshot::from_seeds(&self.seeds)?;
                snapshot.validate()?;
                self.persistence.store_snapshot(&snapshot).await?;
                warn!(
                    roles = snapshot.roles.len(),
                    "Store was empty on reload; re-seeded from configuration"
                );
                snapshot
            }
        };
        snapshot.validate()?;

        let (roles, overrides, subjects) =
            (snapshot.roles.len(), snapshot.overrides.len(), snapshot.subjects.len());
        self.roles.replace_all(snapshot.roles);
        self.overrides.replace_all(snapshot.overrides);
        self.subjects.replace_all(snapshot.subjects);

        info!(roles, overrides, subjects, "Permission state reloaded");
        Ok(())
    }

    /// Assigns `role` to a subject without an acting administrator.
    ///
    /// Only allowed while no subject holds the administration permission,
    /// and only for a role whose defaults grant it. This is how the first
    /// administrator of a fresh store is created.
    pub async fn bootstrap_admin(&self, subject_id: SubjectId, role: RoleName) -> AppResult<Subject> {
        let required = self.admin.admin_permission();

        if let Some(existing) = self
            .subjects
            .list()
            .into_iter()
            .find(|s| self.resolver.has_permission(Some(s), required))
        {
            return Err(AppError::validation(format!(
                "Subject '{}' already holds '{required}'; use the administration API",
                existing.id
            )));
        }
        if !self.roles.get_defaults(role.as_str()).contains(required) {
            return Err(AppError::validation(format!(
                "Role '{role}' does not grant '{required}'"
            )));
        }

        self.persistence.save_subject(subject_id, &role).await?;
        self.subjects.assign_role(subject_id, role.clone());
        warn!(subject_id = %subject_id, role = %role, "Bootstrapped administrator");

        Ok(Subject::new(subject_id, role))
    }

    /// The permission check entry point.
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// The administration API.
    pub fn admin(&self) -> &AdministrationService {
        &self.admin
    }

    /// Role defaults.
    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    /// Subject overrides.
    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    /// Subject role assignments.
    pub fn subjects(&self) -> &SubjectRegistry {
        &self.subjects
    }

    /// Event bus carrying administration events.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Checks `permission` for a subject known to the engine's directory.
    pub fn has_permission(&self, subject_id: SubjectId, permission: Permission) -> bool {
        self.resolver
            .check_subject(&*self.subjects, subject_id, permission)
    }

    /// Operator view of one subject, without an acting administrator.
    pub fn inspect_subject(&self, subject_id: SubjectId) -> AppResult<SubjectPermissionView> {
        SubjectPermissionView::build(&self.resolver, &self.subjects, &self.overrides, subject_id)
    }

    /// Current in-memory state as a snapshot.
    pub fn snapshot(&self) -> PermissionSnapshot {
        PermissionSnapshot {
            roles: self.roles.snapshot(),
            overrides: self.overrides.snapshot(),
            subjects: self.subjects.snapshot(),
        }
    }
}
