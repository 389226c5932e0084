//! Shared fixtures for service integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rolegate_core::config::AppConfig;
use rolegate_core::config::access::UnknownRolePolicy;
use rolegate_core::types::SubjectId;
use rolegate_entity::permission::{Permission, PermissionSet};
use rolegate_entity::role::RoleName;
use rolegate_entity::snapshot::{PermissionSnapshot, RoleRecord};
use rolegate_entity::subject::Subject;
use rolegate_persistence::MemoryPersistence;
use rolegate_service::{PermissionEngine, RequestContext};

/// Engine over in-memory persistence with an administrator already seeded.
pub struct TestApp {
    pub engine: PermissionEngine,
    pub store: Arc<MemoryPersistence>,
    pub admin: Subject,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(UnknownRolePolicy::Empty).await
    }

    pub async fn with_policy(policy: UnknownRolePolicy) -> Self {
        let admin = Subject::new(SubjectId::new(), role("Admin"));

        let mut snapshot = PermissionSnapshot {
            roles: vec![
                RoleRecord {
                    name: role("Admin"),
                    permissions: PermissionSet::from([
                        Permission::ManageSettings,
                        Permission::ViewReports,
                    ]),
                },
                RoleRecord {
                    name: role("Manager"),
                    permissions: PermissionSet::from([
                        Permission::ViewReports,
                        Permission::ManageEmployees,
                    ]),
                },
                RoleRecord {
                    name: role("Staff"),
                    permissions: PermissionSet::empty(),
                },
            ],
            ..PermissionSnapshot::default()
        };
        snapshot.subjects.insert(admin.id, admin.role.clone());

        let store = Arc::new(MemoryPersistence::with_snapshot(snapshot));
        let mut config = AppConfig::default();
        config.access.unknown_role = policy;
        let engine = PermissionEngine::load(&config, store.clone())
            .await
            .expect("engine should load");

        Self {
            engine,
            store,
            admin,
        }
    }

    /// Context for the seeded administrator.
    pub fn admin_ctx(&self) -> RequestContext {
        RequestContext::new(self.admin.clone())
    }

    /// Registers a new subject with `role_name` through the admin API.
    pub async fn create_subject(&self, role_name: &str) -> Subject {
        self.engine
            .admin()
            .assign_role(&self.admin_ctx(), SubjectId::new(), role(role_name))
            .await
            .expect("role assignment should succeed")
    }

    pub fn can(&self, subject: &Subject, permission: Permission) -> bool {
        self.engine.resolver().has_permission(Some(subject), permission)
    }
}

pub fn role(name: &str) -> RoleName {
    RoleName::new(name).expect("valid role name")
}
