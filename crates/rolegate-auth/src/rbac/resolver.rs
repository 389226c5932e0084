//! Effective permission resolver.
//!
//! Resolution order:
//! 1. No subject: nothing is granted.
//! 2. Override: if the subject has one, it is the effective set verbatim.
//! 3. Role defaults: the live defaults of the subject's role; an unknown
//!    role grants nothing.
//!
//! Every call reads current registry and store contents. Nothing is
//! cached, so edits to role defaults reach subjects without an override
//! immediately.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rolegate_core::traits::SubjectDirectory;
use rolegate_core::types::SubjectId;
use rolegate_core::{AppError, AppResult};
use rolegate_entity::permission::{Permission, PermissionSet};
use rolegate_entity::role::RoleName;
use rolegate_entity::subject::Subject;

use crate::overrides::OverrideStore;

use super::registry::RoleRegistry;

/// Where an effective permission set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    /// No subject was supplied.
    NoSubject,
    /// The subject's override replaced its role defaults.
    Override,
    /// The subject's role defaults.
    RoleDefaults,
    /// The subject's role is not registered.
    UnknownRole,
}

impl std::fmt::Display for PermissionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NoSubject => "no_subject",
            Self::Override => "override",
            Self::RoleDefaults => "role_defaults",
            Self::UnknownRole => "unknown_role",
        };
        f.write_str(text)
    }
}

/// An effective permission set together with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePermissions {
    /// The granted permissions.
    pub permissions: PermissionSet,
    /// How they were resolved.
    pub source: PermissionSource,
}

/// Computes effective permissions from a role registry and an override store.
///
/// Read paths never fail: a missing subject or unknown role yields the
/// empty set and `false`.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    /// Role defaults.
    roles: Arc<RoleRegistry>,
    /// Subject overrides.
    overrides: Arc<OverrideStore>,
}

impl PermissionResolver {
    /// Creates a resolver over the given registry and store.
    pub fn new(roles: Arc<RoleRegistry>, overrides: Arc<OverrideStore>) -> Self {
        Self { roles, overrides }
    }

    /// Resolves the subject's permissions and reports their source.
    pub fn explain(&self, subject: Option<&Subject>) -> EffectivePermissions {
        let Some(subject) = subject else {
            return EffectivePermissions {
                permissions: PermissionSet::empty(),
                source: PermissionSource::NoSubject,
            };
        };

        if let Some(permissions) = self.overrides.get_override(subject.id) {
            return EffectivePermissions {
                permissions,
                source: PermissionSource::Override,
            };
        }

        match self.roles.require_defaults(subject.role.as_str()) {
            Ok(permissions) => EffectivePermissions {
                permissions,
                source: PermissionSource::RoleDefaults,
            },
            Err(_) => EffectivePermissions {
                permissions: PermissionSet::empty(),
                source: PermissionSource::UnknownRole,
            },
        }
    }

    /// Returns the subject's effective permission set.
    pub fn effective_permissions(&self, subject: Option<&Subject>) -> PermissionSet {
        match subject {
            None => PermissionSet::empty(),
            Some(subject) => self
                .overrides
                .get_override(subject.id)
                .unwrap_or_else(|| self.roles.get_defaults(subject.role.as_str())),
        }
    }

    /// Returns `true` if the subject holds `permission`.
    ///
    /// A missing subject holds nothing.
    pub fn has_permission(&self, subject: Option<&Subject>, permission: Permission) -> bool {
        let Some(subject) = subject else {
            debug!(permission = %permission, "Denied: no subject");
            return false;
        };

        let granted = match self.overrides.get_override(subject.id) {
            Some(custom) => custom.contains(permission),
            None => self
                .roles
                .get_defaults(subject.role.as_str())
                .contains(permission),
        };

        if !granted {
            debug!(
                subject_id = %subject.id,
                role = %subject.role,
                permission = %permission,
                "Denied"
            );
        }
        granted
    }

    /// String-boundary variant of [`has_permission`](Self::has_permission)
    /// for hosts that carry permission names as text.
    ///
    /// An identifier outside the catalog is denied and logged.
    pub fn has_permission_named(&self, subject: Option<&Subject>, identifier: &str) -> bool {
        match identifier.parse::<Permission>() {
            Ok(permission) => self.has_permission(subject, permission),
            Err(_) => {
                warn!(identifier, "Permission check for unknown identifier denied");
                false
            }
        }
    }

    /// Looks the subject up in `directory`, then checks `permission`.
    ///
    /// Unknown subjects and unparseable role names are denied.
    pub fn check_subject(
        &self,
        directory: &dyn SubjectDirectory,
        subject_id: SubjectId,
        permission: Permission,
    ) -> bool {
        let subject = directory
            .role_of(subject_id)
            .and_then(|role| RoleName::new(role).ok())
            .map(|role| Subject::new(subject_id, role));
        self.has_permission(subject.as_ref(), permission)
    }

    /// Returns `Ok(())` if the subject holds `permission`, otherwise an
    /// authorization error.
    pub fn require_permission(
        &self,
        subject: Option<&Subject>,
        permission: Permission,
    ) -> AppResult<()> {
        if self.has_permission(subject, permission) {
            return Ok(());
        }
        Err(match subject {
            None => AppError::authorization(format!(
                "No acting subject; '{permission}' is required"
            )),
            Some(subject) => AppError::authorization(format!(
                "Subject '{}' does not have permission '{permission}'",
                subject.id
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::SubjectRegistry;
    use rolegate_core::error::ErrorKind;

    fn manager_setup() -> (PermissionResolver, Arc<RoleRegistry>, Arc<OverrideStore>) {
        let roles = Arc::new(RoleRegistry::new());
        roles.set_defaults(
            RoleName::new("Manager").unwrap(),
            PermissionSet::from([Permission::ViewReports, Permission::ManageEmployees]),
        );
        let overrides = Arc::new(OverrideStore::new());
        let resolver = PermissionResolver::new(roles.clone(), overrides.clone());
        (resolver, roles, overrides)
    }

    fn manager() -> Subject {
        Subject::new(SubjectId::new(), RoleName::new("Manager").unwrap())
    }

    #[test]
    fn test_no_subject_has_nothing() {
        let (resolver, roles, _) = manager_setup();
        roles.set_defaults(RoleName::new("Everyone").unwrap(), PermissionSet::all());

        assert!(resolver.effective_permissions(None).is_empty());
        for permission in Permission::ALL {
            assert!(!resolver.has_permission(None, permission));
        }
        assert_eq!(resolver.explain(None).source, PermissionSource::NoSubject);
    }

    #[test]
    fn test_role_defaults_apply_without_override() {
        let (resolver, roles, _) = manager_setup();
        let e1 = manager();

        assert!(resolver.has_permission(Some(&e1), Permission::ViewReports));
        assert!(!resolver.has_permission(Some(&e1), Permission::ManageSettings));
        assert_eq!(
            resolver.effective_permissions(Some(&e1)),
            roles.get_defaults("Manager")
        );
    }

    #[test]
    fn test_defaults_are_read_live() {
        let (resolver, roles, _) = manager_setup();
        let e1 = manager();
        assert!(!resolver.has_permission(Some(&e1), Permission::ManageSettings));

        roles.set_defaults(
            RoleName::new("Manager").unwrap(),
            PermissionSet::from([Permission::ManageSettings]),
        );

        assert!(resolver.has_permission(Some(&e1), Permission::ManageSettings));
        assert!(!resolver.has_permission(Some(&e1), Permission::ViewReports));
    }

    #[test]
    fn test_override_replaces_defaults_entirely() {
        let (resolver, _, overrides) = manager_setup();
        let e1 = manager();
        let custom = PermissionSet::from([Permission::CreateSurveys]);
        overrides.set_override(e1.id, custom.clone());

        assert_eq!(resolver.effective_permissions(Some(&e1)), custom);
        assert!(!resolver.has_permission(Some(&e1), Permission::ViewReports));
        assert_eq!(
            resolver.explain(Some(&e1)).source,
            PermissionSource::Override
        );
    }

    #[test]
    fn test_empty_override_revokes_everything() {
        let (resolver, _, overrides) = manager_setup();
        let e1 = manager();
        overrides.set_override(e1.id, PermissionSet::empty());

        assert!(resolver.effective_permissions(Some(&e1)).is_empty());
        assert!(!resolver.has_permission(Some(&e1), Permission::ViewReports));
    }

    #[test]
    fn test_override_ignores_later_default_edits() {
        let (resolver, roles, overrides) = manager_setup();
        let e1 = manager();
        overrides.set_override(e1.id, PermissionSet::from([Permission::ViewReports]));

        roles.set_defaults(RoleName::new("Manager").unwrap(), PermissionSet::all());

        assert_eq!(
            resolver.effective_permissions(Some(&e1)),
            PermissionSet::from([Permission::ViewReports])
        );
    }

    #[test]
    fn test_unknown_role_fails_closed() {
        let (resolver, _, _) = manager_setup();
        let ghost = Subject::new(SubjectId::new(), RoleName::new("Ghost").unwrap());

        assert!(resolver.effective_permissions(Some(&ghost)).is_empty());
        assert!(!resolver.has_permission(Some(&ghost), Permission::ViewReports));
        assert_eq!(
            resolver.explain(Some(&ghost)).source,
            PermissionSource::UnknownRole
        );
    }

    #[test]
    fn test_named_check_denies_unknown_identifier() {
        let (resolver, _, _) = manager_setup();
        let e1 = manager();
        assert!(resolver.has_permission_named(Some(&e1), "VIEW_REPORTS"));
        assert!(!resolver.has_permission_named(Some(&e1), "view_reports"));
        assert!(!resolver.has_permission_named(Some(&e1), "ANYTHING"));
    }

    #[test]
    fn test_check_subject_through_directory() {
        let (resolver, _, _) = manager_setup();
        let directory = SubjectRegistry::new();
        let known = SubjectId::new();
        directory.assign_role(known, RoleName::new("Manager").unwrap());

        assert!(resolver.check_subject(&directory, known, Permission::ViewReports));
        assert!(!resolver.check_subject(&directory, SubjectId::new(), Permission::ViewReports));
    }

    #[test]
    fn test_require_permission() {
        let (resolver, _, _) = manager_setup();
        let e1 = manager();

        assert!(resolver.require_permission(Some(&e1), Permission::ViewReports).is_ok());
        let err = resolver
            .require_permission(Some(&e1), Permission::ManageSettings)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let err = resolver
            .require_permission(None, Permission::ViewReports)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[test]
    fn test_readers_never_observe_a_torn_set() {
        let (resolver, roles, _) = manager_setup();
        let a = PermissionSet::from([Permission::ViewReports, Permission::ManageEmployees]);
        let b = PermissionSet::from([Permission::CreateSurveys, Permission::SendNotifications]);
        let e1 = manager();

        std::thread::scope(|scope| {
            let writer_roles = roles.clone();
            let (wa, wb) = (a.clone(), b.clone());
            scope.spawn(move || {
                for i in 0..2_000 {
                    let next = if i % 2 == 0 { wb.clone() } else { wa.clone() };
                    writer_roles.set_defaults(RoleName::new("Manager").unwrap(), next);
                }
            });

            for _ in 0..4 {
                let resolver = resolver.clone();
                let (ra, rb) = (a.clone(), b.clone());
                let subject = e1.clone();
                scope.spawn(move || {
                    for _ in 0..2_000 {
                        let seen = resolver.effective_permissions(Some(&subject));
                        assert!(seen == ra || seen == rb, "torn read: {seen}");
                    }
                });
            }
        });
    }
}
