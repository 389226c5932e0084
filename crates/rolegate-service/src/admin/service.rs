//! Administration service: role defaults, role assignment, subject
//! customization and reset.
//!
//! Every mutator runs the same sequence: authorize the caller through the
//! resolver, validate input, write to persistence, apply in memory, then
//! publish an event. A failure at any step before the in-memory apply
//! leaves state unchanged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use rolegate_auth::overrides::OverrideStore;
use rolegate_auth::rbac::{EffectivePermissions, PermissionResolver, RoleRegistry};
use rolegate_auth::subject::SubjectRegistry;
use rolegate_core::config::access::UnknownRolePolicy;
use rolegate_core::events::{DomainEvent, EventBus, PermissionEvent};
use rolegate_core::types::SubjectId;
use rolegate_core::{AppError, AppResult};
use rolegate_entity::permission::{Permission, PermissionSet, catalog};
use rolegate_entity::role::RoleName;
use rolegate_entity::subject::Subject;
use rolegate_persistence::PermissionPersistence;

use super::locks::KeyedLocks;
use crate::context::RequestContext;

/// Read-only administrative view of one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectPermissionView {
    /// The subject.
    pub subject_id: SubjectId,
    /// The subject's role.
    pub role: RoleName,
    /// The installed override, if any.
    pub custom: Option<PermissionSet>,
    /// The resolved permissions.
    pub effective: EffectivePermissions,
}

impl SubjectPermissionView {
    /// Assembles the view from live state.
    ///
    /// Fails with `NotFound` if the subject has no role.
    pub fn build(
        resolver: &PermissionResolver,
        subjects: &SubjectRegistry,
        overrides: &OverrideStore,
        subject_id: SubjectId,
    ) -> AppResult<Self> {
        let subject = require_subject(subjects, subject_id)?;
        Ok(Self {
            subject_id,
            custom: overrides.get_override(subject_id),
            effective: resolver.explain(Some(&subject)),
            role: subject.role,
        })
    }
}

/// Validated mutators over the role registry, override store, and
/// subject registry, gated by the same resolver they mutate.
#[derive(Debug, Clone)]
pub struct AdministrationService {
    /// Resolver used for caller authorization and read views.
    resolver: PermissionResolver,
    /// Role defaults.
    roles: Arc<RoleRegistry>,
    /// Subject overrides.
    overrides: Arc<OverrideStore>,
    /// Subject role assignments.
    subjects: Arc<SubjectRegistry>,
    /// Durable storage, written before memory.
    persistence: Arc<dyn PermissionPersistence>,
    /// Event publisher.
    events: EventBus,
    /// Per-key write serialization.
    locks: Arc<KeyedLocks>,
    /// Permission the caller must hold.
    admin_permission: Permission,
    /// Unknown-role handling on administration paths.
    unknown_role: UnknownRolePolicy,
}

impl AdministrationService {
    /// Creates a new administration service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resolver: PermissionResolver,
        roles: Arc<RoleRegistry>,
        overrides: Arc<OverrideStore>,
        subjects: Arc<SubjectRegistry>,
        persistence: Arc<dyn PermissionPersistence>,
        events: EventBus,
        admin_permission: Permission,
        unknown_role: UnknownRolePolicy,
    ) -> Self {
        Self {
            resolver,
            roles,
            overrides,
            subjects,
            persistence,
            events,
            locks: Arc::new(KeyedLocks::new()),
            admin_permission,
            unknown_role,
        }
    }

    /// The permission required to call any administration operation.
    pub fn admin_permission(&self) -> Permission {
        self.admin_permission
    }

    /// Assigns `role` to a subject. Returns the updated subject.
    pub async fn assign_role(
        &self,
        ctx: &RequestContext,
        subject_id: SubjectId,
        role: RoleName,
    ) -> AppResult<Subject> {
        self.authorize(ctx)?;
        self.apply_role(ctx, subject_id, role).await
    }

    /// String-boundary variant of [`assign_role`](Self::assign_role).
    pub async fn assign_role_raw(
        &self,
        ctx: &RequestContext,
        subject_id: SubjectId,
        role: &str,
    ) -> AppResult<Subject> {
        self.authorize(ctx)?;
        let role = RoleName::new(role)?;
        self.apply_role(ctx, subject_id, role).await
    }

    async fn apply_role(
        &self,
        ctx: &RequestContext,
        subject_id: SubjectId,
        role: RoleName,
    ) -> AppResult<Subject> {
        self.forbid_self(ctx, subject_id, "change your own role")?;
        self.check_role_known(&role)?;

        let _guard = self.locks.lock(format!("subject:{subject_id}")).await;
        self.persistence.save_subject(subject_id, &role).await?;
        let old_role = self.subjects.assign_role(subject_id, role.clone());

        info!(
            actor_id = ?ctx.actor_id(),
            subject_id = %subject_id,
            old_role = ?old_role.as_ref().map(RoleName::as_str),
            new_role = %role,
            "Subject role assigned"
        );
        self.publish(
            ctx,
            PermissionEvent::RoleAssigned {
                subject_id,
                old_role: old_role.map(String::from),
                new_role: role.to_string(),
            },
        );

        Ok(Subject::new(subject_id, role))
    }

    /// Replaces a role's default permission set. Returns the previous set
    /// (empty for a newly created role).
    ///
    /// Every subject of the role without an override is affected
    /// immediately.
    pub async fn edit_role_defaults(
        &self,
        ctx: &RequestContext,
        role: RoleName,
        permissions: PermissionSet,
    ) -> AppResult<PermissionSet> {
        self.authorize(ctx)?;
        self.apply_role_defaults(ctx, role, permissions).await
    }

    /// String-boundary variant of [`edit_role_defaults`](Self::edit_role_defaults).
    ///
    /// The whole list is validated against the catalog before anything is
    /// written.
    pub async fn edit_role_defaults_raw<S: AsRef<str>>(
        &self,
        ctx: &RequestContext,
        role: &str,
        identifiers: &[S],
    ) -> AppResult<PermissionSet> {
        self.authorize(ctx)?;
        let role = RoleName::new(role)?;
        let permissions = catalog::parse_set(identifiers).inspect_err(|e| {
            warn!(role = %role, error = %e, "Rejected role defaults");
        })?;
        self.apply_role_defaults(ctx, role, permissions).await
    }

    async fn apply_role_defaults(
        &self,
        ctx: &RequestContext,
        role: RoleName,
        permissions: PermissionSet,
    ) -> AppResult<PermissionSet> {
        self.check_role_known(&role)?;

        let _guard = self.locks.lock(format!("role:{role}")).await;
        self.persistence.save_role(&role, &permissions).await?;
        let previous = self
            .roles
            .set_defaults(role.clone(), permissions.clone())
            .unwrap_or_default();

        info!(
            actor_id = ?ctx.actor_id(),
            role = %role,
            previous = %previous,
            current = %permissions,
            "Role defaults changed"
        );
        self.publish(
            ctx,
            PermissionEvent::RoleDefaultsChanged {
                role: role.to_string(),
                previous: previous.identifiers(),
                current: permissions.identifiers(),
            },
        );

        Ok(previous)
    }

    /// Installs a custom permission set for a subject, replacing its role
    /// defaults entirely. Returns the previous override, if any.
    ///
    /// The subject must already have a role.
    pub async fn customize_subject(
        &self,
        ctx: &RequestContext,
        subject_id: SubjectId,
        permissions: PermissionSet,
    ) -> AppResult<Option<PermissionSet>> {
        self.authorize(ctx)?;
        self.apply_override(ctx, subject_id, permissions).await
    }

    /// String-boundary variant of [`customize_subject`](Self::customize_subject).
    pub async fn customize_subject_raw<S: AsRef<str>>(
        &self,
        ctx: &RequestContext,
        subject_id: SubjectId,
        identifiers: &[S],
    ) -> AppResult<Option<PermissionSet>> {
        self.authorize(ctx)?;
        let permissions = catalog::parse_set(identifiers).inspect_err(|e| {
            warn!(subject_id = %subject_id, error = %e, "Rejected subject customization");
        })?;
        self.apply_override(ctx, subject_id, permissions).await
    }

    async fn apply_override(
        &self,
        ctx: &RequestContext,
        subject_id: SubjectId,
        permissions: PermissionSet,
    ) -> AppResult<Option<PermissionSet>> {
        self.forbid_self(ctx, subject_id, "customize your own permissions")?;
        require_subject(&self.subjects, subject_id)?;

        let _guard = self.locks.lock(format!("subject:{subject_id}")).await;
        self.persistence
            .save_override(subject_id, &permissions)
            .await?;
        let previous = self.overrides.set_override(subject_id, permissions.clone());

        info!(
            actor_id = ?ctx.actor_id(),
            subject_id = %subject_id,
            permissions = %permissions,
            "Subject customized"
        );
        self.publish(
            ctx,
            PermissionEvent::SubjectCustomized {
                subject_id,
                permissions: permissions.identifiers(),
            },
        );

        Ok(previous)
    }

    /// Removes a subject's override so it follows its role defaults again.
    ///
    /// Returns whether an override was removed. Resetting a subject that
    /// has none is a successful no-op. Fails with `NotFound` if the subject
    /// has no role.
    pub async fn reset_subject(&self, ctx: &RequestContext, subject_id: SubjectId) -> AppResult<bool> {
        self.authorize(ctx)?;
        self.forbid_self(ctx, subject_id, "reset your own permissions")?;
        require_subject(&self.subjects, subject_id)?;

        let _guard = self.locks.lock(format!("subject:{subject_id}")).await;
        let had_override = self.overrides.has_override(subject_id);
        if had_override {
            self.persistence.delete_override(subject_id).await?;
            self.overrides.clear_override(subject_id);
        }

        info!(
            actor_id = ?ctx.actor_id(),
            subject_id = %subject_id,
            had_override,
            "Subject reset to role defaults"
        );
        self.publish(
            ctx,
            PermissionEvent::SubjectReset {
                subject_id,
                had_override,
            },
        );

        Ok(had_override)
    }

    /// Returns the subject's role, override, and effective permissions.
    ///
    /// Fails with `NotFound` if the subject has no role.
    pub fn describe_subject(
        &self,
        ctx: &RequestContext,
        subject_id: SubjectId,
    ) -> AppResult<SubjectPermissionView> {
        self.authorize(ctx)?;

        SubjectPermissionView::build(&self.resolver, &self.subjects, &self.overrides, subject_id)
    }

    /// Role names in registration order.
    pub fn list_roles(&self, ctx: &RequestContext) -> AppResult<Vec<RoleName>> {
        self.authorize(ctx)?;
        Ok(self.roles.list_roles())
    }

    /// Checks the caller against the administration permission.
    ///
    /// An actor known to the subject registry is checked with its current
    /// role there, not the role captured in the context.
    fn authorize(&self, ctx: &RequestContext) -> AppResult<()> {
        let actor = ctx
            .actor
            .as_ref()
            .map(|actor| self.subjects.get(actor.id).unwrap_or_else(|| actor.clone()));
        self.resolver
            .require_permission(actor.as_ref(), self.admin_permission)
            .inspect_err(|_| {
                warn!(
                    actor_id = ?ctx.actor_id(),
                    required = %self.admin_permission,
                    "Administration request denied"
                );
            })
    }

    fn forbid_self(&self, ctx: &RequestContext, subject_id: SubjectId, action: &str) -> AppResult<()> {
        if ctx.is_self(subject_id) {
            return Err(AppError::authorization(format!("Cannot {action}")));
        }
        Ok(())
    }

    fn check_role_known(&self, role: &RoleName) -> AppResult<()> {
        if self.unknown_role == UnknownRolePolicy::Reject && !self.roles.contains(role.as_str()) {
            return Err(AppError::not_found(format!(
                "Role '{role}' is not registered"
            )));
        }
        Ok(())
    }

    fn publish(&self, ctx: &RequestContext, payload: PermissionEvent) {
        self.events
            .publish(DomainEvent::new(ctx.actor_id(), payload));
    }
}

fn require_subject(subjects: &SubjectRegistry, subject_id: SubjectId) -> AppResult<Subject> {
    subjects
        .get(subject_id)
        .ok_or_else(|| AppError::not_found(format!("Subject '{subject_id}' has no role")))
}
