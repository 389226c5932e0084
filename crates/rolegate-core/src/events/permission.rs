//! Permission-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::SubjectId;

/// Events related to role defaults and subject overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PermissionEvent {
    /// A role's default permission set was replaced.
    RoleDefaultsChanged {
        /// The role name.
        role: String,
        /// Permissions granted before the change.
        previous: Vec<String>,
        /// Permissions granted after the change.
        current: Vec<String>,
    },
    /// A subject received a custom permission set.
    SubjectCustomized {
        /// The subject ID.
        subject_id: SubjectId,
        /// The installed set; empty means no permissions at all.
        permissions: Vec<String>,
    },
    /// A subject's custom set was removed.
    SubjectReset {
        /// The subject ID.
        subject_id: SubjectId,
        /// Whether an override existed before the reset.
        had_override: bool,
    },
    /// A subject was assigned a role.
    RoleAssigned {
        /// The subject ID.
        subject_id: SubjectId,
        /// The previous role, if the subject was known.
        old_role: Option<String>,
        /// The new role.
        new_role: String,
    },
}

impl PermissionEvent {
    /// Short machine-readable name of the event type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoleDefaultsChanged { .. } => "role_defaults_changed",
            Self::SubjectCustomized { .. } => "subject_customized",
            Self::SubjectReset { .. } => "subject_reset",
            Self::RoleAssigned { .. } => "role_assigned",
        }
    }
}
