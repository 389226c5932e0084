//! Access-control configuration.

use serde::{Deserialize, Serialize};

/// How administration paths treat a role name that is not registered.
///
/// Read paths always treat an unknown role as having no permissions; this
/// setting only changes whether mutators reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownRolePolicy {
    /// Unknown roles resolve to the empty permission set.
    #[default]
    Empty,
    /// Unknown roles are a `NotFound` error on administration paths.
    Reject,
}

/// Seed definition for a role, applied when persistence holds no state yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSeedConfig {
    /// Role name (case-sensitive).
    pub name: String,
    /// Permission identifiers granted by default.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Access-control settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Permission a caller must hold to use the administration API.
    #[serde(default = "default_admin_permission")]
    pub admin_permission: String,
    /// Policy for unknown role names on administration paths.
    #[serde(default)]
    pub unknown_role: UnknownRolePolicy,
    /// Role defaults used to seed an empty store, in display order.
    #[serde(default)]
    pub roles: Vec<RoleSeedConfig>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            admin_permission: default_admin_permission(),
            unknown_role: UnknownRolePolicy::default(),
            roles: Vec::new(),
        }
    }
}

fn default_admin_permission() -> String {
    "MANAGE_SETTINGS".to_string()
}
