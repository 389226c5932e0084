//! Serializable snapshot of all permission state.
//!
//! This is the document a persistence collaborator stores. An override
//! entry holding `[]` is kept as "explicitly no permissions"; a subject
//! without an entry uses its role defaults.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use rolegate_core::config::access::RoleSeedConfig;
use rolegate_core::types::SubjectId;
use rolegate_core::{AppError, AppResult};

use crate::permission::{PermissionSet, catalog};
use crate::role::RoleName;

/// A role and its default permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Role name.
    pub name: RoleName,
    /// Default permission set.
    pub permissions: PermissionSet,
}

/// Full persisted state: role defaults, overrides, and subject roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    /// Roles in display order.
    #[serde(default)]
    pub roles: Vec<RoleRecord>,
    /// Per-subject custom permission sets.
    #[serde(default)]
    pub overrides: BTreeMap<SubjectId, PermissionSet>,
    /// Subject role assignments.
    #[serde(default)]
    pub subjects: BTreeMap<SubjectId, RoleName>,
}

impl PermissionSnapshot {
    /// Build a snapshot holding only role defaults from configuration seeds.
    ///
    /// Fails on the first invalid role name or permission identifier.
    pub fn from_seeds(seeds: &[RoleSeedConfig]) -> AppResult<Self> {
        let roles = seeds
            .iter()
            .map(|seed| {
                Ok(RoleRecord {
                    name: RoleName::new(seed.name.clone())?,
                    permissions: catalog::parse_set(&seed.permissions)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let snapshot = Self {
            roles,
            ..Self::default()
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check structural invariants that serde alone cannot express.
    pub fn validate(&self) -> AppResult<()> {
        let mut seen = HashSet::new();
        for record in &self.roles {
            if !seen.insert(record.name.as_str()) {
                return Err(AppError::validation(format!(
                    "Role '{}' is defined more than once",
                    record.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a role record by name.
    pub fn role(&self, name: &str) -> Option<&RoleRecord> {
        self.roles.iter().find(|r| r.name.as_str() == name)
    }

    /// Replace a role's defaults in place, or append a new role.
    pub fn upsert_role(&mut self, name: RoleName, permissions: PermissionSet) {
        match self.roles.iter_mut().find(|r| r.name == name) {
            Some(record) => record.permissions = permissions,
            None => self.roles.push(RoleRecord { name, permissions }),
        }
    }

    /// Returns `true` if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.overrides.is_empty() && self.subjects.is_empty()
    }
}
