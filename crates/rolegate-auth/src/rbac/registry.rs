//! Role-to-default-permission registry.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use rolegate_core::{AppError, AppResult};
use rolegate_entity::permission::{PermissionSet, catalog};
use rolegate_entity::role::RoleName;
use rolegate_entity::snapshot::RoleRecord;

/// A registered role: its position in listing order and its defaults.
#[derive(Debug, Clone)]
struct RoleEntry {
    /// Insertion sequence, used for stable listing.
    seq: u64,
    /// Default permission set.
    permissions: PermissionSet,
}

/// Mapping from role name to its default permission set.
///
/// Flat key→set store: no hierarchy, no inheritance between roles.
/// Replacing a role's set is a single map write, so readers observe
/// either the old or the new set. Writers to different roles do not
/// share a lock unless they hash to the same shard.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    roles: DashMap<RoleName, RoleEntry>,
    next_seq: AtomicU64,
}

impl RoleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from role records, preserving their order.
    pub fn from_records(records: impl IntoIterator<Item = RoleRecord>) -> Self {
        let registry = Self::new();
        for record in records {
            registry.set_defaults(record.name, record.permissions);
        }
        registry
    }

    /// Returns the defaults of `role`, or the empty set if it is unknown.
    pub fn get_defaults(&self, role: &str) -> PermissionSet {
        self.roles
            .get(role)
            .map(|entry| entry.permissions.clone())
            .unwrap_or_default()
    }

    /// Returns the defaults of `role`, failing with `NotFound` if it is unknown.
    pub fn require_defaults(&self, role: &str) -> AppResult<PermissionSet> {
        self.roles
            .get(role)
            .map(|entry| entry.permissions.clone())
            .ok_or_else(|| AppError::not_found(format!("Role '{role}' is not registered")))
    }

    /// Returns `true` if `role` is registered.
    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Replaces the defaults of `role` wholesale, registering it if new.
    ///
    /// An existing role keeps its listing position. Returns the previous
    /// defaults, if any.
    pub fn set_defaults(&self, role: RoleName, permissions: PermissionSet) -> Option<PermissionSet> {
        match self.roles.entry(role) {
            Entry::Occupied(mut occupied) => {
                let previous =
                    std::mem::replace(&mut occupied.get_mut().permissions, permissions);
                debug!(role = %occupied.key(), "Role defaults replaced");
                Some(previous)
            }
            Entry::Vacant(vacant) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                debug!(role = %vacant.key(), "Role registered");
                vacant.insert(RoleEntry { seq, permissions });
                None
            }
        }
    }

    /// Validates `identifiers` against the catalog, then replaces the defaults.
    ///
    /// On any invalid identifier nothing changes.
    pub fn set_defaults_raw<S: AsRef<str>>(
        &self,
        role: RoleName,
        identifiers: &[S],
    ) -> AppResult<Option<PermissionSet>> {
        let permissions = catalog::parse_set(identifiers)?;
        Ok(self.set_defaults(role, permissions))
    }

    /// Role names in registration order.
    pub fn list_roles(&self) -> Vec<RoleName> {
        self.ordered()
            .into_iter()
            .map(|(_, name, _)| name)
            .collect()
    }

    /// All roles and their defaults in registration order.
    pub fn snapshot(&self) -> Vec<RoleRecord> {
        self.ordered()
            .into_iter()
            .map(|(_, name, permissions)| RoleRecord { name, permissions })
            .collect()
    }

    /// Number of registered roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns `true` if no role is registered.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Replaces the whole registry with `records` (reload).
    ///
    /// New and surviving roles are written first and stale roles removed
    /// afterwards, so a role present both before and after a reload never
    /// disappears from view. Listing order follows `records`.
    pub fn replace_all(&self, records: Vec<RoleRecord>) {
        let base = self
            .next_seq
            .fetch_add(records.len() as u64, Ordering::Relaxed);
        let keep: HashSet<RoleName> = records.iter().map(|r| r.name.clone()).collect();

        for (offset, record) in records.into_iter().enumerate() {
            self.roles.insert(
                record.name,
                RoleEntry {
                    seq: base + offset as u64,
                    permissions: record.permissions,
                },
            );
        }
        self.roles.retain(|name, _| keep.contains(name));
    }

    fn ordered(&self) -> Vec<(u64, RoleName, PermissionSet)> {
        let mut entries: Vec<_> = self
            .roles
            .iter()
            .map(|entry| {
                (
                    entry.value().seq,
                    entry.key().clone(),
                    entry.value().permissions.clone(),
                )
            })
            .collect();
        entries.sort_by_key(|(seq, _, _)| *seq);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::error::ErrorKind;
    use rolegate_entity::permission::Permission;

    fn role(name: &str) -> RoleName {
        RoleName::new(name).unwrap()
    }

    #[test]
    fn test_unknown_role_has_no_defaults() {
        let registry = RoleRegistry::new();
        assert!(registry.get_defaults("Ghost").is_empty());

        let err = registry.require_defaults("Ghost").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = RoleRegistry::new();
        registry.set_defaults(role("Manager"), PermissionSet::from([Permission::ViewReports]));

        assert!(registry.get_defaults("Manager").contains(Permission::ViewReports));
        assert!(registry.get_defaults("manager").is_empty());
        assert!(registry.get_defaults("Manag").is_empty());
    }

    #[test]
    fn test_set_defaults_replaces_wholesale() {
        let registry = RoleRegistry::new();
        registry.set_defaults(
            role("Manager"),
            PermissionSet::from([Permission::ViewReports, Permission::ManageEmployees]),
        );
        let previous =
            registry.set_defaults(role("Manager"), PermissionSet::from([Permission::EditContent]));

        assert_eq!(previous.unwrap().len(), 2);
        assert_eq!(
            registry.get_defaults("Manager"),
            PermissionSet::from([Permission::EditContent])
        );
    }

    #[test]
    fn test_set_defaults_raw_is_atomic() {
        let registry = RoleRegistry::new();
        registry.set_defaults(role("Staff"), PermissionSet::from([Permission::ViewReports]));

        let err = registry
            .set_defaults_raw(role("Staff"), &["EDIT_CONTENT", "NOT_A_PERMISSION"])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPermission);
        assert_eq!(
            registry.get_defaults("Staff"),
            PermissionSet::from([Permission::ViewReports])
        );

        let err = registry
            .set_defaults_raw(role("Intern"), &["BOGUS"])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPermission);
        assert!(!registry.contains("Intern"));
    }

    #[test]
    fn test_list_roles_in_insertion_order() {
        let registry = RoleRegistry::new();
        for name in ["Staff", "Manager", "Admin"] {
            registry.set_defaults(role(name), PermissionSet::empty());
        }
        registry.set_defaults(role("Staff"), PermissionSet::all());

        let names: Vec<_> = registry
            .list_roles()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["Staff", "Manager", "Admin"]);
    }

    #[test]
    fn test_replace_all_swaps_contents_and_order() {
        let registry = RoleRegistry::new();
        registry.set_defaults(role("Staff"), PermissionSet::empty());
        registry.set_defaults(role("Temp"), PermissionSet::all());

        registry.replace_all(vec![
            RoleRecord {
                name: role("Manager"),
                permissions: PermissionSet::from([Permission::ViewReports]),
            },
            RoleRecord {
                name: role("Staff"),
                permissions: PermissionSet::from([Permission::EditContent]),
            },
        ]);

        let names: Vec<_> = registry
            .list_roles()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["Manager", "Staff"]);
        assert!(!registry.contains("Temp"));
        assert!(registry.get_defaults("Staff").contains(Permission::EditContent));
    }
}
