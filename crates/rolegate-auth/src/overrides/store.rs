//! Per-subject override storage.

use std::collections::{BTreeMap, HashSet};

use dashmap::DashMap;
use tracing::debug;

use rolegate_core::AppResult;
use rolegate_core::types::SubjectId;
use rolegate_entity::permission::{PermissionSet, catalog};

/// Subject id → custom permission set.
///
/// Presence of an entry replaces the subject's role defaults entirely;
/// the stored set is never merged with them. `Some(empty)` means the
/// subject holds no permissions.
#[derive(Debug, Default)]
pub struct OverrideStore {
    overrides: DashMap<SubjectId, PermissionSet>,
}

impl OverrideStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the subject's override, or `None` to use role defaults.
    pub fn get_override(&self, subject_id: SubjectId) -> Option<PermissionSet> {
        self.overrides
            .get(&subject_id)
            .map(|entry| entry.value().clone())
    }

    /// Returns `true` if the subject has an override installed.
    pub fn has_override(&self, subject_id: SubjectId) -> bool {
        self.overrides.contains_key(&subject_id)
    }

    /// Installs or replaces the subject's override. Returns the previous one.
    pub fn set_override(
        &self,
        subject_id: SubjectId,
        permissions: PermissionSet,
    ) -> Option<PermissionSet> {
        debug!(subject_id = %subject_id, count = permissions.len(), "Override installed");
        self.overrides.insert(subject_id, permissions)
    }

    /// Validates `identifiers` against the catalog, then installs the override.
    ///
    /// On any invalid identifier nothing changes.
    pub fn set_override_raw<S: AsRef<str>>(
        &self,
        subject_id: SubjectId,
        identifiers: &[S],
    ) -> AppResult<Option<PermissionSet>> {
        let permissions = catalog::parse_set(identifiers)?;
        Ok(self.set_override(subject_id, permissions))
    }

    /// Removes the subject's override. Returns whether one existed.
    ///
    /// Clearing a subject without an override is a no-op.
    pub fn clear_override(&self, subject_id: SubjectId) -> bool {
        let removed = self.overrides.remove(&subject_id).is_some();
        if removed {
            debug!(subject_id = %subject_id, "Override cleared");
        }
        removed
    }

    /// All overrides, ordered by subject id.
    pub fn snapshot(&self) -> BTreeMap<SubjectId, PermissionSet> {
        self.overrides
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Number of subjects with an override.
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Returns `true` if no subject has an override.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Replaces every override with `overrides` (reload).
    pub fn replace_all(&self, overrides: BTreeMap<SubjectId, PermissionSet>) {
        let keep: HashSet<SubjectId> = overrides.keys().copied().collect();
        for (subject_id, permissions) in overrides {
            self.overrides.insert(subject_id, permissions);
        }
        self.overrides.retain(|subject_id, _| keep.contains(subject_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::error::ErrorKind;
    use rolegate_entity::permission::Permission;

    #[test]
    fn test_absent_vs_empty_override() {
        let store = OverrideStore::new();
        let subject = SubjectId::new();
        assert_eq!(store.get_override(subject), None);

        store.set_override(subject, PermissionSet::empty());
        assert_eq!(store.get_override(subject), Some(PermissionSet::empty()));
        assert!(store.has_override(subject));
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let store = OverrideStore::new();
        let subject = SubjectId::new();
        let set = PermissionSet::from([Permission::SendNotifications, Permission::ViewReports]);

        store.set_override(subject, set.clone());
        assert_eq!(store.get_override(subject), Some(set));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = OverrideStore::new();
        let subject = SubjectId::new();
        store.set_override(subject, PermissionSet::all());

        assert!(store.clear_override(subject));
        assert!(!store.clear_override(subject));
        assert_eq!(store.get_override(subject), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_raw_rejects_unknown_and_keeps_prior_state() {
        let store = OverrideStore::new();
        let subject = SubjectId::new();
        store.set_override(subject, PermissionSet::from([Permission::ViewReports]));

        let err = store
            .set_override_raw(subject, &["MANAGE_SETTINGS", "ROOT"])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPermission);
        assert_eq!(
            store.get_override(subject),
            Some(PermissionSet::from([Permission::ViewReports]))
        );
    }

    #[test]
    fn test_replace_all() {
        let store = OverrideStore::new();
        let stale = SubjectId::new();
        let fresh = SubjectId::new();
        store.set_override(stale, PermissionSet::all());

        let mut next = BTreeMap::new();
        next.insert(fresh, PermissionSet::empty());
        store.replace_all(next);

        assert!(!store.has_override(stale));
        assert_eq!(store.get_override(fresh), Some(PermissionSet::empty()));
    }
}
