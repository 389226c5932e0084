//! In-memory subject directory.

use std::collections::{BTreeMap, HashSet};

use dashmap::DashMap;

use rolegate_core::traits::SubjectDirectory;
use rolegate_core::types::SubjectId;
use rolegate_entity::role::RoleName;
use rolegate_entity::subject::Subject;

/// Subject id → role assignment.
///
/// Hosts with their own identity store implement [`SubjectDirectory`]
/// directly; this registry backs role assignment through the
/// administration API and the CLI.
#[derive(Debug, Default)]
pub struct SubjectRegistry {
    subjects: DashMap<SubjectId, RoleName>,
}

impl SubjectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the subject with its current role, if known.
    pub fn get(&self, subject_id: SubjectId) -> Option<Subject> {
        self.subjects
            .get(&subject_id)
            .map(|role| Subject::new(subject_id, role.value().clone()))
    }

    /// Assigns `role` to the subject. Returns the previous role, if any.
    pub fn assign_role(&self, subject_id: SubjectId, role: RoleName) -> Option<RoleName> {
        self.subjects.insert(subject_id, role)
    }

    /// All known subjects, ordered by id.
    pub fn list(&self) -> Vec<Subject> {
        let mut subjects: Vec<_> = self
            .subjects
            .iter()
            .map(|entry| Subject::new(*entry.key(), entry.value().clone()))
            .collect();
        subjects.sort_by_key(|s| s.id);
        subjects
    }

    /// All assignments, ordered by subject id.
    pub fn snapshot(&self) -> BTreeMap<SubjectId, RoleName> {
        self.subjects
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Replaces every assignment with `subjects` (reload).
    pub fn replace_all(&self, subjects: BTreeMap<SubjectId, RoleName>) {
        let keep: HashSet<SubjectId> = subjects.keys().copied().collect();
        for (subject_id, role) in subjects {
            self.subjects.insert(subject_id, role);
        }
        self.subjects.retain(|subject_id, _| keep.contains(subject_id));
    }
}

impl SubjectDirectory for SubjectRegistry {
    fn role_of(&self, subject_id: SubjectId) -> Option<String> {
        self.subjects
            .get(&subject_id)
            .map(|role| role.value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_reassign() {
        let registry = SubjectRegistry::new();
        let id = SubjectId::new();

        assert_eq!(registry.assign_role(id, RoleName::new("Staff").unwrap()), None);
        let previous = registry.assign_role(id, RoleName::new("Manager").unwrap());

        assert_eq!(previous.unwrap().as_str(), "Staff");
        assert_eq!(registry.get(id).unwrap().role.as_str(), "Manager");
        assert_eq!(registry.role_of(id).as_deref(), Some("Manager"));
    }

    #[test]
    fn test_unknown_subject() {
        let registry = SubjectRegistry::new();
        let id = SubjectId::new();
        assert!(registry.get(id).is_none());
        assert!(registry.role_of(id).is_none());
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = SubjectRegistry::new();
        for _ in 0..5 {
            registry.assign_role(SubjectId::new(), RoleName::new("Staff").unwrap());
        }
        let ids: Vec<_> = registry.list().into_iter().map(|s| s.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
