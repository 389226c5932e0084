//! Catalog queries over the closed [`Permission`] enum.
//!
//! These are the only functions that accept permission identifiers as
//! strings. Everything past this boundary works with typed values.

use rolegate_core::AppResult;

use super::model::Permission;
use super::set::PermissionSet;

/// Returns `true` if `identifier` names a permission in the catalog.
pub fn is_valid(identifier: &str) -> bool {
    identifier.parse::<Permission>().is_ok()
}

/// Enumerate every permission in catalog order.
///
/// The iterator is lazy and can be cloned to restart the enumeration.
pub fn all_permissions() -> impl Iterator<Item = Permission> + Clone {
    Permission::ALL.into_iter()
}

/// Parse a list of identifiers into a [`PermissionSet`].
///
/// Every entry is validated before the set is returned; the first unknown
/// identifier fails the whole call. Duplicates collapse.
pub fn parse_set<I, S>(identifiers: I) -> AppResult<PermissionSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    identifiers
        .into_iter()
        .map(|id| id.as_ref().parse::<Permission>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::error::ErrorKind;

    #[test]
    fn test_is_valid() {
        assert!(is_valid("VIEW_REPORTS"));
        assert!(!is_valid("VIEW_REPORT"));
        assert!(!is_valid(""));
    }

    #[test]
    fn test_all_permissions_is_restartable() {
        let iter = all_permissions();
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), Permission::ALL.len());
        assert!(first.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_parse_set_collapses_duplicates() {
        let set = parse_set(["VIEW_REPORTS", "MANAGE_EMPLOYEES", "VIEW_REPORTS"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Permission::ViewReports));
    }

    #[test]
    fn test_parse_set_rejects_any_unknown_entry() {
        let err = parse_set(["VIEW_REPORTS", "DROP_TABLES"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPermission);
        assert!(err.message.contains("DROP_TABLES"));
    }

    #[test]
    fn test_parse_empty_list_is_empty_set() {
        let set = parse_set(Vec::<String>::new()).unwrap();
        assert!(set.is_empty());
    }
}
