//! The closed set of recognized permissions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use rolegate_core::AppError;

/// A capability that can be granted to a subject.
///
/// Ordering follows declaration order; effective permission sets are
/// listed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    // -- Reporting --
    /// View dashboards and reports.
    ViewReports,

    // -- People --
    /// Create, edit, and deactivate employee records.
    ManageEmployees,

    // -- Content --
    /// Publish news and pages to all employees.
    PublishContent,
    /// Edit existing content.
    EditContent,
    /// Delete content.
    DeleteContent,
    /// Upload and organize shared documents.
    ManageDocuments,

    // -- Surveys --
    /// Author and launch surveys.
    CreateSurveys,
    /// Read survey responses and results.
    ViewSurveyResults,

    // -- Notifications --
    /// Send notifications to employees.
    SendNotifications,

    // -- Administration --
    /// Change application settings, role defaults, and subject overrides.
    ManageSettings,
}

impl Permission {
    /// Every permission in the catalog, in declaration order.
    pub const ALL: [Permission; 10] = [
        Self::ViewReports,
        Self::ManageEmployees,
        Self::PublishContent,
        Self::EditContent,
        Self::DeleteContent,
        Self::ManageDocuments,
        Self::CreateSurveys,
        Self::ViewSurveyResults,
        Self::SendNotifications,
        Self::ManageSettings,
    ];

    /// Return the stable wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewReports => "VIEW_REPORTS",
            Self::ManageEmployees => "MANAGE_EMPLOYEES",
            Self::PublishContent => "PUBLISH_CONTENT",
            Self::EditContent => "EDIT_CONTENT",
            Self::DeleteContent => "DELETE_CONTENT",
            Self::ManageDocuments => "MANAGE_DOCUMENTS",
            Self::CreateSurveys => "CREATE_SURVEYS",
            Self::ViewSurveyResults => "VIEW_SURVEY_RESULTS",
            Self::SendNotifications => "SEND_NOTIFICATIONS",
            Self::ManageSettings => "MANAGE_SETTINGS",
        }
    }

    /// Return the human-readable label shown in administration screens.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ViewReports => "View reports",
            Self::ManageEmployees => "Manage employees",
            Self::PublishContent => "Publish content",
            Self::EditContent => "Edit content",
            Self::DeleteContent => "Delete content",
            Self::ManageDocuments => "Manage documents",
            Self::CreateSurveys => "Create surveys",
            Self::ViewSurveyResults => "View survey results",
            Self::SendNotifications => "Send notifications",
            Self::ManageSettings => "Manage settings",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AppError;

    /// Exact, case-sensitive match against the catalog.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AppError::invalid_permission(s))
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: AppError| serde::de::Error::custom(e.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::error::ErrorKind;

    #[test]
    fn test_from_str_is_exact() {
        assert_eq!(
            "MANAGE_EMPLOYEES".parse::<Permission>().unwrap(),
            Permission::ManageEmployees
        );
        let err = "manage_employees".parse::<Permission>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPermission);
        assert!(" VIEW_REPORTS".parse::<Permission>().is_err());
    }

    #[test]
    fn test_identifiers_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for p in Permission::ALL {
            assert!(seen.insert(p.as_str()), "duplicate identifier {p}");
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
    }

    #[test]
    fn test_serde_uses_wire_identifier() {
        let json = serde_json::to_string(&Permission::ViewSurveyResults).unwrap();
        assert_eq!(json, "\"VIEW_SURVEY_RESULTS\"");

        let err = serde_json::from_str::<Permission>("\"LAUNCH_ROCKETS\"").unwrap_err();
        assert!(err.to_string().contains("LAUNCH_ROCKETS"));
    }
}
