//! Persistence configuration.

use serde::{Deserialize, Serialize};

/// Which persistence collaborator backs the permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceProvider {
    /// Process-local state, lost on exit.
    Memory,
    /// A JSON document on the local filesystem.
    #[default]
    Json,
}

impl std::fmt::Display for PersistenceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Provider selection.
    #[serde(default)]
    pub provider: PersistenceProvider,
    /// Path of the JSON state file (used by the `json` provider).
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            provider: PersistenceProvider::default(),
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "data/permissions.json".to_string()
}
