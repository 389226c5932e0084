//! # rolegate-persistence
//!
//! Persistence collaborators for Rolegate. The engine commits every
//! mutation here before applying it in memory.
//!
//! - **memory**: process-local snapshot, for tests and ephemeral hosts
//! - **json**: a JSON document on disk, replaced atomically on each write
//!
//! The provider is selected at runtime based on configuration.

pub mod json;
pub mod memory;
pub mod provider;

pub use json::JsonFilePersistence;
pub use memory::MemoryPersistence;
pub use provider::{PermissionPersistence, create_persistence};
