//! # rolegate-entity
//!
//! Domain models for Rolegate. The permission catalog is a closed enum,
//! so an unknown identifier can only appear at the string boundary
//! (configuration, persisted state, CLI arguments) and is rejected there.

pub mod permission;
pub mod role;
pub mod snapshot;
pub mod subject;

pub use permission::{Permission, PermissionSet, catalog};
pub use role::RoleName;
pub use snapshot::{PermissionSnapshot, RoleRecord};
pub use subject::Subject;
