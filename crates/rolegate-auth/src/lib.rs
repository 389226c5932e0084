//! # rolegate-auth
//!
//! Permission resolution for Rolegate.
//!
//! ## Modules
//!
//! - `rbac`: role default registry and the effective-permission resolver
//! - `overrides`: per-subject custom permission sets
//! - `subject`: in-memory subject directory

pub mod overrides;
pub mod rbac;
pub mod subject;

pub use overrides::OverrideStore;
pub use rbac::{EffectivePermissions, PermissionResolver, PermissionSource, RoleRegistry};
pub use subject::SubjectRegistry;
