//! Role-based access control: role defaults and resolution.

pub mod registry;
pub mod resolver;

pub use registry::RoleRegistry;
pub use resolver::{EffectivePermissions, PermissionResolver, PermissionSource};
