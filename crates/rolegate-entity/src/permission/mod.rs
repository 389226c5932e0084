//! Permission catalog and permission sets.

pub mod catalog;
pub mod model;
pub mod set;

pub use model::Permission;
pub use set::PermissionSet;
