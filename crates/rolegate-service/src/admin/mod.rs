//! Administration API: role defaults, role assignment, and overrides.

pub mod locks;
pub mod service;

pub use service::{AdministrationService, SubjectPermissionView};
