//! # rolegate-service
//!
//! Administration API and engine wiring for Rolegate.
//!
//! Services follow constructor injection: registries, stores, and the
//! persistence collaborator are provided at construction time via `Arc`
//! references. [`PermissionEngine`] owns the load/reload lifecycle and
//! hands out the resolver and the administration service.

pub mod admin;
pub mod context;
pub mod engine;

pub use admin::{AdministrationService, SubjectPermissionView};
pub use context::RequestContext;
pub use engine::PermissionEngine;
