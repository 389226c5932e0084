//! Subject-scoped permission overrides.

pub mod store;

pub use store::OverrideStore;
