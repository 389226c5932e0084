//! Subject role assignments.

pub mod registry;

pub use registry::SubjectRegistry;
