//! Collaborator traits defined in `rolegate-core` and implemented by other crates
//! or by the host application.

pub mod directory;

pub use directory::SubjectDirectory;
