//! Subject resolution collaborator.

use crate::types::id::SubjectId;

/// Supplies the role of a subject known to the host application.
///
/// The permission engine only reads from this; subject lifecycle belongs
/// to the host.
pub trait SubjectDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Return the role name of the subject, or `None` if unknown.
    fn role_of(&self, subject_id: SubjectId) -> Option<String>;
}
