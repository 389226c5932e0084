//! Subject model.

use serde::{Deserialize, Serialize};

use rolegate_core::types::SubjectId;

use crate::role::RoleName;

/// The principal whose access is evaluated: an employee id plus exactly
/// one role.
///
/// Subjects are owned by the host application; this engine only reads
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// The subject's identifier.
    pub id: SubjectId,
    /// The subject's role.
    pub role: RoleName,
}

impl Subject {
    /// Creates a subject value.
    pub fn new(id: SubjectId, role: RoleName) -> Self {
        Self { id, role }
    }
}
