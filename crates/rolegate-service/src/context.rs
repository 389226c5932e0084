//! Request context carrying the acting subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolegate_core::types::SubjectId;
use rolegate_entity::subject::Subject;

/// Context for an administration request.
///
/// The host resolves who is acting and passes it in; `actor` is `None`
/// when no subject could be established, which is always denied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting subject, if any.
    pub actor: Option<Subject>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for an identified actor.
    pub fn new(actor: Subject) -> Self {
        Self {
            actor: Some(actor),
            request_time: Utc::now(),
        }
    }

    /// Creates a context with no acting subject.
    pub fn anonymous() -> Self {
        Self {
            actor: None,
            request_time: Utc::now(),
        }
    }

    /// The acting subject's id, if any.
    pub fn actor_id(&self) -> Option<SubjectId> {
        self.actor.as_ref().map(|a| a.id)
    }

    /// Returns `true` if the actor is `subject_id`.
    pub fn is_self(&self, subject_id: SubjectId) -> bool {
        self.actor_id() == Some(subject_id)
    }
}
