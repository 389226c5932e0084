//! Domain events emitted by administration operations.
//!
//! Events are published on an [`EventBus`] and consumed by audit logging
//! or by hosts that need to react to permission changes.

pub mod bus;
pub mod permission;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{EventId, SubjectId};

pub use bus::EventBus;
pub use permission::PermissionEvent;

/// Wrapper for permission events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: EventId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The administrator who caused the event.
    pub actor_id: Option<SubjectId>,
    /// The event payload.
    pub payload: PermissionEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<SubjectId>, payload: PermissionEvent) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}
