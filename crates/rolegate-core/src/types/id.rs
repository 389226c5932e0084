//! Typed UUID identifiers.
//!
//! [`Id`] is tagged with a kind marker so a subject id and an event id are
//! distinct types even though both are UUIDs on the wire.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::AppError;

/// Marks what an [`Id`] identifies.
pub trait IdKind: fmt::Debug + Clone + Copy + Eq + Ord + Hash + Send + Sync + 'static {
    /// Used in parse errors, e.g. "subject".
    const LABEL: &'static str;
}

/// Marker for subject identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubjectKind {}

impl IdKind for SubjectKind {
    const LABEL: &'static str = "subject";
}

/// Marker for event identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {}

impl IdKind for EventKind {
    const LABEL: &'static str = "event";
}

/// A UUID tagged with the kind of thing it identifies.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id<K: IdKind> {
    uuid: Uuid,
    kind: PhantomData<K>,
}

/// Identifier of a subject (employee) whose access is evaluated.
pub type SubjectId = Id<SubjectKind>;

/// Identifier of an emitted domain event.
pub type EventId = Id<EventKind>;

impl<K: IdKind> Id<K> {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            kind: PhantomData,
        }
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }
}

impl<K: IdKind> Default for Id<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IdKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", K::LABEL, self.uuid)
    }
}

impl<K: IdKind> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.uuid, f)
    }
}

impl<K: IdKind> FromStr for Id<K> {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self::from_uuid)
            .map_err(|e| AppError::validation(format!("Invalid {} id '{s}': {e}", K::LABEL)))
    }
}

impl<K: IdKind> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.uuid.serialize(serializer)
    }
}

impl<'de, K: IdKind> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}
