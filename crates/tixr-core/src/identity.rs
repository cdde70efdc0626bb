//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the registry's identifier namespaces. These prevent
//! accidental identifier confusion — you cannot pass a `Principal` where an
//! `EventId` is expected, and a raw `u64` never crosses a public API.
//!
//! ## Invariant
//!
//! `EventId(0)` is reserved as "no event" and is never allocated. Valid
//! event identifiers start at 1 and come from the registry's monotonic
//! counter.

use serde::{Deserialize, Serialize};

/// Identifier of a registered event.
///
/// Allocated sequentially by the event registry, starting at 1. The zero
/// value is reserved as [`EventId::NONE`] and never refers to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl EventId {
    /// The reserved "no event" sentinel.
    pub const NONE: EventId = EventId(0);

    /// The first identifier the registry ever allocates.
    pub const FIRST: EventId = EventId(1);

    /// Access the inner counter value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether this id could ever refer to an event (non-zero).
    pub fn is_some(&self) -> bool {
        self.0 != 0
    }

    /// The identifier the counter allocates after this one.
    pub fn next(&self) -> EventId {
        EventId(self.0 + 1)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event:{}", self.0)
    }
}

/// Stable identifier of an authenticated caller.
///
/// The registry does not verify identity — callers arrive already
/// authenticated by the surrounding transport, represented by an opaque
/// stable string (an account address, a user id, a service name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Principal(pub String);

impl Principal {
    /// Wrap an opaque principal identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the inner identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "principal:{}", self.0)
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Coarse roles grantable to a principal.
///
/// Roles are granted by the registry itself (never by callers) and are
/// never revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Granted on a principal's first successful event creation.
    /// Required (together with manager identity) to mint tickets.
    EventCreator,
}

impl Role {
    /// Canonical string form of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventCreator => "EVENT_CREATOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
