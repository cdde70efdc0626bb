//! # Registry Snapshots
//!
//! A serde-serializable capture of the complete registry state: events,
//! creator flags, role grants, metadata URIs, balances, recorded supply,
//! and the id counter. Tables are exported as sorted vectors of records so
//! the JSON form is deterministic and map keys stay strings-free.
//!
//! Import validates integrity before any store is built:
//!
//! - every event id lies in `[1, next_event_id)` and every id in that range
//!   has a record (managers are re-derived from each event's creator);
//! - the creator flags cover every event's creator (the one-event-per-
//!   principal limit must survive import);
//! - recorded supply equals the per-event sum of balances.
//!
//! This is the seam where a real persistence layer would attach; the CLI
//! uses it for its file-based state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tixr_core::{EventId, Principal, RegistryError, Role};

use crate::access::AccessControlRegistry;
use crate::event::{Event, EventRegistry};
use crate::ledger::TokenLedger;
use crate::metadata::MetadataStore;
use crate::registry::TicketRegistry;

/// Roles held by one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrantRecord {
    /// The grantee.
    pub principal: Principal,
    /// The roles it holds.
    pub roles: Vec<Role>,
}

/// The metadata URI of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriRecord {
    /// The event.
    pub event: EventId,
    /// Its URI (non-empty).
    pub uri: String,
}

/// One holder's balance on one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// The event.
    pub event: EventId,
    /// The holder.
    pub holder: Principal,
    /// The balance.
    pub amount: u64,
}

/// The recorded total supply of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyRecord {
    /// The event.
    pub event: EventId,
    /// Its total supply.
    pub total: u64,
}

/// Complete registry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// The id the next registration will allocate.
    pub next_event_id: EventId,
    /// All event records, sorted by id.
    pub events: Vec<Event>,
    /// Principals that have created an event (monotonic; never shrinks).
    pub creators: Vec<Principal>,
    /// Role grants.
    pub roles: Vec<RoleGrantRecord>,
    /// Metadata URIs.
    pub uris: Vec<UriRecord>,
    /// Holder balances.
    pub balances: Vec<BalanceRecord>,
    /// Recorded supply; must equal the per-event sum of `balances`.
    pub supply: Vec<SupplyRecord>,
}

/// Rejection of a snapshot import.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Recorded supply disagrees with the sum of balances.
    #[error("recorded supply for {event} is {recorded}, balances sum to {derived}")]
    SupplyMismatch {
        /// The inconsistent event.
        event: EventId,
        /// The supply the snapshot recorded.
        recorded: u64,
        /// The supply derived from balances.
        derived: u64,
    },

    /// An id inside the allocated range has no event record (so no manager
    /// can be derived for it).
    #[error("{event} is allocated but has no record")]
    MissingManager {
        /// The gap id.
        event: EventId,
    },

    /// An event's creator is absent from the creator-flag set. The flag is
    /// monotonic — a snapshot that drops it would let the principal create
    /// a second event.
    #[error("{principal} created an event but carries no creator flag")]
    MissingCreatorFlag {
        /// The uncovered creator.
        principal: Principal,
    },

    /// A record refers to an id outside the allocated range.
    #[error("{event} is outside the allocated range (next id is {next})")]
    IdOutOfRange {
        /// The out-of-range id.
        event: EventId,
        /// The snapshot's id counter.
        next: EventId,
    },

    /// The balance table itself is invalid (per-event sum overflows).
    #[error("invalid ledger state: {0}")]
    Ledger(#[from] RegistryError),
}

impl TicketRegistry {
    /// Capture the complete registry state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let (events, creators, next_event_id) = self.events().export();
        RegistrySnapshot {
            next_event_id,
            events,
            creators,
            roles: self.access().export(),
            uris: self.metadata().export(),
            balances: self.ledger().export(),
            supply: self.ledger().export_supply(),
        }
    }

    /// Rebuild a registry from a snapshot, validating integrity first.
    ///
    /// # Errors
    ///
    /// See [`SnapshotError`]; a rejected snapshot builds nothing.
    pub fn from_snapshot(snapshot: &RegistrySnapshot) -> Result<Self, SnapshotError> {
        let next = snapshot.next_event_id;

        let in_range = |id: EventId| id.is_some() && id < next;

        // Every record must lie in the allocated range, and the range must
        // have no gaps.
        for event in &snapshot.events {
            if !in_range(event.id) {
                return Err(SnapshotError::IdOutOfRange {
                    event: event.id,
                    next,
                });
            }
        }
        let mut id = EventId::FIRST;
        while id < next {
            if !snapshot.events.iter().any(|e| e.id == id) {
                return Err(SnapshotError::MissingManager { event: id });
            }
            id = id.next();
        }
        // The creator flags must cover every event's creator, or the
        // at-most-one-event-per-principal limit would reset on import.
        for event in &snapshot.events {
            if !snapshot.creators.contains(&event.creator) {
                return Err(SnapshotError::MissingCreatorFlag {
                    principal: event.creator.clone(),
                });
            }
        }
        for record in &snapshot.uris {
            if !in_range(record.event) {
                return Err(SnapshotError::IdOutOfRange {
                    event: record.event,
                    next,
                });
            }
        }
        for record in &snapshot.balances {
            if !in_range(record.event) {
                return Err(SnapshotError::IdOutOfRange {
                    event: record.event,
                    next,
                });
            }
        }

        // Rebuild the ledger (re-deriving supply), then check it against
        // the recorded supply table.
        let ledger = TokenLedger::restore(&snapshot.balances)?;
        for record in &snapshot.supply {
            let derived = ledger.total_supply(record.event);
            if derived != record.total {
                return Err(SnapshotError::SupplyMismatch {
                    event: record.event,
                    recorded: record.total,
                    derived,
                });
            }
        }
        for record in &ledger.export_supply() {
            let recorded = snapshot
                .supply
                .iter()
                .find(|s| s.event == record.event)
                .map_or(0, |s| s.total);
            if recorded != record.total {
                return Err(SnapshotError::SupplyMismatch {
                    event: record.event,
                    recorded,
                    derived: record.total,
                });
            }
        }

        Ok(TicketRegistry::from_parts(
            AccessControlRegistry::restore(&snapshot.roles),
            EventRegistry::restore(&snapshot.events, &snapshot.creators, next),
            MetadataStore::restore(&snapshot.uris),
            ledger,
        ))
    }
}
