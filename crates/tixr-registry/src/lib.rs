//! # tixr-registry — Authorization and State-Consistency Core
//!
//! Implements the ticket registry as four independently owned stores plus a
//! façade that sequences them:
//!
//! - **AccessControlRegistry** (`access.rs`): coarse role grants per
//!   principal. Depends on nothing.
//!
//! - **EventRegistry** (`event.rs`): event records, manager assignment, and
//!   the one-event-per-creator limit, behind a single monotonic id counter.
//!
//! - **MetadataStore** (`metadata.rs`): the metadata URI per event,
//!   non-empty once set.
//!
//! - **TokenLedger** (`ledger.rs`): per-(event, holder) balances and
//!   per-event total supply, kept symmetric at all times.
//!
//! - **TicketRegistry** (`registry.rs`): the public operation surface. Every
//!   mutating operation performs its authorization check as the first
//!   statement, then mutates exactly one owning store. Event-scoped
//!   mutations serialize on a per-event lock; event creation serializes on
//!   a global lock because the creator-limit check spans all principals.
//!
//! ## Design
//!
//! There is no inheritance-style mixing of concerns: each store owns its
//! tables outright, and cross-store questions ("who manages event 3?",
//! "does alice hold the creator role?") travel through narrow methods
//! (`EventRegistry::manager_of`, `AccessControlRegistry::has_role`). Records
//! are never deleted — an event is either *nonexistent* or *active*, with no
//! deactivation transition.
//!
//! A serde snapshot of the full state (`snapshot.rs`) backs export/import;
//! imports re-derive the supply table from balances and reject snapshots
//! that disagree.

pub mod access;
pub mod event;
pub mod ledger;
pub mod metadata;
pub mod registry;
pub mod snapshot;

mod lock;

pub use access::AccessControlRegistry;
pub use event::{Event, EventRegistry};
pub use ledger::TokenLedger;
pub use metadata::MetadataStore;
pub use registry::TicketRegistry;
pub use snapshot::{
    BalanceRecord, RegistrySnapshot, RoleGrantRecord, SnapshotError, SupplyRecord, UriRecord,
};

// Re-export the foundational types so callers need a single import.
pub use tixr_core::{EventId, Principal, RegistryError, Role, Timestamp};
