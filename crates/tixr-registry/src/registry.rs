//! # Ticket Registry Façade
//!
//! The public operation surface. Composes the four owning stores and
//! sequences each operation as an atomic unit: authorization is checked as
//! the first statement of every mutating operation, and either all of the
//! operation's writes take effect or none do.
//!
//! ## Locking
//!
//! - `create_event` holds a single global lock, because the creator-limit
//!   check-and-set spans the global creator map.
//! - Event-scoped mutations (`mint`, `burn`, `update_uri`,
//!   `update_event_details`) hold a per-event lock, so concurrent callers
//!   observe each operation's reads-then-writes as one step.
//! - Store-internal locks are held O(1) per table access and never while
//!   acquiring another lock; lock order is strictly façade → store.
//! - Reads take no façade lock.
//!
//! Lock handles are created on first use, only for allocated ids, and
//! never removed — the id space is append-only, so the table only grows
//! with the number of events. Mutations naming an unallocated id are
//! rejected before a handle exists.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tixr_core::{EventId, Principal, RegistryError, Role, Timestamp};

use crate::access::AccessControlRegistry;
use crate::event::{Event, EventRegistry};
use crate::ledger::TokenLedger;
use crate::lock;
use crate::metadata::MetadataStore;

/// Per-event lock handles, created on first use.
#[derive(Debug, Default)]
struct EventLockTable {
    handles: Mutex<HashMap<EventId, Arc<Mutex<()>>>>,
}

impl EventLockTable {
    fn handle(&self, event: EventId) -> Arc<Mutex<()>> {
        lock::hold(&self.handles)
            .entry(event)
            .or_default()
            .clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        lock::hold(&self.handles).len()
    }
}

/// The single authoritative ticket registry.
///
/// `Send + Sync`; share it across request handlers via `Arc`. All methods
/// take `&self`.
#[derive(Debug, Default)]
pub struct TicketRegistry {
    access: AccessControlRegistry,
    events: EventRegistry,
    metadata: MetadataStore,
    ledger: TokenLedger,
    /// Serializes `create_event` (the creator-limit check is global).
    create_lock: Mutex<()>,
    event_locks: EventLockTable,
}

impl TicketRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a registry from restored stores (snapshot import).
    pub(crate) fn from_parts(
        access: AccessControlRegistry,
        events: EventRegistry,
        metadata: MetadataStore,
        ledger: TokenLedger,
    ) -> Self {
        Self {
            access,
            events,
            metadata,
            ledger,
            create_lock: Mutex::new(()),
            event_locks: EventLockTable::default(),
        }
    }

    /// The role-grant store (read access for callers that branch on roles).
    pub fn access(&self) -> &AccessControlRegistry {
        &self.access
    }

    /// The event store.
    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// The metadata store.
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// The ticket ledger.
    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    // ─── Mutations ───────────────────────────────────────────────────

    /// Register a new event for `caller` and return its id.
    ///
    /// Atomically: allocates the id, stores the record, assigns `caller` as
    /// manager, grants `Role::EventCreator`, marks the creator flag, and
    /// sets the initial metadata URI. A failure leaves no trace — the URI
    /// is validated before any store is touched.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::MintLimitExceeded`] — `caller` already created an
    ///   event.
    /// - [`RegistryError::UriEmpty`] — `uri` is empty.
    pub fn create_event(
        &self,
        caller: &Principal,
        name: String,
        place: String,
        organizer_name: String,
        date: Timestamp,
        uri: &str,
    ) -> Result<EventId, RegistryError> {
        let _guard = lock::hold(&self.create_lock);

        // Validate the URI first so a rejection allocates nothing. No id
        // exists yet, so the rejection names the "no event" sentinel.
        if uri.is_empty() {
            let err = RegistryError::UriEmpty {
                event: EventId::NONE,
            };
            tracing::warn!(caller = %caller, error = %err, "event creation rejected");
            return Err(err);
        }

        let id = self
            .events
            .register(caller, name, place, organizer_name, date)
            .map_err(|err| {
                tracing::warn!(caller = %caller, error = %err, "event creation rejected");
                err
            })?;
        self.access.grant(caller, Role::EventCreator);
        // Cannot fail: the URI was validated above.
        self.metadata.set_uri(id, uri)?;

        tracing::info!(event = %id, creator = %caller, "event registered");
        Ok(id)
    }

    /// Mint `amount` tickets for `event` to `to`.
    ///
    /// `caller` must hold `Role::EventCreator` **and** be the event's
    /// manager. `data` is accepted for interface compatibility with
    /// token-standard callers and ignored. An `amount` of 0 succeeds as a
    /// no-op.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotAuthorizedToMint`] — role or manager-identity
    ///   mismatch (including events that do not exist, which have no
    ///   manager to match).
    /// - [`RegistryError::SupplyOverflow`] — the balance or supply would
    ///   overflow.
    pub fn mint(
        &self,
        caller: &Principal,
        to: &Principal,
        event: EventId,
        amount: u64,
        _data: &[u8],
    ) -> Result<(), RegistryError> {
        // Unallocated ids have no manager to match and get no lock handle.
        if !self.events.is_allocated(event) {
            tracing::warn!(event = %event, caller = %caller, "mint rejected");
            return Err(RegistryError::NotAuthorizedToMint {
                event,
                caller: caller.clone(),
            });
        }
        let handle = self.event_locks.handle(event);
        let _guard = lock::hold(&handle);

        let is_manager = self.events.manager_of(event).is_ok_and(|m| m == *caller);
        if !self.access.has_role(caller, Role::EventCreator) || !is_manager {
            let err = RegistryError::NotAuthorizedToMint {
                event,
                caller: caller.clone(),
            };
            tracing::warn!(event = %event, caller = %caller, "mint rejected");
            return Err(err);
        }

        self.ledger.credit(to, event, amount)?;
        tracing::info!(event = %event, to = %to, amount, "tickets minted");
        Ok(())
    }

    /// Burn `amount` of `account`'s tickets for `event`.
    ///
    /// `caller` must be the event's manager (no role requirement — the
    /// mint/burn guard asymmetry is deliberate).
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotAuthorizedToBurn`] — caller is not the
    ///   manager.
    /// - [`RegistryError::InsufficientBalance`] — `account` holds fewer
    ///   than `amount`.
    pub fn burn(
        &self,
        caller: &Principal,
        account: &Principal,
        event: EventId,
        amount: u64,
    ) -> Result<(), RegistryError> {
        if !self.events.is_allocated(event) {
            tracing::warn!(event = %event, caller = %caller, "burn rejected");
            return Err(RegistryError::NotAuthorizedToBurn {
                event,
                caller: caller.clone(),
            });
        }
        let handle = self.event_locks.handle(event);
        let _guard = lock::hold(&handle);

        let is_manager = self.events.manager_of(event).is_ok_and(|m| m == *caller);
        if !is_manager {
            tracing::warn!(event = %event, caller = %caller, "burn rejected");
            return Err(RegistryError::NotAuthorizedToBurn {
                event,
                caller: caller.clone(),
            });
        }

        self.ledger.debit(account, event, amount)?;
        tracing::info!(event = %event, account = %account, amount, "tickets burned");
        Ok(())
    }

    /// Replace the metadata URI of `event`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Unauthorized`] — caller is not the manager
    ///   (including events that do not exist, which have no manager to
    ///   match).
    /// - [`RegistryError::UriEmpty`] — `uri` is empty; the prior URI is
    ///   kept.
    pub fn update_uri(
        &self,
        caller: &Principal,
        event: EventId,
        uri: &str,
    ) -> Result<(), RegistryError> {
        if !self.events.is_allocated(event) {
            tracing::warn!(event = %event, caller = %caller, "uri update rejected");
            return Err(RegistryError::Unauthorized {
                event,
                caller: caller.clone(),
            });
        }
        let handle = self.event_locks.handle(event);
        let _guard = lock::hold(&handle);

        let is_manager = self.events.manager_of(event).is_ok_and(|m| m == *caller);
        if !is_manager {
            tracing::warn!(event = %event, caller = %caller, "uri update rejected");
            return Err(RegistryError::Unauthorized {
                event,
                caller: caller.clone(),
            });
        }

        self.metadata.set_uri(event, uri)?;
        tracing::info!(event = %event, "metadata uri updated");
        Ok(())
    }

    /// Overwrite the descriptive fields of `event`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::EventDoesNotExist`] — `event` is outside the
    ///   allocated range (checked before the manager identity, so an
    ///   out-of-range id never reports `Unauthorized`).
    /// - [`RegistryError::Unauthorized`] — caller is not the manager.
    pub fn update_event_details(
        &self,
        caller: &Principal,
        event: EventId,
        name: String,
        place: String,
        organizer_name: String,
        date: Timestamp,
    ) -> Result<(), RegistryError> {
        if !self.events.is_allocated(event) {
            return Err(RegistryError::EventDoesNotExist { event });
        }
        let handle = self.event_locks.handle(event);
        let _guard = lock::hold(&handle);

        let is_manager = self.events.manager_of(event).is_ok_and(|m| m == *caller);
        if !is_manager {
            tracing::warn!(event = %event, caller = %caller, "detail update rejected");
            return Err(RegistryError::Unauthorized {
                event,
                caller: caller.clone(),
            });
        }

        self.events
            .update_details(event, name, place, organizer_name, date)?;
        tracing::info!(event = %event, "event details updated");
        Ok(())
    }

    // ─── Reads ───────────────────────────────────────────────────────

    /// The event record and its metadata URI.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidEventId`] if `event` is 0 or unallocated.
    pub fn get_event(&self, event: EventId) -> Result<(Event, String), RegistryError> {
        let record = self.events.get(event)?;
        let uri = self.metadata.uri(event)?;
        Ok((record, uri))
    }

    /// The metadata URI of `event`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EventDoesNotExist`] if no URI has ever been set.
    pub fn get_uri(&self, event: EventId) -> Result<String, RegistryError> {
        self.metadata.uri(event)
    }

    /// `holder`'s ticket balance on `event`; 0 for unknown keys.
    pub fn balance_of(&self, holder: &Principal, event: EventId) -> u64 {
        self.ledger.balance_of(holder, event)
    }

    /// Total ticket supply of `event`; 0 for unknown events.
    pub fn total_supply(&self, event: EventId) -> u64 {
        self.ledger.total_supply(event)
    }
}
