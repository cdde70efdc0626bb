//! # Event Registry
//!
//! Owns event records, manager assignment, the one-event-per-creator limit,
//! and the monotonic id counter. This is the only component that allocates
//! identifiers, and registration is the only path that both creates an
//! event and establishes its manager — the two happen under a single lock
//! acquisition and cannot be observed separately.
//!
//! ## State machine
//!
//! An event has exactly two observable states:
//!
//! ```text
//! Nonexistent (id == 0 or id >= next_event_id) ──▶ Active
//! ```
//!
//! There is no deletion or deactivation transition. Once allocated, an id,
//! its creator, and its manager are immutable; only the four descriptive
//! fields may be overwritten.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use tixr_core::{EventId, Principal, RegistryError, Timestamp};

use crate::lock;

/// A registered event.
///
/// `id` and `creator` are fixed at registration; the descriptive fields are
/// overwritten in place by detail updates (destructive — no audit trail of
/// prior values is kept).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Registry-allocated identifier (never 0).
    pub id: EventId,
    /// Display name of the event.
    pub name: String,
    /// Where the event takes place.
    pub place: String,
    /// Name of the organizing party.
    pub organizer_name: String,
    /// When the event takes place.
    pub date: Timestamp,
    /// The principal that registered the event. Immutable; always equal to
    /// the event's manager.
    pub creator: Principal,
}

/// The tables the registry owns. Kept in one struct so registration's
/// check-and-set (creator limit, id allocation, manager assignment) is a
/// single write-lock acquisition.
#[derive(Debug)]
struct EventTable {
    events: HashMap<EventId, Event>,
    managers: HashMap<EventId, Principal>,
    creators: HashSet<Principal>,
    next_id: EventId,
}

impl Default for EventTable {
    fn default() -> Self {
        Self {
            events: HashMap::new(),
            managers: HashMap::new(),
            creators: HashSet::new(),
            next_id: EventId::FIRST,
        }
    }
}

/// Event records and per-event manager assignment.
#[derive(Debug, Default)]
pub struct EventRegistry {
    table: RwLock<EventTable>,
}

impl EventRegistry {
    /// Create an empty registry; the first allocated id will be 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new event for `caller` and return its allocated id.
    ///
    /// Atomically: checks the creator limit, allocates the next id, stores
    /// the record with `creator = caller`, assigns `caller` as manager, and
    /// marks the creator flag. The flag never reverts — a principal creates
    /// at most one event, ever.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::MintLimitExceeded`] if `caller` already created
    ///   an event.
    /// - [`RegistryError::EventAlreadyExists`] if the fresh id already has
    ///   a manager (counter corruption; unreachable through the public
    ///   surface).
    pub fn register(
        &self,
        caller: &Principal,
        name: String,
        place: String,
        organizer_name: String,
        date: Timestamp,
    ) -> Result<EventId, RegistryError> {
        let mut table = lock::write(&self.table);

        if table.creators.contains(caller) {
            return Err(RegistryError::MintLimitExceeded {
                principal: caller.clone(),
            });
        }

        let id = table.next_id;
        if table.managers.contains_key(&id) {
            return Err(RegistryError::EventAlreadyExists { event: id });
        }

        table.events.insert(
            id,
            Event {
                id,
                name,
                place,
                organizer_name,
                date,
                creator: caller.clone(),
            },
        );
        table.managers.insert(id, caller.clone());
        table.creators.insert(caller.clone());
        table.next_id = id.next();

        Ok(id)
    }

    /// Fetch the event record for `id`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidEventId`] if `id` is 0 or has not been
    /// allocated yet.
    pub fn get(&self, id: EventId) -> Result<Event, RegistryError> {
        let table = lock::read(&self.table);
        if !allocated(&table, id) {
            return Err(RegistryError::InvalidEventId { event: id });
        }
        table
            .events
            .get(&id)
            .cloned()
            .ok_or(RegistryError::InvalidEventId { event: id })
    }

    /// Overwrite the four mutable fields of `id` in place.
    ///
    /// Manager authorization lives in the façade; this method only enforces
    /// the id-range invariant.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EventDoesNotExist`] if `id` is outside
    /// `[1, next_event_id)`.
    pub fn update_details(
        &self,
        id: EventId,
        name: String,
        place: String,
        organizer_name: String,
        date: Timestamp,
    ) -> Result<(), RegistryError> {
        let mut table = lock::write(&self.table);
        if !allocated(&table, id) {
            return Err(RegistryError::EventDoesNotExist { event: id });
        }
        let event = table
            .events
            .get_mut(&id)
            .ok_or(RegistryError::EventDoesNotExist { event: id })?;
        event.name = name;
        event.place = place;
        event.organizer_name = organizer_name;
        event.date = date;
        Ok(())
    }

    /// The manager of `id` — equal to the creator, forever.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EventDoesNotExist`] if `id` has no manager (never
    /// allocated).
    pub fn manager_of(&self, id: EventId) -> Result<Principal, RegistryError> {
        lock::read(&self.table)
            .managers
            .get(&id)
            .cloned()
            .ok_or(RegistryError::EventDoesNotExist { event: id })
    }

    /// Whether `id` refers to an allocated event.
    pub fn is_allocated(&self, id: EventId) -> bool {
        allocated(&lock::read(&self.table), id)
    }

    /// Whether `principal` has already created an event.
    pub fn has_created(&self, principal: &Principal) -> bool {
        lock::read(&self.table).creators.contains(principal)
    }

    /// The id the next registration will allocate.
    pub fn next_event_id(&self) -> EventId {
        lock::read(&self.table).next_id
    }

    /// Export all records, sorted by id.
    pub(crate) fn export(&self) -> (Vec<Event>, Vec<Principal>, EventId) {
        let table = lock::read(&self.table);
        let mut events: Vec<Event> = table.events.values().cloned().collect();
        events.sort_by_key(|e| e.id);
        let mut creators: Vec<Principal> = table.creators.iter().cloned().collect();
        creators.sort();
        (events, creators, table.next_id)
    }

    /// Rebuild the tables from exported records. Managers are re-derived
    /// from each event's creator (the two are equal by construction).
    pub(crate) fn restore(events: &[Event], creators: &[Principal], next_id: EventId) -> Self {
        let mut table = EventTable {
            next_id,
            ..EventTable::default()
        };
        for event in events {
            table.managers.insert(event.id, event.creator.clone());
            table.events.insert(event.id, event.clone());
        }
        table.creators.extend(creators.iter().cloned());
        Self {
            table: RwLock::new(table),
        }
    }
}

/// Whether `id` falls in the allocated range `[1, next_id)`.
fn allocated(table: &EventTable, id: EventId) -> bool {
    id.is_some() && id < table.next_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_date() -> Timestamp {
        Timestamp::from_epoch_secs(1_700_000_000).unwrap()
    }

    fn register(registry: &EventRegistry, creator: &str) -> EventId {
        registry
            .register(
                &Principal::new(creator),
                "Conf".into(),
                "Hall".into(),
                "Org".into(),
                sample_date(),
            )
            .unwrap()
    }

    // ── Allocation ───────────────────────────────────────────────────

    #[test]
    fn test_first_registration_gets_id_one() {
        let registry = EventRegistry::new();
        assert_eq!(register(&registry, "alice"), EventId(1));
        assert_eq!(registry.next_event_id(), EventId(2));
    }

    #[test]
    fn test_ids_are_sequential() {
        let registry = EventRegistry::new();
        assert_eq!(register(&registry, "alice"), EventId(1));
        assert_eq!(register(&registry, "bob"), EventId(2));
        assert_eq!(register(&registry, "carol"), EventId(3));
    }

    #[test]
    fn test_second_registration_by_same_creator_rejected() {
        let registry = EventRegistry::new();
        register(&registry, "alice");
        let result = registry.register(
            &Principal::new("alice"),
            "Other".into(),
            "Place".into(),
            "Org".into(),
            sample_date(),
        );
        match result.unwrap_err() {
            RegistryError::MintLimitExceeded { principal } => {
                assert_eq!(principal, Principal::new("alice"));
            }
            other => panic!("Expected MintLimitExceeded, got: {other:?}"),
        }
        // The failed attempt must not have allocated an id.
        assert_eq!(registry.next_event_id(), EventId(2));
    }

    #[test]
    fn test_creator_flag_is_monotonic() {
        let registry = EventRegistry::new();
        assert!(!registry.has_created(&Principal::new("alice")));
        register(&registry, "alice");
        assert!(registry.has_created(&Principal::new("alice")));
    }

    // ── Lookup ───────────────────────────────────────────────────────

    #[test]
    fn test_get_returns_stored_record() {
        let registry = EventRegistry::new();
        let id = register(&registry, "alice");
        let event = registry.get(id).unwrap();
        assert_eq!(event.id, id);
        assert_eq!(event.name, "Conf");
        assert_eq!(event.creator, Principal::new("alice"));
    }

    #[test]
    fn test_get_zero_is_invalid() {
        let registry = EventRegistry::new();
        register(&registry, "alice");
        match registry.get(EventId::NONE).unwrap_err() {
            RegistryError::InvalidEventId { event } => assert_eq!(event, EventId::NONE),
            other => panic!("Expected InvalidEventId, got: {other:?}"),
        }
    }

    #[test]
    fn test_get_next_unallocated_is_invalid() {
        let registry = EventRegistry::new();
        register(&registry, "alice");
        let next = registry.next_event_id();
        assert!(matches!(
            registry.get(next),
            Err(RegistryError::InvalidEventId { .. })
        ));
    }

    // ── Manager assignment ───────────────────────────────────────────

    #[test]
    fn test_manager_equals_creator() {
        let registry = EventRegistry::new();
        let id = register(&registry, "alice");
        assert_eq!(registry.manager_of(id).unwrap(), Principal::new("alice"));
    }

    #[test]
    fn test_manager_of_unallocated_fails() {
        let registry = EventRegistry::new();
        assert!(matches!(
            registry.manager_of(EventId(1)),
            Err(RegistryError::EventDoesNotExist { .. })
        ));
    }

    #[test]
    fn test_manager_survives_detail_update() {
        let registry = EventRegistry::new();
        let id = register(&registry, "alice");
        registry
            .update_details(id, "New".into(), "New".into(), "New".into(), sample_date())
            .unwrap();
        assert_eq!(registry.manager_of(id).unwrap(), Principal::new("alice"));
        assert_eq!(registry.get(id).unwrap().creator, Principal::new("alice"));
    }

    // ── Detail updates ───────────────────────────────────────────────

    #[test]
    fn test_update_overwrites_all_four_fields() {
        let registry = EventRegistry::new();
        let id = register(&registry, "alice");
        let new_date = Timestamp::from_epoch_secs(1_800_000_000).unwrap();
        registry
            .update_details(
                id,
                "Summit".into(),
                "Arena".into(),
                "NewOrg".into(),
                new_date,
            )
            .unwrap();
        let event = registry.get(id).unwrap();
        assert_eq!(event.name, "Summit");
        assert_eq!(event.place, "Arena");
        assert_eq!(event.organizer_name, "NewOrg");
        assert_eq!(event.date, new_date);
    }

    #[test]
    fn test_update_unallocated_fails() {
        let registry = EventRegistry::new();
        let result = registry.update_details(
            EventId(5),
            "X".into(),
            "X".into(),
            "X".into(),
            sample_date(),
        );
        assert!(matches!(
            result,
            Err(RegistryError::EventDoesNotExist { event: EventId(5) })
        ));
    }

    // ── Export / restore ─────────────────────────────────────────────

    #[test]
    fn test_export_restore_roundtrip() {
        let registry = EventRegistry::new();
        register(&registry, "alice");
        register(&registry, "bob");

        let (events, creators, next_id) = registry.export();
        let restored = EventRegistry::restore(&events, &creators, next_id);

        assert_eq!(restored.next_event_id(), EventId(3));
        assert_eq!(restored.get(EventId(1)).unwrap().creator, Principal::new("alice"));
        assert_eq!(restored.manager_of(EventId(2)).unwrap(), Principal::new("bob"));
        assert!(restored.has_created(&Principal::new("alice")));
    }
}
