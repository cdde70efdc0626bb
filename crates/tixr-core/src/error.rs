//! # Error Types — Registry Operation Failures
//!
//! The single error taxonomy for registry operations. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every violated precondition is a hard rejection of that single
//!   operation, leaving prior state unchanged. Nothing is retried.
//! - Every variant carries the offending event id, principal, or amounts,
//!   so the rejection can be surfaced verbatim to the caller.
//! - Authorization failures are distinct per surface (`Unauthorized` for
//!   metadata/details, `NotAuthorizedToMint`/`NotAuthorizedToBurn` for the
//!   ledger) because callers branch on them differently.

use thiserror::Error;

use crate::identity::{EventId, Principal};

/// Failure of a registry operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Caller is not the manager of the resource it tried to mutate.
    #[error("{caller} is not the manager of {event}")]
    Unauthorized {
        /// The event whose resource was targeted.
        event: EventId,
        /// The rejected caller.
        caller: Principal,
    },

    /// A freshly allocated id already has a manager. Indicates counter
    /// corruption; unreachable through the public surface.
    #[error("{event} already exists")]
    EventAlreadyExists {
        /// The colliding event id.
        event: EventId,
    },

    /// The event id has never been allocated (or never had the requested
    /// record set).
    #[error("{event} does not exist")]
    EventDoesNotExist {
        /// The unknown event id.
        event: EventId,
    },

    /// The event id is outside the valid range `[1, next_event_id)`.
    #[error("{event} is not a valid event id")]
    InvalidEventId {
        /// The out-of-range id.
        event: EventId,
    },

    /// Attempted to set an empty metadata URI.
    #[error("metadata uri for {event} must be non-empty")]
    UriEmpty {
        /// The event whose URI was targeted.
        event: EventId,
    },

    /// The principal has already created an event (at most one, ever).
    #[error("{principal} has already created an event")]
    MintLimitExceeded {
        /// The rejected creator.
        principal: Principal,
    },

    /// Caller lacks the creator role or is not the event's manager.
    #[error("{caller} is not authorized to mint tickets for {event}")]
    NotAuthorizedToMint {
        /// The targeted event.
        event: EventId,
        /// The rejected caller.
        caller: Principal,
    },

    /// Caller is not the event's manager.
    #[error("{caller} is not authorized to burn tickets for {event}")]
    NotAuthorizedToBurn {
        /// The targeted event.
        event: EventId,
        /// The rejected caller.
        caller: Principal,
    },

    /// Burn amount exceeds the account's current balance.
    #[error("insufficient balance for {account} on {event}: has {balance}, requested {requested}")]
    InsufficientBalance {
        /// The targeted event.
        event: EventId,
        /// The account whose balance was short.
        account: Principal,
        /// The balance at the time of the attempt.
        balance: u64,
        /// The amount the burn requested.
        requested: u64,
    },

    /// Mint amount would overflow the event's balance or total supply.
    #[error("supply overflow for {event}")]
    SupplyOverflow {
        /// The targeted event.
        event: EventId,
    },
}
