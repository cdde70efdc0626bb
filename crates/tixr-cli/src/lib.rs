//! # tixr-cli — Ticket Registry Command-Line Interface
//!
//! Drives a [`tixr_registry::TicketRegistry`] through a JSON snapshot file:
//! each invocation loads the snapshot, applies one operation, and (for
//! mutations) writes the snapshot back. The snapshot file is the CLI's only
//! state — a missing file means an empty registry.
//!
//! ## Subcommands
//!
//! One per registry operation: `create-event`, `mint`, `burn`,
//! `update-uri`, `update-event`, `show`, `uri`, `balance`, `supply`.
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `tixr-registry` — no authorization or
//!   invariant logic here.
//! - Results are printed as JSON on stdout; failures exit non-zero with the
//!   registry error rendered verbatim.

pub mod command;
pub mod store;
