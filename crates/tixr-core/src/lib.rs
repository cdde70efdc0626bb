//! # tixr-core — Foundational Types for the Ticket Registry
//!
//! This crate is the bedrock of the tixr stack. It defines the type-system
//! primitives every other crate depends on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `EventId` and `Principal`
//!    are newtypes with validated semantics. No bare integers or strings for
//!    identifiers.
//!
//! 2. **Single `Role` enum.** One definition, exhaustive `match` everywhere.
//!    Adding a role forces every consumer to handle it.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision.
//!
//! 4. **One error taxonomy.** Every operation failure is a `RegistryError`
//!    variant carrying the offending identifier or principal, so rejections
//!    can be surfaced verbatim to the caller.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tixr-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::RegistryError;
pub use identity::{EventId, Principal, Role};
pub use temporal::{Timestamp, TimestampError};
