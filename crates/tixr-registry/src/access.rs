//! # Access Control Registry
//!
//! Coarse role grants per principal. A pure set-membership store: grants
//! are idempotent, lookups are infallible, and nothing is ever revoked.
//!
//! Roles are granted by the registry itself (the façade grants
//! `Role::EventCreator` on first successful event creation), never directly
//! by callers.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tixr_core::{Principal, Role};

use crate::lock;
use crate::snapshot::RoleGrantRecord;

/// Role grants per principal.
///
/// Thread-safe; methods take `&self` and hold the internal lock O(1).
#[derive(Debug, Default)]
pub struct AccessControlRegistry {
    roles: RwLock<HashMap<Principal, HashSet<Role>>>,
}

impl AccessControlRegistry {
    /// Create an empty registry with no grants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `role` to `principal`. Idempotent: granting an already-held
    /// role is a no-op.
    pub fn grant(&self, principal: &Principal, role: Role) {
        lock::write(&self.roles)
            .entry(principal.clone())
            .or_default()
            .insert(role);
    }

    /// Whether `principal` holds `role`.
    pub fn has_role(&self, principal: &Principal, role: Role) -> bool {
        lock::read(&self.roles)
            .get(principal)
            .is_some_and(|held| held.contains(&role))
    }

    /// Export all grants, sorted by principal for deterministic output.
    pub(crate) fn export(&self) -> Vec<RoleGrantRecord> {
        let roles = lock::read(&self.roles);
        let mut records: Vec<RoleGrantRecord> = roles
            .iter()
            .map(|(principal, held)| {
                let mut held: Vec<Role> = held.iter().copied().collect();
                held.sort_by_key(Role::as_str);
                RoleGrantRecord {
                    principal: principal.clone(),
                    roles: held,
                }
            })
            .collect();
        records.sort_by(|a, b| a.principal.cmp(&b.principal));
        records
    }

    /// Rebuild the grant table from exported records.
    pub(crate) fn restore(records: &[RoleGrantRecord]) -> Self {
        let mut roles: HashMap<Principal, HashSet<Role>> = HashMap::new();
        for record in records {
            roles
                .entry(record.principal.clone())
                .or_default()
                .extend(record.roles.iter().copied());
        }
        Self {
            roles: RwLock::new(roles),
        }
    }
}
