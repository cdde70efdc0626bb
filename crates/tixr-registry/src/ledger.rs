//! # Token Ledger
//!
//! Owns per-(event, holder) balances and per-event total supply for the
//! fungible ticket tokens. The supply invariant holds after every
//! operation:
//!
//! ```text
//! total_supply(e) == Σ over holders of balance(e, holder)
//! ```
//!
//! Credits and debits adjust balance and supply symmetrically under one
//! write-lock acquisition, so the invariant is never observable as broken.
//! Manager/role authorization lives in the façade.

use std::collections::HashMap;
use std::sync::RwLock;

use tixr_core::{EventId, Principal, RegistryError};

use crate::lock;
use crate::snapshot::{BalanceRecord, SupplyRecord};

/// Balances and supply, kept in one struct so a credit or debit touches
/// both under a single lock acquisition.
#[derive(Debug, Default)]
struct LedgerTable {
    balances: HashMap<EventId, HashMap<Principal, u64>>,
    supply: HashMap<EventId, u64>,
}

/// Fungible ticket balances per event.
#[derive(Debug, Default)]
pub struct TokenLedger {
    table: RwLock<LedgerTable>,
}

impl TokenLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increase `to`'s balance on `event` by `amount`, and the event's
    /// supply by the same amount. An `amount` of 0 succeeds as a no-op.
    ///
    /// # Errors
    ///
    /// [`RegistryError::SupplyOverflow`] if the balance or the supply would
    /// overflow `u64`; nothing is applied.
    pub fn credit(
        &self,
        to: &Principal,
        event: EventId,
        amount: u64,
    ) -> Result<(), RegistryError> {
        let mut table = lock::write(&self.table);

        let balance = table
            .balances
            .get(&event)
            .and_then(|holders| holders.get(to))
            .copied()
            .unwrap_or(0);
        let supply = table.supply.get(&event).copied().unwrap_or(0);

        // Validate both additions before applying either.
        let new_balance = balance
            .checked_add(amount)
            .ok_or(RegistryError::SupplyOverflow { event })?;
        let new_supply = supply
            .checked_add(amount)
            .ok_or(RegistryError::SupplyOverflow { event })?;

        table
            .balances
            .entry(event)
            .or_default()
            .insert(to.clone(), new_balance);
        table.supply.insert(event, new_supply);
        Ok(())
    }

    /// Decrease `account`'s balance on `event` by `amount`, and the event's
    /// supply by the same amount.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InsufficientBalance`] if the balance is below
    /// `amount`; nothing is applied.
    pub fn debit(
        &self,
        account: &Principal,
        event: EventId,
        amount: u64,
    ) -> Result<(), RegistryError> {
        let mut table = lock::write(&self.table);

        let balance = table
            .balances
            .get(&event)
            .and_then(|holders| holders.get(account))
            .copied()
            .unwrap_or(0);
        if balance < amount {
            return Err(RegistryError::InsufficientBalance {
                event,
                account: account.clone(),
                balance,
                requested: amount,
            });
        }

        table
            .balances
            .entry(event)
            .or_default()
            .insert(account.clone(), balance - amount);
        // supply >= any single balance by the ledger invariant.
        let supply = table.supply.entry(event).or_insert(0);
        *supply -= amount;
        Ok(())
    }

    /// `holder`'s balance on `event`; 0 for unknown keys.
    pub fn balance_of(&self, holder: &Principal, event: EventId) -> u64 {
        lock::read(&self.table)
            .balances
            .get(&event)
            .and_then(|holders| holders.get(holder))
            .copied()
            .unwrap_or(0)
    }

    /// Total supply of `event`'s tickets; 0 for unknown events.
    pub fn total_supply(&self, event: EventId) -> u64 {
        lock::read(&self.table)
            .supply
            .get(&event)
            .copied()
            .unwrap_or(0)
    }

    /// Export all balance records (zero balances included, since a burned-
    /// to-zero holder is distinct from a holder that never existed only in
    /// the record set), sorted for deterministic output.
    pub(crate) fn export(&self) -> Vec<BalanceRecord> {
        let table = lock::read(&self.table);
        let mut records: Vec<BalanceRecord> = table
            .balances
            .iter()
            .flat_map(|(event, holders)| {
                holders.iter().map(|(holder, amount)| BalanceRecord {
                    event: *event,
                    holder: holder.clone(),
                    amount: *amount,
                })
            })
            .collect();
        records.sort_by(|a, b| (a.event, &a.holder).cmp(&(b.event, &b.holder)));
        records
    }

    /// Export the recorded per-event supply, sorted by event id.
    pub(crate) fn export_supply(&self) -> Vec<SupplyRecord> {
        let table = lock::read(&self.table);
        let mut records: Vec<SupplyRecord> = table
            .supply
            .iter()
            .map(|(event, total)| SupplyRecord {
                event: *event,
                total: *total,
            })
            .collect();
        records.sort_by_key(|r| r.event);
        records
    }

    /// Rebuild the ledger from balance records, re-deriving supply as the
    /// per-event sum.
    ///
    /// # Errors
    ///
    /// [`RegistryError::SupplyOverflow`] if a per-event sum overflows.
    pub(crate) fn restore(records: &[BalanceRecord]) -> Result<Self, RegistryError> {
        let mut table = LedgerTable::default();
        for record in records {
            let supply = table.supply.entry(record.event).or_insert(0);
            *supply = supply
                .checked_add(record.amount)
                .ok_or(RegistryError::SupplyOverflow {
                    event: record.event,
                })?;
            table
                .balances
                .entry(record.event)
                .or_default()
                .insert(record.holder.clone(), record.amount);
        }
        Ok(Self {
            table: RwLock::new(table),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> Principal {
        Principal::new("bob")
    }

    /// Supply must equal the sum of balances after every operation.
    fn assert_supply_invariant(ledger: &TokenLedger, event: EventId) {
        let sum: u64 = ledger
            .export()
            .iter()
            .filter(|r| r.event == event)
            .map(|r| r.amount)
            .sum();
        assert_eq!(ledger.total_supply(event), sum);
    }

    // ── Credit ───────────────────────────────────────────────────────

    #[test]
    fn test_credit_increases_balance_and_supply() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), 5).unwrap();
        assert_eq!(ledger.balance_of(&bob(), EventId(1)), 5);
        assert_eq!(ledger.total_supply(EventId(1)), 5);
        assert_supply_invariant(&ledger, EventId(1));
    }

    #[test]
    fn test_credit_zero_is_a_successful_noop() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), 0).unwrap();
        assert_eq!(ledger.balance_of(&bob(), EventId(1)), 0);
        assert_eq!(ledger.total_supply(EventId(1)), 0);
    }

    #[test]
    fn test_credit_accumulates_across_holders() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), 5).unwrap();
        ledger.credit(&Principal::new("carol"), EventId(1), 3).unwrap();
        assert_eq!(ledger.total_supply(EventId(1)), 8);
        assert_supply_invariant(&ledger, EventId(1));
    }

    #[test]
    fn test_events_are_isolated() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), 5).unwrap();
        assert_eq!(ledger.balance_of(&bob(), EventId(2)), 0);
        assert_eq!(ledger.total_supply(EventId(2)), 0);
    }

    #[test]
    fn test_credit_overflow_rejected_without_partial_state() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), u64::MAX).unwrap();
        let result = ledger.credit(&bob(), EventId(1), 1);
        assert!(matches!(
            result,
            Err(RegistryError::SupplyOverflow { event: EventId(1) })
        ));
        assert_eq!(ledger.balance_of(&bob(), EventId(1)), u64::MAX);
        assert_eq!(ledger.total_supply(EventId(1)), u64::MAX);
    }

    #[test]
    fn test_supply_overflow_across_holders_rejected() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), u64::MAX).unwrap();
        // carol's balance would not overflow, but the event supply would.
        let result = ledger.credit(&Principal::new("carol"), EventId(1), 1);
        assert!(matches!(result, Err(RegistryError::SupplyOverflow { .. })));
        assert_eq!(ledger.balance_of(&Principal::new("carol"), EventId(1)), 0);
    }

    // ── Debit ────────────────────────────────────────────────────────

    #[test]
    fn test_debit_decreases_symmetrically() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), 5).unwrap();
        ledger.debit(&bob(), EventId(1), 3).unwrap();
        assert_eq!(ledger.balance_of(&bob(), EventId(1)), 2);
        assert_eq!(ledger.total_supply(EventId(1)), 2);
        assert_supply_invariant(&ledger, EventId(1));
    }

    #[test]
    fn test_debit_beyond_balance_rejected() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), 2).unwrap();
        match ledger.debit(&bob(), EventId(1), 10).unwrap_err() {
            RegistryError::InsufficientBalance {
                event,
                account,
                balance,
                requested,
            } => {
                assert_eq!(event, EventId(1));
                assert_eq!(account, bob());
                assert_eq!(balance, 2);
                assert_eq!(requested, 10);
            }
            other => panic!("Expected InsufficientBalance, got: {other:?}"),
        }
        // Rejection leaves state unchanged.
        assert_eq!(ledger.balance_of(&bob(), EventId(1)), 2);
        assert_eq!(ledger.total_supply(EventId(1)), 2);
    }

    #[test]
    fn test_debit_unknown_holder_rejected() {
        let ledger = TokenLedger::new();
        assert!(matches!(
            ledger.debit(&bob(), EventId(1), 1),
            Err(RegistryError::InsufficientBalance { balance: 0, .. })
        ));
    }

    #[test]
    fn test_debit_to_zero_keeps_holder_record() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), 5).unwrap();
        ledger.debit(&bob(), EventId(1), 5).unwrap();
        assert_eq!(ledger.balance_of(&bob(), EventId(1)), 0);
        assert_eq!(ledger.export().len(), 1);
        assert_supply_invariant(&ledger, EventId(1));
    }

    // ── Export / restore ─────────────────────────────────────────────

    #[test]
    fn test_restore_rederives_supply() {
        let ledger = TokenLedger::new();
        ledger.credit(&bob(), EventId(1), 5).unwrap();
        ledger.credit(&Principal::new("carol"), EventId(1), 3).unwrap();
        ledger.credit(&bob(), EventId(2), 7).unwrap();

        let restored = TokenLedger::restore(&ledger.export()).unwrap();
        assert_eq!(restored.total_supply(EventId(1)), 8);
        assert_eq!(restored.total_supply(EventId(2)), 7);
        assert_eq!(restored.balance_of(&bob(), EventId(1)), 5);
    }

    #[test]
    fn test_restore_rejects_overflowing_sum() {
        let records = vec![
            BalanceRecord {
                event: EventId(1),
                holder: bob(),
                amount: u64::MAX,
            },
            BalanceRecord {
                event: EventId(1),
                holder: Principal::new("carol"),
                amount: 1,
            },
        ];
        assert!(matches!(
            TokenLedger::restore(&records),
            Err(RegistryError::SupplyOverflow { .. })
        ));
    }
}
