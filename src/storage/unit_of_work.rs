//! Units of work and entry queries
//!
//! A `UnitOfWork` groups everything one ledger operation changes so that
//! storage can commit it all-or-nothing.

use crate::models::{AccountBalance, EntryId, LedgerEntry, PaymentMethodId};

/// The changes of one operation, committed together
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    pub created_entries: Vec<LedgerEntry>,
    pub deleted_entries: Vec<EntryId>,
    pub balances: Vec<AccountBalance>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry
    pub fn create_entry(mut self, entry: LedgerEntry) -> Self {
        self.created_entries.push(entry);
        self
    }

    /// Remove an existing entry
    pub fn delete_entry(mut self, id: EntryId) -> Self {
        self.deleted_entries.push(id);
        self
    }

    /// Insert or replace a balance row
    pub fn upsert_balance(mut self, balance: AccountBalance) -> Self {
        self.balances.push(balance);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.created_entries.is_empty()
            && self.deleted_entries.is_empty()
            && self.balances.is_empty()
    }
}

/// Which entries a query returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Only entries whose source or destination is this payment method
    pub account: Option<PaymentMethodId>,
}

impl EntryFilter {
    pub fn all() -> Self {
        Self { account: None }
    }

    pub fn involving(account: PaymentMethodId) -> Self {
        Self {
            account: Some(account),
        }
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        match self.account {
            Some(account) => entry.involves(account),
            None => true,
        }
    }
}

/// Ordering of query results
///
/// Both timestamp orders are stable: entries with equal timestamps keep
/// their creation order (reversed for `Newest`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// Creation order
    #[default]
    Inserted,
    Oldest,
    Newest,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActorId, Money};

    #[test]
    fn test_empty_unit() {
        assert!(UnitOfWork::new().is_empty());
        assert!(!UnitOfWork::new().delete_entry(EntryId::new()).is_empty());
    }

    #[test]
    fn test_filter_matches_both_transfer_sides() {
        let cash = PaymentMethodId::new();
        let bank = PaymentMethodId::new();
        let other = PaymentMethodId::new();
        let entry = LedgerEntry::transfer(Money::from_minor(10), ActorId::new(), cash, bank, None);

        assert!(EntryFilter::involving(cash).matches(&entry));
        assert!(EntryFilter::involving(bank).matches(&entry));
        assert!(!EntryFilter::involving(other).matches(&entry));
        assert!(EntryFilter::all().matches(&entry));
    }
}
