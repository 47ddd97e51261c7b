//! Per-account mutual exclusion
//!
//! Every balance mutation and every reconciliation holds the locks of the
//! payment methods it touches. A caller acquires its whole set at once, so
//! two transfers in opposite directions never wait on each other in a cycle.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::TallyError;
use crate::models::PaymentMethodId;

/// Registry of currently held payment method locks
#[derive(Debug, Default)]
pub struct AccountLocks {
    held: Mutex<HashSet<PaymentMethodId>>,
    released: Condvar,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until every id in `accounts` is free, then take them all
    pub fn acquire(&self, accounts: &[PaymentMethodId]) -> Result<AccountGuard<'_>, TallyError> {
        let mut wanted: Vec<PaymentMethodId> = accounts.to_vec();
        wanted.sort();
        wanted.dedup();

        let mut held = self.lock_held()?;
        while wanted.iter().any(|id| held.contains(id)) {
            held = self
                .released
                .wait(held)
                .map_err(|e| TallyError::StorageFailure(format!("Account lock poisoned: {}", e)))?;
        }
        held.extend(wanted.iter().copied());

        Ok(AccountGuard {
            locks: self,
            accounts: wanted,
        })
    }

    /// Whether an account is currently locked by anyone
    pub fn is_held(&self, account: PaymentMethodId) -> Result<bool, TallyError> {
        Ok(self.lock_held()?.contains(&account))
    }

    fn lock_held(&self) -> Result<MutexGuard<'_, HashSet<PaymentMethodId>>, TallyError> {
        self.held
            .lock()
            .map_err(|e| TallyError::StorageFailure(format!("Account lock poisoned: {}", e)))
    }
}

/// Releases its accounts when dropped
#[derive(Debug)]
pub struct AccountGuard<'a> {
    locks: &'a AccountLocks,
    accounts: Vec<PaymentMethodId>,
}

impl AccountGuard<'_> {
    pub fn accounts(&self) -> &[PaymentMethodId] {
        &self.accounts
    }
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        // Releasing must happen even if another holder panicked
        let mut held = self
            .locks
            .held
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for id in &self.accounts {
            held.remove(id);
        }
        drop(held);
        self.locks.released.notify_all();
    }
}
