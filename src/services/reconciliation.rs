//! Reconciliation service
//!
//! Recomputes a payment method's balance by replaying its entry history and
//! writes the result back into the cached row, correcting any drift.
//!
//! The replay folds from zero over the account's entries in ascending
//! timestamp order (ties keep creation order). An `init` entry resets the
//! fold to its amount; everything before the last `init` is discarded and
//! counted in the report.

use chrono::Utc;
use tracing::{info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{TallyError, TallyResult};
use crate::models::balance::apply;
use crate::models::{Effect, LedgerEntry, Money, PaymentMethodId};
use crate::storage::{EntryFilter, EntryOrder, LedgerStore, Storage, UnitOfWork};

use super::{record_audit, require_method};

/// Outcome of reconciling one payment method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub payment_method: PaymentMethodId,
    /// Cached value before reconciliation (zero if no row existed)
    pub previous: Money,
    /// Value recomputed from history
    pub reconciled: Money,
    pub entries_replayed: usize,
    /// Entries whose effect was discarded by a later `init`
    pub superseded_by_init: usize,
}

impl ReconciliationReport {
    /// `reconciled - previous`
    pub fn drift(&self) -> Money {
        self.reconciled.saturating_sub(self.previous)
    }

    pub fn is_drifted(&self) -> bool {
        self.previous != self.reconciled
    }

    /// Whether an `init` entry appeared after other entries
    pub fn has_non_leading_init(&self) -> bool {
        self.superseded_by_init > 0
    }
}

/// A payment method that could not be reconciled
#[derive(Debug, Clone)]
pub struct ReconcileFailure {
    pub payment_method: PaymentMethodId,
    pub name: String,
    pub error: String,
}

/// Outcome of reconciling every active payment method
#[derive(Debug, Clone, Default)]
pub struct ReconcileAllSummary {
    pub reports: Vec<ReconciliationReport>,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileAllSummary {
    pub fn drifted(&self) -> impl Iterator<Item = &ReconciliationReport> {
        self.reports.iter().filter(|r| r.is_drifted())
    }
}

/// Result of replaying history for one account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Replay {
    balance: Money,
    entries_replayed: usize,
    superseded_by_init: usize,
}

/// Fold `entries` (already in timestamp order) into a balance for `account`
fn replay(account: PaymentMethodId, entries: &[LedgerEntry]) -> TallyResult<Replay> {
    let mut result = Replay {
        balance: Money::zero(),
        entries_replayed: 0,
        superseded_by_init: 0,
    };

    for entry in entries {
        let Some(effect) = entry.effect_on(account) else {
            continue;
        };
        if effect == Effect::Init {
            result.superseded_by_init = result.entries_replayed;
        }
        result.balance = apply(result.balance, entry.amount, effect)
            .ok_or_else(|| TallyError::balance_overflow(account, entry.amount))?;
        result.entries_replayed += 1;
    }

    Ok(result)
}

/// Service for recomputing cached balances from history
pub struct ReconciliationService<'a, S: LedgerStore + ?Sized = Storage> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> ReconciliationService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Recompute and store the balance of `account`
    ///
    /// Holds the account lock for the whole read-fold-write. Running it
    /// twice without new entries yields the same balance.
    pub fn reconcile(&self, account: PaymentMethodId) -> TallyResult<ReconciliationReport> {
        let method = require_method(self.store, account)?;
        let _guard = self.store.locks().acquire(&[account])?;

        let replayed = self.replay_history(account)?;
        let (before, created) = self.store.fetch_or_create_balance(account)?;

        let mut row = before.clone();
        row.set(replayed.balance, Utc::now());
        self.store
            .persist(&UnitOfWork::new().upsert_balance(row.clone()))?;

        let report = self.report(account, before.balance, replayed);

        if created || report.is_drifted() {
            let audit = if created {
                AuditEntry::create(
                    EntityType::Balance,
                    account.to_string(),
                    Some(method.name.clone()),
                    &row,
                )
            } else {
                AuditEntry::update(
                    EntityType::Balance,
                    account.to_string(),
                    Some(method.name.clone()),
                    &before,
                    &row,
                )
            };
            record_audit(self.store, &[audit]);
        }

        info!(
            payment_method = %account,
            name = %method.name,
            previous = %report.previous,
            reconciled = %report.reconciled,
            entries = report.entries_replayed,
            "reconciled balance"
        );

        Ok(report)
    }

    /// Reconcile every active payment method
    ///
    /// A failure on one account is recorded and does not stop the others.
    pub fn reconcile_all(&self) -> TallyResult<ReconcileAllSummary> {
        let mut summary = ReconcileAllSummary::default();

        for method in self.store.list_payment_methods(false)? {
            match self.reconcile(method.id) {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    warn!(
                        payment_method = %method.id,
                        name = %method.name,
                        error = %e,
                        "reconciliation failed"
                    );
                    summary.failures.push(ReconcileFailure {
                        payment_method: method.id,
                        name: method.name,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }

    /// The balance history implies for `account`, without writing it
    pub fn recompute(&self, account: PaymentMethodId) -> TallyResult<Money> {
        require_method(self.store, account)?;
        Ok(self.replay_history(account)?.balance)
    }

    /// Report drift for `account` without correcting it
    pub fn verify(&self, account: PaymentMethodId) -> TallyResult<ReconciliationReport> {
        require_method(self.store, account)?;
        let _guard = self.store.locks().acquire(&[account])?;

        let replayed = self.replay_history(account)?;
        let previous = self
            .store
            .fetch_balance(account)?
            .map(|row| row.balance)
            .unwrap_or_default();

        Ok(self.report(account, previous, replayed))
    }

    fn replay_history(&self, account: PaymentMethodId) -> TallyResult<Replay> {
        let entries = self
            .store
            .fetch_entries(&EntryFilter::involving(account), EntryOrder::Oldest)?;
        replay(account, &entries)
    }

    fn report(
        &self,
        account: PaymentMethodId,
        previous: Money,
        replayed: Replay,
    ) -> ReconciliationReport {
        if replayed.superseded_by_init > 0 {
            warn!(
                payment_method = %account,
                discarded = replayed.superseded_by_init,
                "initial balance entry follows earlier entries; their effect was discarded"
            );
        }

        ReconciliationReport {
            payment_method: account,
            previous,
            reconciled: replayed.balance,
            entries_replayed: replayed.entries_replayed,
            superseded_by_init: replayed.superseded_by_init,
        }
    }
}
