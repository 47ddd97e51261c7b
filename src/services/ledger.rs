//! Ledger service
//!
//! Records entries and applies their balance effects. Every operation
//! validates first, then builds the entry and the updated balance rows and
//! persists them as one unit of work while holding the locks of the
//! accounts involved.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{TallyError, TallyResult};
use crate::models::{ActorId, EntryId, LedgerEntry, Money, PaymentMethodId};
use crate::storage::{EntryFilter, EntryOrder, LedgerStore, Storage, UnitOfWork};

use super::{record_audit, require_active_method, require_actor, require_method};

/// Service for recording ledger entries
pub struct LedgerService<'a, S: LedgerStore + ?Sized = Storage> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> LedgerService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Record money received: `balance(account) += amount`
    pub fn record_income(
        &self,
        amount: Money,
        actor: ActorId,
        account: PaymentMethodId,
        summary: Option<String>,
    ) -> TallyResult<LedgerEntry> {
        self.record(LedgerEntry::income(amount, actor, account, summary))
    }

    /// Record money spent: `balance(account) -= amount`
    ///
    /// The resulting balance may be negative; overdraft checks belong to
    /// the caller.
    pub fn record_expense(
        &self,
        amount: Money,
        actor: ActorId,
        account: PaymentMethodId,
        summary: Option<String>,
    ) -> TallyResult<LedgerEntry> {
        self.record(LedgerEntry::expense(amount, actor, account, summary))
    }

    /// Move money between two payment methods
    ///
    /// Both balance rows are written in the same unit of work, so no reader
    /// ever sees only one side of the transfer.
    pub fn record_transfer(
        &self,
        amount: Money,
        actor: ActorId,
        source: PaymentMethodId,
        destination: PaymentMethodId,
        summary: Option<String>,
    ) -> TallyResult<LedgerEntry> {
        self.record(LedgerEntry::transfer(
            amount,
            actor,
            source,
            destination,
            summary,
        ))
    }

    /// Set the balance of `account` to `amount` with an opening-balance entry
    pub fn seed_initial_balance(
        &self,
        amount: Money,
        account: PaymentMethodId,
        system_actor: ActorId,
    ) -> TallyResult<LedgerEntry> {
        self.record(LedgerEntry::init(amount, account, system_actor))
    }

    fn record(&self, entry: LedgerEntry) -> TallyResult<LedgerEntry> {
        entry.validate()?;
        let effects = entry.effects();
        for (account, _) in &effects {
            require_active_method(self.store, *account)?;
        }
        require_actor(self.store, entry.actor)?;

        let accounts: Vec<PaymentMethodId> = effects.iter().map(|(id, _)| *id).collect();
        let _guard = self.store.locks().acquire(&accounts)?;

        // Stamped under the lock so replay order matches application order
        let entry = entry.at(self.next_timestamp(&accounts)?);

        let mut work = UnitOfWork::new().create_entry(entry.clone());
        let mut audit = vec![AuditEntry::create(
            EntityType::Entry,
            entry.id.to_string(),
            entry.summary.clone(),
            &entry,
        )];

        for (account, effect) in effects {
            let (before, created) = self.store.fetch_or_create_balance(account)?;
            let mut row = before.clone();
            row.apply_effect(entry.amount, effect, entry.timestamp)?;

            audit.push(if created {
                AuditEntry::create(EntityType::Balance, account.to_string(), None, &row)
            } else {
                AuditEntry::update(EntityType::Balance, account.to_string(), None, &before, &row)
            });
            work = work.upsert_balance(row);
        }

        self.store.persist(&work)?;
        record_audit(self.store, &audit);

        debug!(
            entry = %entry.id,
            kind = entry.kind.name(),
            amount = %entry.amount,
            "recorded entry"
        );

        Ok(entry)
    }

    /// Now, or the newest stored timestamp on `accounts` if that is later
    fn next_timestamp(&self, accounts: &[PaymentMethodId]) -> TallyResult<DateTime<Utc>> {
        let mut stamp = Utc::now();
        for account in accounts {
            let newest = self
                .store
                .fetch_entries(&EntryFilter::involving(*account), EntryOrder::Newest)?;
            if let Some(latest) = newest.first() {
                stamp = stamp.max(latest.timestamp);
            }
        }
        Ok(stamp)
    }

    /// Entries touching `account` (or all entries), newest first
    pub fn list_entries(
        &self,
        account: Option<PaymentMethodId>,
        limit: Option<usize>,
    ) -> TallyResult<Vec<LedgerEntry>> {
        let filter = match account {
            Some(id) => EntryFilter::involving(id),
            None => EntryFilter::all(),
        };

        let mut entries = self.store.fetch_entries(&filter, EntryOrder::Newest)?;
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    pub fn get_entry(&self, id: EntryId) -> TallyResult<Option<LedgerEntry>> {
        self.store.get_entry(id)
    }

    /// Find an entry by full ID or its short display form
    pub fn find_entry(&self, identifier: &str) -> TallyResult<Option<LedgerEntry>> {
        let entries = self
            .store
            .fetch_entries(&EntryFilter::all(), EntryOrder::Inserted)?;

        let mut matches = entries.into_iter().filter(|e| e.id.matches(identifier));
        let first = matches.next();
        if matches.next().is_some() {
            return Err(TallyError::Validation(format!(
                "Entry ID '{}' is ambiguous",
                identifier
            )));
        }
        Ok(first)
    }

    /// Append a pre-built entry without applying its balance effect
    ///
    /// Used for historical imports; the balance cache drifts until the
    /// account is reconciled.
    pub fn import_entry(&self, entry: LedgerEntry) -> TallyResult<LedgerEntry> {
        entry.validate()?;
        let accounts: Vec<PaymentMethodId> =
            entry.effects().into_iter().map(|(id, _)| id).collect();
        for account in &accounts {
            require_method(self.store, *account)?;
        }
        require_actor(self.store, entry.actor)?;

        let _guard = self.store.locks().acquire(&accounts)?;
        self.store
            .persist(&UnitOfWork::new().create_entry(entry.clone()))?;

        record_audit(
            self.store,
            &[AuditEntry::create(
                EntityType::Entry,
                entry.id.to_string(),
                entry.summary.clone(),
                &entry,
            )],
        );
        Ok(entry)
    }

    /// Remove an entry without reversing its balance effect
    pub fn delete_entry(&self, id: EntryId) -> TallyResult<LedgerEntry> {
        let entry = self
            .store
            .get_entry(id)?
            .ok_or_else(|| TallyError::entry_not_found(id.to_string()))?;

        let accounts: Vec<PaymentMethodId> =
            entry.effects().into_iter().map(|(id, _)| id).collect();
        let _guard = self.store.locks().acquire(&accounts)?;
        self.store.persist(&UnitOfWork::new().delete_entry(id))?;

        record_audit(
            self.store,
            &[AuditEntry::delete(
                EntityType::Entry,
                entry.id.to_string(),
                entry.summary.clone(),
                &entry,
            )],
        );
        Ok(entry)
    }
}
