//! Storage layer for tally
//!
//! JSON file storage with atomic writes. Entries and cached balances share
//! one file and are committed together as a `UnitOfWork`; payment methods
//! and actors each have their own file.

pub mod actors;
pub mod file_io;
pub mod init;
pub mod ledger;
pub mod locks;
pub mod payment_methods;
pub mod unit_of_work;

pub use actors::ActorRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use ledger::LedgerRepository;
pub use locks::{AccountGuard, AccountLocks};
pub use payment_methods::PaymentMethodRepository;
pub use unit_of_work::{EntryFilter, EntryOrder, UnitOfWork};

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::paths::TallyPaths;
use crate::error::{TallyError, TallyResult};
use crate::models::{
    AccountBalance, Actor, ActorId, EntryId, LedgerEntry, PaymentMethod, PaymentMethodId,
};

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, TallyError> {
    lock.read()
        .map_err(|e| TallyError::StorageFailure(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, TallyError> {
    lock.write()
        .map_err(|e| TallyError::StorageFailure(format!("Failed to acquire write lock: {}", e)))
}

/// Everything the ledger and reconciliation engines need from persistence
pub trait LedgerStore: Send + Sync {
    /// Entries matching `filter`, in the requested order
    fn fetch_entries(&self, filter: &EntryFilter, order: EntryOrder)
        -> TallyResult<Vec<LedgerEntry>>;

    fn get_entry(&self, id: EntryId) -> TallyResult<Option<LedgerEntry>>;

    /// The cached balance row, if one exists
    fn fetch_balance(&self, account: PaymentMethodId) -> TallyResult<Option<AccountBalance>>;

    /// The cached row, or a fresh zero row and `true`
    ///
    /// A fresh row is not stored until it is part of a persisted unit of work.
    fn fetch_or_create_balance(
        &self,
        account: PaymentMethodId,
    ) -> TallyResult<(AccountBalance, bool)> {
        Ok(match self.fetch_balance(account)? {
            Some(row) => (row, false),
            None => (AccountBalance::zero(account), true),
        })
    }

    /// Commit a unit of work all-or-nothing
    ///
    /// On `StorageFailure` none of the unit is visible, on disk or in memory.
    fn persist(&self, work: &UnitOfWork) -> TallyResult<()>;

    fn list_payment_methods(&self, include_deleted: bool) -> TallyResult<Vec<PaymentMethod>>;

    fn get_payment_method(&self, id: PaymentMethodId) -> TallyResult<Option<PaymentMethod>>;

    fn get_actor(&self, id: ActorId) -> TallyResult<Option<Actor>>;

    /// Per-account exclusion shared by every engine using this store
    fn locks(&self) -> &AccountLocks;

    /// Append the audit records of an already committed change
    fn audit(&self, entries: &[AuditEntry]) -> TallyResult<()>;
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TallyPaths,
    pub payment_methods: PaymentMethodRepository,
    pub actors: ActorRepository,
    pub ledger: LedgerRepository,
    locks: AccountLocks,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: TallyPaths) -> TallyResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            payment_methods: PaymentMethodRepository::new(paths.payment_methods_file()),
            actors: ActorRepository::new(paths.actors_file()),
            ledger: LedgerRepository::new(paths.ledger_file()),
            locks: AccountLocks::new(),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &TallyPaths {
        &self.paths
    }

    pub fn audit_logger(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> TallyResult<()> {
        self.payment_methods.load()?;
        self.actors.load()?;
        self.ledger.load()?;
        Ok(())
    }
}

impl LedgerStore for Storage {
    fn fetch_entries(
        &self,
        filter: &EntryFilter,
        order: EntryOrder,
    ) -> TallyResult<Vec<LedgerEntry>> {
        self.ledger.fetch_entries(filter, order)
    }

    fn get_entry(&self, id: EntryId) -> TallyResult<Option<LedgerEntry>> {
        self.ledger.get_entry(id)
    }

    fn fetch_balance(&self, account: PaymentMethodId) -> TallyResult<Option<AccountBalance>> {
        self.ledger.get_balance(account)
    }

    fn persist(&self, work: &UnitOfWork) -> TallyResult<()> {
        self.ledger.commit(work)
    }

    fn list_payment_methods(&self, include_deleted: bool) -> TallyResult<Vec<PaymentMethod>> {
        if include_deleted {
            self.payment_methods.get_all()
        } else {
            self.payment_methods.get_active()
        }
    }

    fn get_payment_method(&self, id: PaymentMethodId) -> TallyResult<Option<PaymentMethod>> {
        self.payment_methods.get(id)
    }

    fn get_actor(&self, id: ActorId) -> TallyResult<Option<Actor>> {
        self.actors.get(id)
    }

    fn locks(&self) -> &AccountLocks {
        &self.locks
    }

    fn audit(&self, entries: &[AuditEntry]) -> TallyResult<()> {
        self.audit.append(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, storage) = create_test_storage();

        assert!(temp_dir.path().join("data").exists());
        assert!(storage.list_payment_methods(true).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_or_create_does_not_store() {
        let (_temp_dir, storage) = create_test_storage();
        let cash = PaymentMethodId::new();

        let (row, created) = storage.fetch_or_create_balance(cash).unwrap();
        assert!(created);
        assert!(row.balance.is_zero());
        assert!(storage.fetch_balance(cash).unwrap().is_none());

        storage
            .persist(&UnitOfWork::new().upsert_balance(row))
            .unwrap();
        let (_, created) = storage.fetch_or_create_balance(cash).unwrap();
        assert!(!created);
    }

    #[test]
    fn test_load_all_round_trip() {
        let (temp_dir, storage) = create_test_storage();
        let method = PaymentMethod::new("Cash");
        let actor = Actor::new("Reza");
        storage.payment_methods.upsert(method.clone()).unwrap();
        storage.actors.upsert(actor.clone()).unwrap();
        storage.payment_methods.save().unwrap();
        storage.actors.save().unwrap();
        storage
            .persist(&UnitOfWork::new().create_entry(LedgerEntry::income(
                Money::from_minor(100),
                actor.id,
                method.id,
                None,
            )))
            .unwrap();

        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let reopened = Storage::new(paths).unwrap();
        reopened.load_all().unwrap();

        assert_eq!(reopened.list_payment_methods(false).unwrap().len(), 1);
        assert!(reopened.get_actor(actor.id).unwrap().is_some());
        assert_eq!(
            reopened
                .fetch_entries(&EntryFilter::involving(method.id), EntryOrder::Inserted)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_list_payment_methods_hides_retired() {
        let (_temp_dir, storage) = create_test_storage();
        let mut retired = PaymentMethod::new("Old Wallet");
        retired.retire();
        storage.payment_methods.upsert(retired).unwrap();
        storage.payment_methods.upsert(PaymentMethod::new("Cash")).unwrap();

        assert_eq!(storage.list_payment_methods(false).unwrap().len(), 1);
        assert_eq!(storage.list_payment_methods(true).unwrap().len(), 2);
    }
}
