//! Fixtures shared by the service tests

use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::TempDir;

use crate::audit::AuditEntry;
use crate::config::paths::TallyPaths;
use crate::error::{TallyError, TallyResult};
use crate::models::{
    AccountBalance, Actor, ActorId, EntryId, LedgerEntry, PaymentMethod, PaymentMethodId,
};
use crate::storage::{AccountLocks, EntryFilter, EntryOrder, LedgerStore, Storage, UnitOfWork};

pub fn create_test_storage() -> (TempDir, Storage) {
    let temp_dir = TempDir::new().unwrap();
    let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
    let storage = Storage::new(paths).unwrap();
    storage.load_all().unwrap();
    (temp_dir, storage)
}

pub fn add_method(storage: &Storage, name: &str) -> PaymentMethodId {
    let method = PaymentMethod::new(name);
    let id = method.id;
    storage.payment_methods.upsert(method).unwrap();
    id
}

pub fn add_actor(storage: &Storage, name: &str) -> ActorId {
    let actor = Actor::new(name);
    let id = actor.id;
    storage.actors.upsert(actor).unwrap();
    id
}

/// Wraps a real store and fails `persist` on demand
pub struct FailingStore {
    pub inner: Storage,
    fail_all: AtomicBool,
    fail_for: Option<PaymentMethodId>,
}

impl FailingStore {
    /// Fails every persist while `set_failing(true)`
    pub fn new(inner: Storage) -> Self {
        Self {
            inner,
            fail_all: AtomicBool::new(false),
            fail_for: None,
        }
    }

    /// Always fails units of work that write this account's balance
    pub fn failing_for(inner: Storage, account: PaymentMethodId) -> Self {
        Self {
            inner,
            fail_all: AtomicBool::new(false),
            fail_for: Some(account),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }
}

impl LedgerStore for FailingStore {
    fn fetch_entries(
        &self,
        filter: &EntryFilter,
        order: EntryOrder,
    ) -> TallyResult<Vec<LedgerEntry>> {
        self.inner.fetch_entries(filter, order)
    }

    fn get_entry(&self, id: EntryId) -> TallyResult<Option<LedgerEntry>> {
        self.inner.get_entry(id)
    }

    fn fetch_balance(&self, account: PaymentMethodId) -> TallyResult<Option<AccountBalance>> {
        self.inner.fetch_balance(account)
    }

    fn persist(&self, work: &UnitOfWork) -> TallyResult<()> {
        let targeted = self
            .fail_for
            .is_some_and(|id| work.balances.iter().any(|b| b.payment_method == id));
        if self.fail_all.load(Ordering::SeqCst) || targeted {
            return Err(TallyError::StorageFailure("disk full".into()));
        }
        self.inner.persist(work)
    }

    fn list_payment_methods(&self, include_deleted: bool) -> TallyResult<Vec<PaymentMethod>> {
        self.inner.list_payment_methods(include_deleted)
    }

    fn get_payment_method(&self, id: PaymentMethodId) -> TallyResult<Option<PaymentMethod>> {
        self.inner.get_payment_method(id)
    }

    fn get_actor(&self, id: ActorId) -> TallyResult<Option<Actor>> {
        self.inner.get_actor(id)
    }

    fn locks(&self) -> &AccountLocks {
        self.inner.locks()
    }

    fn audit(&self, entries: &[AuditEntry]) -> TallyResult<()> {
        self.inner.audit(entries)
    }
}
