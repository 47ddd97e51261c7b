//! Ledger repository for JSON storage
//!
//! Entries and balance rows live in a single file, ledger.json, so that a
//! unit of work either lands completely or not at all.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::TallyError;
use crate::models::{AccountBalance, EntryId, LedgerEntry, PaymentMethodId};

use super::file_io::{read_json, write_json_atomic};
use super::unit_of_work::{EntryFilter, EntryOrder, UnitOfWork};
use super::{read_lock, write_lock};

#[derive(Debug, Default, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    entries: Vec<LedgerEntry>,
    #[serde(default)]
    balances: Vec<AccountBalance>,
}

/// Borrowed view of the staged ledger, written without cloning entries
#[derive(Serialize)]
struct LedgerFileRef<'a> {
    entries: Vec<&'a LedgerEntry>,
    balances: Vec<&'a AccountBalance>,
}

#[derive(Debug, Default)]
struct LedgerState {
    /// Insertion order; reconciliation relies on it for timestamp ties
    entries: Vec<LedgerEntry>,
    balances: HashMap<PaymentMethodId, AccountBalance>,
}

/// Repository for entries and cached balances
pub struct LedgerRepository {
    path: PathBuf,
    state: RwLock<LedgerState>,
}

impl LedgerRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Load entries and balances from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let file: LedgerFile = read_json(&self.path)?;

        let mut state = write_lock(&self.state)?;
        state.entries = file.entries;
        state.balances = file
            .balances
            .into_iter()
            .map(|b| (b.payment_method, b))
            .collect();

        Ok(())
    }

    /// Entries matching a filter in the requested order
    pub fn fetch_entries(
        &self,
        filter: &EntryFilter,
        order: EntryOrder,
    ) -> Result<Vec<LedgerEntry>, TallyError> {
        let state = read_lock(&self.state)?;

        let mut entries: Vec<_> = state
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();

        // sort_by is stable: equal timestamps keep insertion order
        match order {
            EntryOrder::Inserted => {}
            EntryOrder::Oldest => entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            EntryOrder::Newest => {
                entries.reverse();
                entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            }
        }

        Ok(entries)
    }

    pub fn get_entry(&self, id: EntryId) -> Result<Option<LedgerEntry>, TallyError> {
        let state = read_lock(&self.state)?;
        Ok(state.entries.iter().find(|e| e.id == id).cloned())
    }

    pub fn get_balance(&self, id: PaymentMethodId) -> Result<Option<AccountBalance>, TallyError> {
        Ok(read_lock(&self.state)?.balances.get(&id).cloned())
    }

    pub fn all_balances(&self) -> Result<Vec<AccountBalance>, TallyError> {
        let state = read_lock(&self.state)?;
        let mut balances: Vec<_> = state.balances.values().cloned().collect();
        balances.sort_by_key(|b| b.payment_method);
        Ok(balances)
    }

    pub fn entry_count(&self) -> Result<usize, TallyError> {
        Ok(read_lock(&self.state)?.entries.len())
    }

    /// Commit a unit of work
    ///
    /// The staged state is written to disk first and only then applied in
    /// memory, under one write lock, so readers never see a half-applied
    /// unit and a failed write leaves memory untouched.
    pub fn commit(&self, work: &UnitOfWork) -> Result<(), TallyError> {
        if work.is_empty() {
            return Ok(());
        }

        let mut state = write_lock(&self.state)?;

        let deleted: HashSet<EntryId> = work.deleted_entries.iter().copied().collect();
        for id in &deleted {
            if !state.entries.iter().any(|e| e.id == *id) {
                return Err(TallyError::entry_not_found(id.to_string()));
            }
        }
        for entry in &work.created_entries {
            if state.entries.iter().any(|e| e.id == entry.id) {
                return Err(TallyError::Duplicate {
                    entity_type: "Entry",
                    identifier: entry.id.to_string(),
                });
            }
        }

        let mut staged_balances: HashMap<PaymentMethodId, &AccountBalance> =
            state.balances.iter().map(|(k, v)| (*k, v)).collect();
        for balance in &work.balances {
            staged_balances.insert(balance.payment_method, balance);
        }
        let mut balances: Vec<&AccountBalance> = staged_balances.into_values().collect();
        balances.sort_by_key(|b| b.payment_method);

        let staged = LedgerFileRef {
            entries: state
                .entries
                .iter()
                .filter(|e| !deleted.contains(&e.id))
                .chain(work.created_entries.iter())
                .collect(),
            balances,
        };
        write_json_atomic(&self.path, &staged)?;

        state.entries.retain(|e| !deleted.contains(&e.id));
        state.entries.extend(work.created_entries.iter().cloned());
        for balance in &work.balances {
            state
                .balances
                .insert(balance.payment_method, balance.clone());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActorId, Money};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, LedgerRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = LedgerRepository::new(temp_dir.path().join("ledger.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_commit_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let cash = PaymentMethodId::new();
        let entry = LedgerEntry::income(Money::from_minor(500), ActorId::new(), cash, None);
        let mut row = AccountBalance::zero(cash);
        row.balance = Money::from_minor(500);

        let work = UnitOfWork::new()
            .create_entry(entry.clone())
            .upsert_balance(row);
        repo.commit(&work).unwrap();

        let repo2 = LedgerRepository::new(temp_dir.path().join("ledger.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get_entry(entry.id).unwrap(), Some(entry));
        assert_eq!(repo2.get_balance(cash).unwrap().unwrap().balance.minor(), 500);
    }

    #[test]
    fn test_commit_failure_leaves_memory_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");
        std::fs::create_dir(&path).unwrap();
        let repo = LedgerRepository::new(path);

        let cash = PaymentMethodId::new();
        let work = UnitOfWork::new()
            .create_entry(LedgerEntry::income(
                Money::from_minor(1),
                ActorId::new(),
                cash,
                None,
            ))
            .upsert_balance(AccountBalance::zero(cash));

        assert!(repo.commit(&work).unwrap_err().is_storage_failure());
        assert_eq!(repo.entry_count().unwrap(), 0);
        assert!(repo.get_balance(cash).unwrap().is_none());
    }

    #[test]
    fn test_oldest_order_is_stable_for_ties() {
        let (_temp_dir, repo) = create_test_repo();
        let cash = PaymentMethodId::new();
        let actor = ActorId::new();
        let ts = Utc.with_ymd_and_hms(2025, 4, 28, 10, 0, 0).unwrap();

        let first = LedgerEntry::income(Money::from_minor(1), actor, cash, None).at(ts);
        let second = LedgerEntry::expense(Money::from_minor(2), actor, cash, None).at(ts);
        let earlier = LedgerEntry::income(Money::from_minor(3), actor, cash, None)
            .at(ts - chrono::Duration::hours(1));

        for entry in [&first, &second, &earlier] {
            repo.commit(&UnitOfWork::new().create_entry(entry.clone()))
                .unwrap();
        }

        let oldest = repo
            .fetch_entries(&EntryFilter::involving(cash), EntryOrder::Oldest)
            .unwrap();
        let ids: Vec<_> = oldest.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![earlier.id, first.id, second.id]);

        let newest = repo
            .fetch_entries(&EntryFilter::all(), EntryOrder::Newest)
            .unwrap();
        let ids: Vec<_> = newest.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id, earlier.id]);
    }

    #[test]
    fn test_delete_unknown_entry_fails_before_writing() {
        let (temp_dir, repo) = create_test_repo();
        let work = UnitOfWork::new().delete_entry(EntryId::new());

        assert!(repo.commit(&work).unwrap_err().is_not_found());
        assert!(!temp_dir.path().join("ledger.json").exists());
    }

    #[test]
    fn test_delete_entry() {
        let (_temp_dir, repo) = create_test_repo();
        let entry = LedgerEntry::income(
            Money::from_minor(1),
            ActorId::new(),
            PaymentMethodId::new(),
            None,
        );
        repo.commit(&UnitOfWork::new().create_entry(entry.clone()))
            .unwrap();
        repo.commit(&UnitOfWork::new().delete_entry(entry.id))
            .unwrap();

        assert_eq!(repo.entry_count().unwrap(), 0);
    }
}
