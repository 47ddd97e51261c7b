//! Balance service
//!
//! Read access to the cached balance rows, plus lazy creation of a zero row
//! the first time an account is referenced.

use crate::audit::{AuditEntry, EntityType};
use crate::error::{TallyError, TallyResult};
use crate::models::{AccountBalance, Money, PaymentMethod, PaymentMethodId};
use crate::storage::{LedgerStore, Storage, UnitOfWork};

use super::{record_audit, require_method};

/// A payment method with its cached balance
#[derive(Debug, Clone)]
pub struct MethodBalance {
    pub payment_method: PaymentMethod,
    pub balance: AccountBalance,
}

/// Every listed payment method plus the sum of their balances
#[derive(Debug, Clone)]
pub struct BalanceList {
    pub rows: Vec<MethodBalance>,
    pub total: Money,
}

/// Service for balance queries
pub struct BalanceService<'a, S: LedgerStore + ?Sized = Storage> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> BalanceService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The cached row of `account`, creating and storing a zero row if none
    /// exists yet
    pub fn get_or_create(&self, account: PaymentMethodId) -> TallyResult<AccountBalance> {
        require_method(self.store, account)?;

        // Two first references must not both insert a row
        let _guard = self.store.locks().acquire(&[account])?;
        let (row, created) = self.store.fetch_or_create_balance(account)?;
        if created {
            self.store
                .persist(&UnitOfWork::new().upsert_balance(row.clone()))?;
            record_audit(
                self.store,
                &[AuditEntry::create(
                    EntityType::Balance,
                    account.to_string(),
                    None,
                    &row,
                )],
            );
        }

        Ok(row)
    }

    /// The cached value, zero when no row exists yet; never writes
    pub fn current(&self, account: PaymentMethodId) -> TallyResult<Money> {
        require_method(self.store, account)?;
        Ok(self
            .store
            .fetch_balance(account)?
            .map(|row| row.balance)
            .unwrap_or_default())
    }

    /// Every payment method with its cached balance
    pub fn list(&self, include_retired: bool) -> TallyResult<BalanceList> {
        let methods = self.store.list_payment_methods(include_retired)?;

        let mut rows = Vec::with_capacity(methods.len());
        for method in methods {
            let balance = self
                .store
                .fetch_balance(method.id)?
                .unwrap_or_else(|| AccountBalance::zero(method.id));
            rows.push(MethodBalance {
                payment_method: method,
                balance,
            });
        }

        let total = Money::checked_sum(rows.iter().map(|r| r.balance.balance))
            .ok_or_else(|| TallyError::Validation("Total balance is out of range".into()))?;
        Ok(BalanceList { rows, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{add_actor, add_method, create_test_storage};
    use crate::services::LedgerService;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let (_temp, storage) = create_test_storage();
        let cash = add_method(&storage, "Cash");
        let service = BalanceService::new(&storage);

        let first = service.get_or_create(cash).unwrap();
        let second = service.get_or_create(cash).unwrap();

        assert!(first.balance.is_zero());
        assert_eq!(first, second);
        assert_eq!(storage.ledger.all_balances().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_get_or_create_makes_one_row() {
        let (_temp, storage) = create_test_storage();
        let cash = add_method(&storage, "Cash");
        let storage = Arc::new(storage);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || BalanceService::new(&*storage).get_or_create(cash).unwrap())
            })
            .collect();
        let rows: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(rows.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(storage.ledger.all_balances().unwrap().len(), 1);
    }

    #[test]
    fn test_get_or_create_unknown_account() {
        let (_temp, storage) = create_test_storage();
        let err = BalanceService::new(&storage)
            .get_or_create(PaymentMethodId::new())
            .unwrap_err();
        assert!(matches!(err, TallyError::AccountNotFound(_)));
    }

    #[test]
    fn test_list_with_total() {
        let (_temp, storage) = create_test_storage();
        let cash = add_method(&storage, "Cash");
        let bank = add_method(&storage, "Bank");
        add_method(&storage, "Unused");
        let reza = add_actor(&storage, "Reza");
        let ledger = LedgerService::new(&storage);

        ledger
            .record_income(Money::from_minor(700), reza, cash, None)
            .unwrap();
        ledger
            .record_expense(Money::from_minor(200), reza, bank, None)
            .unwrap();

        let list = BalanceService::new(&storage).list(false).unwrap();
        assert_eq!(list.rows.len(), 3);
        assert_eq!(list.total.minor(), 500);

        let names: Vec<_> = list
            .rows
            .iter()
            .map(|r| r.payment_method.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bank", "Cash", "Unused"]);
        // Listing never creates rows
        assert_eq!(storage.ledger.all_balances().unwrap().len(), 2);
    }

    #[test]
    fn test_total_out_of_range_is_an_error() {
        let (_temp, storage) = create_test_storage();
        let cash = add_method(&storage, "Cash");
        let bank = add_method(&storage, "Bank");
        let reza = add_actor(&storage, "Reza");
        let ledger = LedgerService::new(&storage);

        ledger
            .record_income(Money::from_minor(i64::MAX), reza, cash, None)
            .unwrap();
        ledger
            .record_income(Money::from_minor(1), reza, bank, None)
            .unwrap();

        let err = BalanceService::new(&storage).list(false).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_current_defaults_to_zero() {
        let (_temp, storage) = create_test_storage();
        let cash = add_method(&storage, "Cash");

        let value = BalanceService::new(&storage).current(cash).unwrap();
        assert!(value.is_zero());
    }
}
