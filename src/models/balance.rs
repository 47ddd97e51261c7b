//! Cached running balance per payment method

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TallyError, TallyResult};

use super::entry::Effect;
use super::ids::PaymentMethodId;
use super::money::Money;

/// The cached balance row of one payment method
///
/// The value should always equal a replay of the method's entries; the
/// reconciliation service restores it when it drifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub payment_method: PaymentMethodId,
    pub balance: Money,
    pub last_updated: DateTime<Utc>,
}

impl AccountBalance {
    /// A fresh zero balance
    pub fn zero(payment_method: PaymentMethodId) -> Self {
        Self {
            payment_method,
            balance: Money::zero(),
            last_updated: Utc::now(),
        }
    }

    /// Apply one entry effect
    ///
    /// Income and transfer-in add, expense and transfer-out subtract, init
    /// replaces the value outright. On overflow the row is left unchanged.
    pub fn apply_effect(
        &mut self,
        amount: Money,
        effect: Effect,
        at: DateTime<Utc>,
    ) -> TallyResult<()> {
        self.balance = apply(self.balance, amount, effect)
            .ok_or_else(|| TallyError::balance_overflow(self.payment_method, amount))?;
        self.last_updated = at;
        Ok(())
    }

    /// Overwrite the value (reconciliation)
    pub fn set(&mut self, balance: Money, at: DateTime<Utc>) {
        self.balance = balance;
        self.last_updated = at;
    }
}

/// The pure balance rule shared by the incremental cache and the replay fold
///
/// `None` when the result does not fit.
pub fn apply(balance: Money, amount: Money, effect: Effect) -> Option<Money> {
    match effect {
        Effect::Income | Effect::TransferIn => balance.checked_add(amount),
        Effect::Expense | Effect::TransferOut => balance.checked_sub(amount),
        Effect::Init => Some(amount),
    }
}
