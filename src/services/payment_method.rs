//! Payment method service
//!
//! Creation, renaming, retirement and opening balances. The opening balance
//! goes through the ledger as an `init` entry so that history explains it.

use tracing::warn;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{TallyError, TallyResult};
use crate::models::{ActorId, Money, PaymentMethod, PaymentMethodId};
use crate::storage::Storage;

use super::{record_audit, LedgerService};

/// An edit to an existing payment method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodUpdate {
    Rename(String),
    /// Record an `init` entry that sets the balance outright
    SetInitialBalance(Money),
}

/// Service for payment method management
pub struct PaymentMethodService<'a> {
    storage: &'a Storage,
}

impl<'a> PaymentMethodService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a payment method, optionally with an opening balance
    pub fn create(
        &self,
        name: &str,
        initial_balance: Option<Money>,
        system_actor: ActorId,
    ) -> TallyResult<PaymentMethod> {
        let name = name.trim();
        self.check_name(name, None)?;

        let method = PaymentMethod::new(name);
        method
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        self.storage.payment_methods.upsert(method.clone())?;
        if let Err(e) = self.storage.payment_methods.save() {
            self.storage.payment_methods.remove(method.id)?;
            return Err(e);
        }

        if let Some(amount) = initial_balance {
            let seeded = LedgerService::new(self.storage).seed_initial_balance(
                amount,
                method.id,
                system_actor,
            );
            if let Err(e) = seeded {
                if let Err(undo) = self.discard(method.id) {
                    warn!(method = %method.id, error = %undo, "failed to discard payment method");
                }
                return Err(e);
            }
        }

        record_audit(
            self.storage,
            &[AuditEntry::create(
                EntityType::PaymentMethod,
                method.id.to_string(),
                Some(method.name.clone()),
                &method,
            )],
        );

        Ok(method)
    }

    /// Undo a half-finished create
    fn discard(&self, id: PaymentMethodId) -> TallyResult<()> {
        self.storage.payment_methods.remove(id)?;
        self.storage.payment_methods.save()
    }

    pub fn get(&self, id: PaymentMethodId) -> TallyResult<Option<PaymentMethod>> {
        self.storage.payment_methods.get(id)
    }

    /// Find a payment method by name or ID string
    pub fn find(&self, identifier: &str) -> TallyResult<Option<PaymentMethod>> {
        if let Some(method) = self.storage.payment_methods.get_by_name(identifier)? {
            return Ok(Some(method));
        }

        if let Ok(id) = identifier.trim().parse::<PaymentMethodId>() {
            return self.storage.payment_methods.get(id);
        }

        // Short display form, e.g. "pm-1a2b3c4d"
        let all = self.storage.payment_methods.get_all()?;
        Ok(all.into_iter().find(|m| m.id.matches(identifier)))
    }

    /// Like `find`, but a miss is an error
    pub fn resolve(&self, identifier: &str) -> TallyResult<PaymentMethod> {
        self.find(identifier)?
            .ok_or_else(|| TallyError::account_not_found(identifier))
    }

    pub fn list(&self, include_retired: bool) -> TallyResult<Vec<PaymentMethod>> {
        if include_retired {
            self.storage.payment_methods.get_all()
        } else {
            self.storage.payment_methods.get_active()
        }
    }

    /// Apply one edit
    pub fn apply(
        &self,
        id: PaymentMethodId,
        update: PaymentMethodUpdate,
        system_actor: ActorId,
    ) -> TallyResult<PaymentMethod> {
        let method = self
            .get(id)?
            .ok_or_else(|| TallyError::account_not_found(id.to_string()))?;

        match update {
            PaymentMethodUpdate::Rename(name) => {
                let name = name.trim();
                self.check_name(name, Some(id))?;

                let mut renamed = method.clone();
                renamed.rename(name);
                renamed
                    .validate()
                    .map_err(|e| TallyError::Validation(e.to_string()))?;
                self.save_update(&method, renamed)
            }
            PaymentMethodUpdate::SetInitialBalance(amount) => {
                LedgerService::new(self.storage).seed_initial_balance(amount, id, system_actor)?;
                Ok(method)
            }
        }
    }

    /// Mark a payment method as no longer in use; its history is kept
    pub fn retire(&self, id: PaymentMethodId) -> TallyResult<PaymentMethod> {
        let method = self
            .get(id)?
            .ok_or_else(|| TallyError::account_not_found(id.to_string()))?;
        if method.is_deleted() {
            return Err(TallyError::Validation(format!(
                "Payment method '{}' is already retired",
                method.name
            )));
        }

        let mut retired = method.clone();
        retired.retire();
        self.save_update(&method, retired)
    }

    pub fn restore(&self, id: PaymentMethodId) -> TallyResult<PaymentMethod> {
        let method = self
            .get(id)?
            .ok_or_else(|| TallyError::account_not_found(id.to_string()))?;
        if !method.is_deleted() {
            return Err(TallyError::Validation(format!(
                "Payment method '{}' is not retired",
                method.name
            )));
        }

        let mut restored = method.clone();
        restored.restore();
        self.save_update(&method, restored)
    }

    fn check_name(&self, name: &str, exclude: Option<PaymentMethodId>) -> TallyResult<()> {
        if name.is_empty() {
            return Err(TallyError::Validation(
                "Payment method name cannot be empty".into(),
            ));
        }

        if self.storage.payment_methods.name_exists(name, exclude)? {
            return Err(TallyError::Duplicate {
                entity_type: "Payment method",
                identifier: name.to_string(),
            });
        }

        Ok(())
    }

    fn save_update(
        &self,
        before: &PaymentMethod,
        after: PaymentMethod,
    ) -> TallyResult<PaymentMethod> {
        self.storage.payment_methods.upsert(after.clone())?;
        self.storage.payment_methods.save()?;

        record_audit(
            self.storage,
            &[AuditEntry::update(
                EntityType::PaymentMethod,
                after.id.to_string(),
                Some(after.name.clone()),
                before,
                &after,
            )],
        );

        Ok(after)
    }
}
