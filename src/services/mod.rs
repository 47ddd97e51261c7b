//! Service layer for tally
//!
//! The service layer provides the ledger rules on top of the storage layer:
//! validation, balance effects, reconciliation and record management.

pub mod actor;
pub mod balance;
pub mod ledger;
pub mod payment_method;
pub mod reconciliation;

#[cfg(test)]
pub(crate) mod test_support;

pub use actor::ActorService;
pub use balance::{BalanceList, BalanceService, MethodBalance};
pub use ledger::LedgerService;
pub use payment_method::{PaymentMethodService, PaymentMethodUpdate};
pub use reconciliation::{
    ReconcileAllSummary, ReconcileFailure, ReconciliationReport, ReconciliationService,
};

use tracing::warn;

use crate::audit::AuditEntry;
use crate::error::{TallyError, TallyResult};
use crate::models::{Actor, ActorId, PaymentMethod, PaymentMethodId};
use crate::storage::LedgerStore;

/// Append audit records for a change that has already been committed
///
/// A failed audit write cannot undo the commit, so it is reported and
/// swallowed.
pub(crate) fn record_audit<S: LedgerStore + ?Sized>(store: &S, entries: &[AuditEntry]) {
    if let Err(e) = store.audit(entries) {
        let first = entries.first();
        warn!(
            error = %e,
            records = entries.len(),
            entity_type = %first.map(|a| a.entity_type.to_string()).unwrap_or_default(),
            entity_id = %first.map(|a| a.entity_id.as_str()).unwrap_or_default(),
            "failed to write audit records"
        );
    }
}

/// Look up a payment method that must exist
pub(crate) fn require_method<S: LedgerStore + ?Sized>(
    store: &S,
    id: PaymentMethodId,
) -> TallyResult<PaymentMethod> {
    store
        .get_payment_method(id)?
        .ok_or_else(|| TallyError::account_not_found(id.to_string()))
}

/// Look up a payment method that must exist and still be in use
pub(crate) fn require_active_method<S: LedgerStore + ?Sized>(
    store: &S,
    id: PaymentMethodId,
) -> TallyResult<PaymentMethod> {
    let method = require_method(store, id)?;
    if method.is_deleted() {
        return Err(TallyError::Validation(format!(
            "Payment method '{}' is retired",
            method.name
        )));
    }
    Ok(method)
}

pub(crate) fn require_actor<S: LedgerStore + ?Sized>(store: &S, id: ActorId) -> TallyResult<Actor> {
    store
        .get_actor(id)?
        .ok_or_else(|| TallyError::actor_not_found(id.to_string()))
}
