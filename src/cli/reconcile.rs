//! Reconciliation CLI command

use std::collections::HashMap;

use clap::Args;

use crate::config::settings::Settings;
use crate::display::{format_reconcile_all, format_reconciliation_report};
use crate::error::{TallyError, TallyResult};
use crate::services::{PaymentMethodService, ReconciliationService};
use crate::storage::Storage;

#[derive(Args)]
pub struct ReconcileArgs {
    /// Payment method name or ID
    pub method: Option<String>,
    /// Reconcile every active payment method
    #[arg(long, conflicts_with = "method")]
    pub all: bool,
    /// Only report drift, do not correct it
    #[arg(long, requires = "method")]
    pub check: bool,
}

pub fn handle_reconcile_command(
    storage: &Storage,
    settings: &Settings,
    args: ReconcileArgs,
) -> TallyResult<()> {
    let service = ReconciliationService::new(storage);
    let methods = PaymentMethodService::new(storage);

    if args.all {
        let summary = service.reconcile_all()?;
        let names: HashMap<_, _> = methods
            .list(true)?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();

        print!(
            "{}",
            format_reconcile_all(
                &summary,
                |report| names
                    .get(&report.payment_method)
                    .cloned()
                    .unwrap_or_else(|| report.payment_method.to_string()),
                settings,
            )
        );
        return Ok(());
    }

    let name = args.method.ok_or_else(|| {
        TallyError::Validation("Specify a payment method or --all".into())
    })?;
    let method = methods.resolve(&name)?;

    let report = if args.check {
        service.verify(method.id)?
    } else {
        service.reconcile(method.id)?
    };

    print!(
        "{}",
        format_reconciliation_report(&method.name, &report, settings)
    );
    if args.check && report.is_drifted() {
        println!("Run 'tally reconcile {}' to correct the cached balance.", method.name);
    }

    Ok(())
}
