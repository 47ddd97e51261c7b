//! Reconciliation result formatting

use crate::config::settings::Settings;
use crate::services::{ReconcileAllSummary, ReconciliationReport};

/// Format one report; `name` labels the payment method
pub fn format_reconciliation_report(
    name: &str,
    report: &ReconciliationReport,
    settings: &Settings,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Payment method: {}\n", name));
    output.push_str(&format!(
        "  Cached balance:     {}\n",
        settings.format_money(report.previous)
    ));
    output.push_str(&format!(
        "  Recomputed balance: {}\n",
        settings.format_money(report.reconciled)
    ));
    output.push_str(&format!("  Entries replayed:   {}\n", report.entries_replayed));

    if report.is_drifted() {
        output.push_str(&format!(
            "  Drift:              {}\n",
            settings.format_money(report.drift())
        ));
    } else {
        output.push_str("  Drift:              none\n");
    }

    if report.has_non_leading_init() {
        output.push_str(&format!(
            "  Warning: an initial balance entry discarded {} earlier entries\n",
            report.superseded_by_init
        ));
    }

    output
}

/// Format the outcome of reconciling every payment method
///
/// `name_of` resolves a report's payment method to a display name.
pub fn format_reconcile_all(
    summary: &ReconcileAllSummary,
    name_of: impl Fn(&ReconciliationReport) -> String,
    settings: &Settings,
) -> String {
    let mut output = String::new();

    for report in &summary.reports {
        output.push_str(&format_reconciliation_report(&name_of(report), report, settings));
    }

    for failure in &summary.failures {
        output.push_str(&format!("Payment method: {}\n", failure.name));
        output.push_str(&format!("  Failed: {}\n", failure.error));
    }

    output.push_str(&format!(
        "\nReconciled {} payment method(s), {} corrected, {} failed\n",
        summary.reports.len(),
        summary.drifted().count(),
        summary.failures.len()
    ));

    output
}
