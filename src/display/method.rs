//! Payment method and balance display formatting

use crate::config::settings::Settings;
use crate::models::PaymentMethod;
use crate::services::BalanceList;

/// Format payment methods as a table
pub fn format_method_list(methods: &[PaymentMethod]) -> String {
    if methods.is_empty() {
        return "No payment methods found.\n".to_string();
    }

    let name_width = methods
        .iter()
        .map(|m| m.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<11}  {}\n",
        "Name",
        "ID",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<11}  {:-<8}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for method in methods {
        output.push_str(&format!(
            "{:<name_width$}  {:<11}  {}\n",
            method.name,
            method.id.to_string(),
            if method.is_deleted() { "Retired" } else { "Active" },
            name_width = name_width,
        ));
    }

    output
}

/// Format cached balances with a total row
pub fn format_balance_list(list: &BalanceList, settings: &Settings) -> String {
    if list.rows.is_empty() {
        return "No payment methods found.\n".to_string();
    }

    let name_width = list
        .rows
        .iter()
        .map(|r| r.payment_method.to_string().chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    let amounts: Vec<String> = list
        .rows
        .iter()
        .map(|r| settings.format_money(r.balance.balance))
        .collect();
    let total = settings.format_money(list.total);
    let amount_width = amounts
        .iter()
        .chain(std::iter::once(&total))
        .map(|a| a.chars().count())
        .max()
        .unwrap_or(7)
        .max(7);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>amount_width$}\n",
        "Payment Method",
        "Balance",
        name_width = name_width.max(14),
        amount_width = amount_width,
    ));
    let separator = format!(
        "{:-<name_width$}  {:->amount_width$}\n",
        "",
        "",
        name_width = name_width.max(14),
        amount_width = amount_width,
    );
    output.push_str(&separator);

    for (row, amount) in list.rows.iter().zip(&amounts) {
        output.push_str(&format!(
            "{:<name_width$}  {:>amount_width$}\n",
            row.payment_method.to_string(),
            amount,
            name_width = name_width.max(14),
            amount_width = amount_width,
        ));
    }

    output.push_str(&separator);
    output.push_str(&format!(
        "{:<name_width$}  {:>amount_width$}\n",
        "TOTAL",
        total,
        name_width = name_width.max(14),
        amount_width = amount_width,
    ));

    output
}
