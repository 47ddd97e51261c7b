//! Ledger entry display formatting

use std::collections::HashMap;

use crate::config::settings::Settings;
use crate::models::{Actor, ActorId, EntryKind, LedgerEntry, PaymentMethod, PaymentMethodId};

/// Payment method and actor names used to label entries
pub struct NameLookup {
    methods: HashMap<PaymentMethodId, String>,
    actors: HashMap<ActorId, String>,
}

impl NameLookup {
    pub fn new(methods: &[PaymentMethod], actors: &[Actor]) -> Self {
        Self {
            methods: methods.iter().map(|m| (m.id, m.name.clone())).collect(),
            actors: actors.iter().map(|a| (a.id, a.name.clone())).collect(),
        }
    }

    fn method(&self, id: PaymentMethodId) -> String {
        self.methods
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn actor(&self, id: ActorId) -> String {
        self.actors
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// "Cash", or "Cash -> Bank" for transfers
    fn accounts(&self, kind: &EntryKind) -> String {
        match kind.destination() {
            Some(destination) => format!(
                "{} -> {}",
                self.method(kind.source()),
                self.method(destination)
            ),
            None => self.method(kind.source()),
        }
    }
}

/// Format entries as a register
pub fn format_entry_register(
    entries: &[LedgerEntry],
    names: &NameLookup,
    settings: &Settings,
) -> String {
    if entries.is_empty() {
        return "No entries found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<16}  {:<8}  {:<24}  {:>14}  {}\n",
        "ID", "Date", "Kind", "Payment Method", "Amount", "Summary"
    ));
    output.push_str(&"-".repeat(92));
    output.push('\n');

    for entry in entries {
        output.push_str(&format!(
            "{:<12}  {:<16}  {:<8}  {:<24}  {:>14}  {}\n",
            entry.id.to_string(),
            entry.timestamp.format(&settings.date_format).to_string(),
            entry.kind.name(),
            truncate(&names.accounts(&entry.kind), 24),
            settings.format_money(entry.amount),
            entry.summary.as_deref().unwrap_or(""),
        ));
    }

    output
}

/// Format one entry's details
pub fn format_entry_details(
    entry: &LedgerEntry,
    names: &NameLookup,
    settings: &Settings,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Entry:   {}\n", entry.id));
    output.push_str(&format!("Kind:    {}\n", entry.kind.name()));
    match entry.kind.destination() {
        Some(destination) => {
            output.push_str(&format!("From:    {}\n", names.method(entry.kind.source())));
            output.push_str(&format!("To:      {}\n", names.method(destination)));
        }
        None => output.push_str(&format!("Method:  {}\n", names.method(entry.kind.source()))),
    }
    output.push_str(&format!("Amount:  {}\n", settings.format_money(entry.amount)));
    output.push_str(&format!("Actor:   {}\n", names.actor(entry.actor)));
    output.push_str(&format!(
        "Date:    {}\n",
        entry.timestamp.format(&settings.date_format)
    ));
    if let Some(summary) = &entry.summary {
        output.push_str(&format!("Summary: {}\n", summary));
    }

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
