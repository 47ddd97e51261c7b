//! Audit log CLI command

use crate::error::TallyResult;
use crate::storage::Storage;

/// Print the most recent audit records, oldest first
pub fn handle_audit_command(storage: &Storage, limit: usize) -> TallyResult<()> {
    let entries = storage.audit_logger().read_recent(limit)?;
    if entries.is_empty() {
        println!("Audit log is empty.");
        return Ok(());
    }

    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
