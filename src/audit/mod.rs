//! Audit logging for tally
//!
//! Every create, update and delete performed through the services is
//! appended to `audit.log` as one JSON object per line, with before/after
//! snapshots of the affected record.
//!
//! ```rust,ignore
//! use tally::audit::{AuditEntry, EntityType};
//!
//! let entry = AuditEntry::create(EntityType::Entry, entry.id.to_string(), None, &entry);
//! storage.audit_logger().append(&[entry])?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
