//! Audit logging system for SplitLedger
//!
//! Records every created user, group and expense in an append-only audit log.
//!
//! # Architecture
//!
//! - `AuditEntry`: a single audit log entry with timestamp, operation, entity
//!   information and a JSON snapshot of the stored entity.
//! - `AuditLogger`: writes entries to the audit log file using line-delimited
//!   JSON (JSONL).

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
