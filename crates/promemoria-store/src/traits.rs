//! Store trait definitions

use crate::{AuditEvent, StoreResult};

/// Main store trait
///
/// The key-value half is owned by the reminder application; the service
/// only reads it (writes exist for tooling and tests). The audit half is
/// owned by the service.
pub trait Store: Send + Sync {
    // Key-value layout

    /// Raw value stored under `key`
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or replace the value under `key`
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
