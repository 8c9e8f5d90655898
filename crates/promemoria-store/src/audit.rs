//! Audit event types

use chrono::{DateTime, Local};
use promemoria_api::{AlertKind, StopReason, SuppressReason, WakePrecision};
use promemoria_util::{AlertHandle, ReminderId, SessionId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Service started
    ServiceStarted,

    /// Service stopped
    ServiceStopped,

    /// Wake armed for a reminder
    AlertScheduled {
        handle: AlertHandle,
        reminder_id: ReminderId,
        trigger_at: DateTime<Local>,
        kind: AlertKind,
        precision: WakePrecision,
    },

    /// Wake and surface removed through the scheduling contract
    AlertCancelled {
        handle: AlertHandle,
        reminder_id: ReminderId,
    },

    /// A wake fired and produced an alert
    AlertFired {
        handle: AlertHandle,
        reminder_id: ReminderId,
        kind: AlertKind,
        alarm_mode: bool,
    },

    /// A wake fired for a reminder that is gone or done
    AlertSuppressed {
        handle: AlertHandle,
        reminder_id: ReminderId,
        reason: SuppressReason,
    },

    /// Snooze action
    Snoozed {
        handle: AlertHandle,
        reminder_id: ReminderId,
        until: DateTime<Local>,
    },

    /// Complete action
    Completed {
        handle: AlertHandle,
        reminder_id: ReminderId,
    },

    /// Continuous alarm output started
    AlarmStarted {
        session_id: SessionId,
        handle: AlertHandle,
        degraded: bool,
    },

    /// Continuous alarm output released
    AlarmStopped {
        session_id: SessionId,
        handle: AlertHandle,
        reason: StopReason,
        duration: Duration,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: promemoria_util::now(),
            event,
        }
    }
}
