//! Event types for promemoriad -> client streaming

use chrono::{DateTime, Local};
use promemoria_util::{AlertHandle, ReminderId, SessionId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    AlertKind, ServiceStateSnapshot, StopReason, SuppressReason, SurfaceStyle, WakePrecision,
    API_VERSION,
};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: promemoria_util::now(),
            payload,
        }
    }
}

/// All possible events from the service to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Full state snapshot (sent on subscribe and after mutations)
    StateChanged(ServiceStateSnapshot),

    /// A wake was armed (or re-armed) for a handle
    WakeScheduled {
        handle: AlertHandle,
        reminder_id: ReminderId,
        trigger_at: DateTime<Local>,
        kind: AlertKind,
        precision: WakePrecision,
    },

    /// An outstanding wake was removed
    WakeCancelled { handle: AlertHandle },

    /// An alert surface is visible
    SurfacePosted {
        handle: AlertHandle,
        reminder_id: ReminderId,
        title: String,
        body: String,
        style: SurfaceStyle,
    },

    /// The surface for a handle was removed
    SurfaceCancelled { handle: AlertHandle },

    /// A wake fired but the reminder was gone or already done
    AlertSuppressed {
        handle: AlertHandle,
        reminder_id: ReminderId,
        reason: SuppressReason,
    },

    /// The continuous alarm output started
    AlarmStarted {
        session_id: SessionId,
        handle: AlertHandle,
        reminder_id: ReminderId,
        /// False when the audio channel could not be acquired (degraded)
        audio: bool,
        vibration: bool,
    },

    /// The continuous alarm output was released
    AlarmStopped {
        session_id: SessionId,
        handle: AlertHandle,
        reason: StopReason,
        duration: Duration,
    },

    /// The reminder was snoozed until the given time
    Snoozed {
        handle: AlertHandle,
        reminder_id: ReminderId,
        until: DateTime<Local>,
    },

    /// The Complete action was taken on a surface
    Completed {
        handle: AlertHandle,
        reminder_id: ReminderId,
    },

    /// The surface body was tapped; the host application should come forward
    OpenRequested { reminder_id: ReminderId },

    /// Service is shutting down
    Shutdown,
}
