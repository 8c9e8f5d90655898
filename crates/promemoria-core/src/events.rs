//! Core events emitted by the engine

use chrono::{DateTime, Local};
use promemoria_api::{
    AlertKind, EventPayload, StopReason, SuppressReason, SurfaceStyle, WakePrecision,
};
use promemoria_util::{AlertHandle, ReminderId, SessionId};
use std::time::Duration;

/// Events emitted by the alert engine
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    WakeScheduled {
        handle: AlertHandle,
        reminder_id: ReminderId,
        trigger_at: DateTime<Local>,
        kind: AlertKind,
        precision: WakePrecision,
    },

    WakeCancelled {
        handle: AlertHandle,
    },

    SurfacePosted {
        handle: AlertHandle,
        reminder_id: ReminderId,
        title: String,
        body: String,
        style: SurfaceStyle,
    },

    SurfaceCancelled {
        handle: AlertHandle,
    },

    /// A wake fired for a reminder that is gone or already done
    AlertSuppressed {
        handle: AlertHandle,
        reminder_id: ReminderId,
        reason: SuppressReason,
    },

    AlarmStarted {
        session_id: SessionId,
        handle: AlertHandle,
        reminder_id: ReminderId,
        audio: bool,
        vibration: bool,
    },

    AlarmStopped {
        session_id: SessionId,
        handle: AlertHandle,
        reason: StopReason,
        duration: Duration,
    },

    Snoozed {
        handle: AlertHandle,
        reminder_id: ReminderId,
        until: DateTime<Local>,
    },

    Completed {
        handle: AlertHandle,
        reminder_id: ReminderId,
    },

    /// The host application should come to the foreground
    OpenRequested {
        reminder_id: ReminderId,
    },
}

impl CoreEvent {
    /// The handle the event concerns, if any
    pub fn handle(&self) -> Option<AlertHandle> {
        match self {
            CoreEvent::WakeScheduled { handle, .. }
            | CoreEvent::WakeCancelled { handle }
            | CoreEvent::SurfacePosted { handle, .. }
            | CoreEvent::SurfaceCancelled { handle }
            | CoreEvent::AlertSuppressed { handle, .. }
            | CoreEvent::AlarmStarted { handle, .. }
            | CoreEvent::AlarmStopped { handle, .. }
            | CoreEvent::Snoozed { handle, .. }
            | CoreEvent::Completed { handle, .. } => Some(*handle),
            CoreEvent::OpenRequested { .. } => None,
        }
    }

    pub fn into_payload(self) -> EventPayload {
        match self {
            CoreEvent::WakeScheduled {
                handle,
                reminder_id,
                trigger_at,
                kind,
                precision,
            } => EventPayload::WakeScheduled {
                handle,
                reminder_id,
                trigger_at,
                kind,
                precision,
            },
            CoreEvent::WakeCancelled { handle } => EventPayload::WakeCancelled { handle },
            CoreEvent::SurfacePosted {
                handle,
                reminder_id,
                title,
                body,
                style,
            } => EventPayload::SurfacePosted {
                handle,
                reminder_id,
                title,
                body,
                style,
            },
            CoreEvent::SurfaceCancelled { handle } => EventPayload::SurfaceCancelled { handle },
            CoreEvent::AlertSuppressed {
                handle,
                reminder_id,
                reason,
            } => EventPayload::AlertSuppressed {
                handle,
                reminder_id,
                reason,
            },
            CoreEvent::AlarmStarted {
                session_id,
                handle,
                reminder_id,
                audio,
                vibration,
            } => EventPayload::AlarmStarted {
                session_id,
                handle,
                reminder_id,
                audio,
                vibration,
            },
            CoreEvent::AlarmStopped {
                session_id,
                handle,
                reason,
                duration,
            } => EventPayload::AlarmStopped {
                session_id,
                handle,
                reason,
                duration,
            },
            CoreEvent::Snoozed {
                handle,
                reminder_id,
                until,
            } => EventPayload::Snoozed {
                handle,
                reminder_id,
                until,
            },
            CoreEvent::Completed {
                handle,
                reminder_id,
            } => EventPayload::Completed {
                handle,
                reminder_id,
            },
            CoreEvent::OpenRequested { reminder_id } => {
                EventPayload::OpenRequested { reminder_id }
            }
        }
    }
}
