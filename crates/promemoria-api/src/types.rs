//! Shared types for the promemoria API

use chrono::{DateTime, Local};
use promemoria_util::{AlertHandle, ReminderId, SessionId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which path scheduled a wake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Scheduled by the host application through `ScheduleAlert`
    Primary,
    /// Rescheduled by a Snooze action
    Snooze,
}

/// How precisely a wake was armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakePrecision {
    /// Fires at the requested instant, even while the device is idle
    Exact,
    /// Best-effort fallback when exact wakes are denied
    Inexact,
}

/// Actions routed from an alert surface back into the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    Start,
    Stop,
    Snooze,
    Complete,
}

/// Payload carried by every action button on a surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: AlertAction,
    pub handle: AlertHandle,
    pub reminder_id: ReminderId,
    pub title: String,
    pub body: String,
}

/// Alarm tone selected in the notification settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ringtone {
    /// The platform's default alarm tone
    Default,
    Chime,
    Beep,
    Gentle,
    Urgent,
    Alert,
    Silent,
}

impl Ringtone {
    /// Lenient lookup used for persisted settings: unknown names fall back
    /// to the platform default tone.
    pub fn from_name(name: &str) -> Self {
        match name {
            "chime" => Self::Chime,
            "beep" => Self::Beep,
            "gentle" => Self::Gentle,
            "urgent" => Self::Urgent,
            "alert" => Self::Alert,
            "silent" => Self::Silent,
            _ => Self::Default,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Chime => "chime",
            Self::Beep => "beep",
            Self::Gentle => "gentle",
            Self::Urgent => "urgent",
            Self::Alert => "alert",
            Self::Silent => "silent",
        }
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Silent)
    }
}

/// Alarm output state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmState {
    Idle,
    Starting,
    Looping,
    Stopping,
}

/// Why an alarm session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Stop, Complete, or Snooze pressed on the surface
    UserAction,
    /// Auto-stop deadline reached
    Timeout,
    /// Service shutting down
    Teardown,
    /// The reminder was cancelled, deleted, or completed underneath the session
    Reconciled,
}

/// Why a fired wake produced no alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    /// The reminder no longer exists in the store
    Absent,
    /// The reminder is already completed
    Completed,
}

/// Visual role of a posted surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceStyle {
    /// Persistent reminder notification
    Reminder,
    /// Full-screen, ongoing alarm notification
    Alarm,
}

/// A wake waiting to fire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledAlarmInfo {
    pub handle: AlertHandle,
    pub reminder_id: ReminderId,
    pub title: String,
    pub trigger_at: DateTime<Local>,
    pub kind: AlertKind,
    pub precision: WakePrecision,
}

/// The active alarm output session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmSessionInfo {
    pub session_id: SessionId,
    pub handle: AlertHandle,
    pub reminder_id: ReminderId,
    pub started_at: DateTime<Local>,
    pub time_remaining: Duration,
    /// Whether the looped audio channel was acquired
    pub audio_active: bool,
    /// Whether the vibration waveform is running
    pub vibration_active: bool,
}

/// Full service state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStateSnapshot {
    pub api_version: u32,
    pub pending_wakes: Vec<ScheduledAlarmInfo>,
    pub alarm_state: AlarmState,
    pub active_session: Option<AlarmSessionInfo>,
}

/// Role for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRole {
    /// The reminder application (same user or root): full access
    Owner,
    /// Read-only observer
    Observer,
}

impl ClientRole {
    pub fn can_schedule(&self) -> bool {
        matches!(self, ClientRole::Owner)
    }

    pub fn can_act(&self) -> bool {
        matches!(self, ClientRole::Owner)
    }
}

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub live: bool,
    pub host_adapter_ok: bool,
    pub store_ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ringtone_lookup_is_lenient() {
        assert_eq!(Ringtone::from_name("urgent"), Ringtone::Urgent);
        assert_eq!(Ringtone::from_name("silent"), Ringtone::Silent);
        assert_eq!(Ringtone::from_name("bagpipes"), Ringtone::Default);
        assert_eq!(Ringtone::from_name(Ringtone::Gentle.name()), Ringtone::Gentle);
    }

    #[test]
    fn action_request_serialization() {
        let request = ActionRequest {
            action: AlertAction::Snooze,
            handle: AlertHandle::new(3583).unwrap(),
            reminder_id: ReminderId::new("r1"),
            title: "Dentist".into(),
            body: "10:30".into(),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"action\":\"snooze\""));
        assert!(json.contains("\"handle\":3583"));

        let parsed: ActionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn client_roles() {
        assert!(ClientRole::Owner.can_schedule());
        assert!(!ClientRole::Observer.can_schedule());
        assert!(!ClientRole::Observer.can_act());
    }
}
