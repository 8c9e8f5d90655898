//! Command types for the promemoria protocol

use promemoria_util::{AlertHandle, ClientId};
use serde::{Deserialize, Serialize};

use crate::{ActionRequest, ClientRole, API_VERSION};

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// The command
    pub command: Command,
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            command,
        }
    }
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Corresponding request ID
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// Response payload or error
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    MissingField,
    SchedulerUnavailable,
    PermissionDenied,
    InternalError,
}

/// All possible commands from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Schedule (or replace) the alert for a reminder.
    /// Missing `id`/`timestamp` are reported as errors, not parse failures.
    ScheduleAlert {
        #[serde(default)]
        id: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        body: String,
        /// Trigger time in epoch milliseconds
        #[serde(default)]
        timestamp: i64,
    },

    /// Cancel the wake and any visible surface for a reminder
    CancelAlert {
        #[serde(default)]
        id: String,
    },

    /// Show a notification immediately, bypassing the scheduler
    TestFire,

    /// Route a surface action into the core
    Action(ActionRequest),

    /// Get current service state
    GetState,

    /// Get health status
    GetHealth,

    /// Subscribe to events (returns immediately, events stream separately)
    SubscribeEvents,

    /// Ping for keepalive
    Ping,
}

impl Command {
    /// Whether the command changes alert state
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::ScheduleAlert { .. }
                | Command::CancelAlert { .. }
                | Command::TestFire
                | Command::Action(_)
        )
    }
}

/// Response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    Scheduled { handle: AlertHandle },
    Cancelled,
    TestFired { handle: AlertHandle },
    ActionAccepted,
    State(crate::ServiceStateSnapshot),
    Health(crate::HealthStatus),
    Subscribed { client_id: ClientId },
    Pong,
}

/// Client connection info (set by IPC layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: ClientId,
    pub role: ClientRole,
    /// Unix UID if available
    pub uid: Option<u32>,
}

impl ClientInfo {
    pub fn new(role: ClientRole) -> Self {
        Self {
            client_id: ClientId::new(),
            role,
            uid: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let req = Request::new(1, Command::GetState);
        let json = serde_json::to_string(&req).unwrap();
        let parsed: Request = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.request_id, 1);
        assert!(matches!(parsed.command, Command::GetState));
    }

    #[test]
    fn schedule_alert_tolerates_missing_fields() {
        let json = r#"{"request_id":7,"api_version":1,"command":{"type":"schedule_alert","title":"Dentist"}}"#;
        let parsed: Request = serde_json::from_str(json).unwrap();

        match parsed.command {
            Command::ScheduleAlert {
                id,
                title,
                body,
                timestamp,
            } => {
                assert!(id.is_empty());
                assert_eq!(title.as_deref(), Some("Dentist"));
                assert!(body.is_empty());
                assert_eq!(timestamp, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn mutating_commands() {
        assert!(Command::TestFire.is_mutating());
        assert!(Command::CancelAlert { id: "r1".into() }.is_mutating());
        assert!(!Command::GetState.is_mutating());
        assert!(!Command::SubscribeEvents.is_mutating());
    }

    #[test]
    fn response_serialization() {
        let resp = Response::success(
            1,
            ResponsePayload::Scheduled {
                handle: AlertHandle::new(3583).unwrap(),
            },
        );

        let json = serde_json::to_string(&resp).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.request_id, 1);
        assert!(matches!(
            parsed.result,
            ResponseResult::Ok(ResponsePayload::Scheduled { handle }) if handle.as_u32() == 3583
        ));
    }
}
