//! Error types for promemoria

use thiserror::Error;

use crate::AlertHandle;

/// Error taxonomy of the alert subsystem.
///
/// Only `MissingField` and `SchedulerUnavailable` ever cross the scheduling
/// contract. Everything else is absorbed where it happens and replaced by a
/// safe default (fallback schedule, degraded output, dropped surface).
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("exact wake denied for handle {handle}: {reason}")]
    SchedulingDenied { handle: AlertHandle, reason: String },

    #[error("notification surface unavailable: {0}")]
    NotificationSurfaceUnavailable(String),

    #[error("output driver error: {0}")]
    OutputDriverError(String),

    #[error("malformed persisted state under '{key}': {message}")]
    MalformedPersistedState { key: String, message: String },

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("scheduler unavailable")]
    SchedulerUnavailable,

    #[error("Store error: {0}")]
    StoreError(String),
}

impl AlertError {
    pub fn denied(handle: AlertHandle, reason: impl Into<String>) -> Self {
        Self::SchedulingDenied {
            handle,
            reason: reason.into(),
        }
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::NotificationSurfaceUnavailable(msg.into())
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::OutputDriverError(msg.into())
    }

    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPersistedState {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    /// Whether this error must be reported back to the caller of the
    /// scheduling contract
    pub fn is_contract_error(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::SchedulerUnavailable)
    }
}

pub type Result<T> = std::result::Result<T, AlertError>;
