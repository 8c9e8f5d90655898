//! Strongly-typed identifiers for promemoria

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix the host application uses for synthetic test reminders
pub const EPHEMERAL_ID_PREFIX: &str = "test-";

/// Size of the alert handle space: handles live in `[0, HANDLE_SPACE)`
pub const HANDLE_SPACE: u32 = 1_000_000;

/// Identifier of a reminder in the externally-owned store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReminderId(String);

impl ReminderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids the store never knows about: empty ids and `test-` markers.
    /// They always read back as present and not completed.
    pub fn is_ephemeral(&self) -> bool {
        self.0.is_empty() || self.0.starts_with(EPHEMERAL_ID_PREFIX)
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ReminderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ReminderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Compact integer key for the scheduler, the notification surface and
/// the alarm output session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AlertHandle(u32);

impl AlertHandle {
    /// Returns `None` outside the handle space
    pub fn new(value: u32) -> Option<Self> {
        (value < HANDLE_SPACE).then_some(Self(value))
    }

    /// Derive the handle for a reminder id.
    ///
    /// This is the 31-multiplier string hash over UTF-16 code units (the
    /// same value the host application computes for its own notification
    /// ids), folded into the handle space as `abs(hash) mod 1_000_000`.
    /// No seeding, so the result is stable across restarts.
    pub fn derive(id: &ReminderId) -> Self {
        let hash = id
            .as_str()
            .encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));
        Self(hash.unsigned_abs() % HANDLE_SPACE)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// The next handle in the space, wrapping at the end
    pub fn next(&self) -> Self {
        Self((self.0 + 1) % HANDLE_SPACE)
    }
}

impl TryFrom<u32> for AlertHandle {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("alert handle {value} out of range"))
    }
}

impl From<AlertHandle> for u32 {
    fn from(handle: AlertHandle) -> Self {
        handle.0
    }
}

impl fmt::Display for AlertHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an alarm output session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a connected IPC client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
