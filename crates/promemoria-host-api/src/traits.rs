//! Host adapter traits

use chrono::{DateTime, Local};
use promemoria_api::{ActionRequest, Ringtone, WakePrecision};
use promemoria_util::{AlertHandle, ReminderId, SessionId};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{HostCapabilities, SurfaceSpec};

/// Errors from host adapter operations
#[derive(Debug, Error)]
pub enum HostError {
    /// The platform refused an exact wake; an inexact one may still work
    #[error("Exact wake denied: {0}")]
    ExactWakeDenied(String),

    /// The facility does not exist on this host
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The facility exists but failed
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Identifies one arming of a wake. The generation changes every time the
/// handle is re-armed, so a firing that raced a reschedule can be told
/// apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakeToken {
    pub handle: AlertHandle,
    pub generation: u64,
}

/// Events from the host adapter
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// A one-shot wake reached its trigger time
    WakeFired(WakeToken),

    /// The auto-stop timer of an alarm session elapsed
    AutoStopElapsed(SessionId),

    /// A surface button was pressed
    ActionInvoked(ActionRequest),

    /// The surface body was tapped
    SurfaceTapped {
        handle: AlertHandle,
        reminder_id: ReminderId,
    },
}

/// Host adapter trait - implemented by platform-specific adapters.
///
/// Methods are synchronous: when one returns, the effect (in particular a
/// cancellation) is already in place. Long-running work such as timers and
/// players is owned by the adapter and reported through [`HostEvent`]s.
pub trait HostAdapter: Send + Sync {
    /// Get the capabilities of this host adapter
    fn capabilities(&self) -> &HostCapabilities;

    /// Arm a one-shot wake, replacing any wake armed for the same handle
    fn arm_wake(
        &self,
        token: WakeToken,
        at: DateTime<Local>,
        precision: WakePrecision,
    ) -> HostResult<()>;

    /// Disarm the wake for a handle. Disarming nothing is not an error.
    fn disarm_wake(&self, handle: AlertHandle) -> HostResult<()>;

    /// Arm the auto-stop timer for an alarm session
    fn arm_auto_stop(&self, session_id: &SessionId, after: Duration) -> HostResult<()>;

    fn disarm_auto_stop(&self, session_id: &SessionId) -> HostResult<()>;

    /// Show (or replace) the surface for `spec.handle`
    fn post_surface(&self, spec: &SurfaceSpec) -> HostResult<()>;

    /// Remove the surface for a handle. Idempotent.
    fn cancel_surface(&self, handle: AlertHandle) -> HostResult<()>;

    /// Start the looped alarm tone
    fn start_audio(&self, ringtone: Ringtone) -> HostResult<()>;

    /// Release the audio channel. Idempotent.
    fn stop_audio(&self) -> HostResult<()>;

    /// Start a repeating vibration waveform (alternating off/on segments)
    fn start_vibration(&self, pattern: &[Duration]) -> HostResult<()>;

    /// Cancel vibration. Idempotent.
    fn stop_vibration(&self) -> HostResult<()>;

    /// Take the host event receiver. Returns `None` after the first call.
    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<HostEvent>>;

    /// Optional: check if the host adapter is healthy
    fn is_healthy(&self) -> bool {
        true
    }
}
