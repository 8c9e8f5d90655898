//! Host capabilities model

use serde::{Deserialize, Serialize};

/// Describes what a host adapter can do
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostCapabilities {
    /// Can fire a wake at the exact requested instant
    pub exact_wakes: bool,

    /// Can show notifications at all
    pub notifications: bool,

    /// Notifications can carry action buttons that call back into the core
    pub actionable_notifications: bool,

    /// Can play a looped alarm tone
    pub audio_output: bool,

    /// Has a vibration motor
    pub vibration: bool,
}

impl HostCapabilities {
    /// Create minimal capabilities (inexact wakes only, no output)
    pub fn minimal() -> Self {
        Self {
            exact_wakes: false,
            notifications: false,
            actionable_notifications: false,
            audio_output: false,
            vibration: false,
        }
    }

    /// Capabilities of a typical Linux desktop session
    pub fn linux_desktop() -> Self {
        Self {
            exact_wakes: true,
            notifications: true,
            actionable_notifications: true,
            audio_output: true,
            vibration: false,
        }
    }

    /// Everything supported (handheld devices, mocks)
    pub fn full() -> Self {
        Self {
            vibration: true,
            ..Self::linux_desktop()
        }
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::minimal()
    }
}
