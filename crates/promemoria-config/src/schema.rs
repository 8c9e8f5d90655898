//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Paths used by the service
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Wake scheduling behaviour
    #[serde(default)]
    pub scheduling: RawSchedulingConfig,

    /// Notification surface settings
    #[serde(default)]
    pub notifications: RawNotificationConfig,

    /// Alarm output settings
    #[serde(default)]
    pub output: RawOutputConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawServiceConfig {
    /// IPC socket path
    pub socket_path: Option<PathBuf>,

    /// Data directory
    pub data_dir: Option<PathBuf>,

    /// Key-value store shared with the reminder application
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawSchedulingConfig {
    /// `false` forces every wake onto the inexact fallback path
    pub allow_exact: Option<bool>,

    /// Granularity of inexact wakes
    pub inexact_window_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawNotificationConfig {
    pub enabled: Option<bool>,

    /// Application name shown by the notification server
    pub app_name: Option<String>,

    /// Title used when a schedule request carries none
    pub default_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawOutputConfig {
    /// Directory holding `<ringtone>.oga`/`.wav` files
    pub sounds_dir: Option<PathBuf>,

    /// Player binary; auto-detected when unset
    pub player: Option<String>,

    /// Vibration waveform segments in milliseconds, alternating off/on
    pub vibration_pattern_ms: Option<Vec<u64>>,
}
