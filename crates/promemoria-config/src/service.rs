//! Validated service configuration

use crate::schema::{
    RawConfig, RawNotificationConfig, RawOutputConfig, RawSchedulingConfig, RawServiceConfig,
};
use promemoria_util::{default_data_dir, default_socket_path, STORE_FILENAME};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default vibration waveform, alternating off/on segments in milliseconds
pub const DEFAULT_VIBRATION_PATTERN_MS: [u64; 7] = [0, 800, 400, 800, 400, 800, 1000];

pub const DEFAULT_APP_NAME: &str = "Promemoria";
pub const DEFAULT_TITLE: &str = "Promemoria";
pub const DEFAULT_SOUNDS_DIR: &str = "/usr/share/promemoria/sounds";
pub const DEFAULT_INEXACT_WINDOW: Duration = Duration::from_secs(60);

/// Validated configuration ready for use by the service
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub service: ServicePaths,
    pub scheduling: SchedulingConfig,
    pub notifications: NotificationConfig,
    pub output: OutputConfig,
}

impl ServiceConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServicePaths::from_raw(raw.service),
            scheduling: SchedulingConfig::from_raw(raw.scheduling),
            notifications: NotificationConfig::from_raw(raw.notifications),
            output: OutputConfig::from_raw(raw.output),
        }
    }
}

/// Filesystem locations
#[derive(Debug, Clone)]
pub struct ServicePaths {
    pub socket_path: PathBuf,
    pub data_dir: PathBuf,
    pub store_path: PathBuf,
}

impl ServicePaths {
    fn from_raw(raw: RawServiceConfig) -> Self {
        let data_dir = raw
            .data_dir
            .map(|p| expand_home(&p))
            .unwrap_or_else(default_data_dir);
        let store_path = raw
            .store_path
            .map(|p| expand_home(&p))
            .unwrap_or_else(|| data_dir.join(STORE_FILENAME));

        Self {
            socket_path: raw
                .socket_path
                .map(|p| expand_home(&p))
                .unwrap_or_else(default_socket_path),
            data_dir,
            store_path,
        }
    }
}

impl Default for ServicePaths {
    fn default() -> Self {
        Self::from_raw(RawServiceConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub allow_exact: bool,
    pub inexact_window: Duration,
}

impl SchedulingConfig {
    fn from_raw(raw: RawSchedulingConfig) -> Self {
        Self {
            allow_exact: raw.allow_exact.unwrap_or(true),
            inexact_window: raw
                .inexact_window_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_INEXACT_WINDOW),
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self::from_raw(RawSchedulingConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub app_name: String,
    pub default_title: String,
}

impl NotificationConfig {
    fn from_raw(raw: RawNotificationConfig) -> Self {
        Self {
            enabled: raw.enabled.unwrap_or(true),
            app_name: raw.app_name.unwrap_or_else(|| DEFAULT_APP_NAME.into()),
            default_title: raw.default_title.unwrap_or_else(|| DEFAULT_TITLE.into()),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self::from_raw(RawNotificationConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub sounds_dir: PathBuf,
    pub player: Option<String>,
    pub vibration_pattern: Vec<Duration>,
}

impl OutputConfig {
    fn from_raw(raw: RawOutputConfig) -> Self {
        let pattern_ms = raw
            .vibration_pattern_ms
            .unwrap_or_else(|| DEFAULT_VIBRATION_PATTERN_MS.to_vec());

        Self {
            sounds_dir: raw
                .sounds_dir
                .map(|p| expand_home(&p))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOUNDS_DIR)),
            player: raw.player,
            vibration_pattern: pattern_ms.into_iter().map(Duration::from_millis).collect(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_raw(RawOutputConfig::default())
    }
}

/// Expand a leading `~/` using `$HOME`
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var("HOME")) {
        (Ok(rest), Ok(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}
