//! Linux host adapter implementation

use chrono::{DateTime, Local};
use promemoria_api::{Ringtone, WakePrecision};
use promemoria_host_api::{
    HostAdapter, HostCapabilities, HostError, HostEvent, HostResult, SurfaceSpec, WakeToken,
};
use promemoria_util::{AlertHandle, SessionId};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::audio::AudioOutput;
use crate::notify::Notifier;
use crate::timers::Timers;

/// Settings the adapter needs from the service configuration
#[derive(Debug, Clone)]
pub struct LinuxHostOptions {
    /// When false, exact wakes are refused so callers fall back to inexact
    pub allow_exact: bool,
    pub inexact_window: Duration,
    pub notifications_enabled: bool,
    pub app_name: String,
    pub sounds_dir: PathBuf,
    pub player: Option<String>,
}

impl Default for LinuxHostOptions {
    fn default() -> Self {
        Self {
            allow_exact: true,
            inexact_window: Duration::from_secs(60),
            notifications_enabled: true,
            app_name: "Promemoria".into(),
            sounds_dir: PathBuf::from("/usr/share/promemoria/sounds"),
            player: None,
        }
    }
}

/// Linux host adapter
pub struct LinuxHost {
    capabilities: HostCapabilities,
    allow_exact: bool,
    timers: Timers,
    notifier: Notifier,
    audio: AudioOutput,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<HostEvent>>>,
}

impl LinuxHost {
    /// Must be called from within a tokio runtime; timers run on it.
    pub fn new(options: LinuxHostOptions) -> HostResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| HostError::Internal(format!("No tokio runtime: {}", e)))?;
        let (tx, rx) = mpsc::unbounded_channel();

        let timers = Timers::new(runtime, tx.clone(), options.inexact_window);
        let notifier = Notifier::new(options.app_name, options.notifications_enabled, tx);
        let audio = AudioOutput::new(options.player, options.sounds_dir);

        let capabilities = HostCapabilities {
            exact_wakes: options.allow_exact,
            notifications: notifier.is_available(),
            actionable_notifications: notifier.is_available(),
            audio_output: audio.is_available(),
            vibration: false,
        };

        info!(capabilities = ?capabilities, "Linux host adapter ready");

        Ok(Self {
            capabilities,
            allow_exact: options.allow_exact,
            timers,
            notifier,
            audio,
            event_rx: Mutex::new(Some(rx)),
        })
    }

    /// Tear down timers, surfaces, and the audio channel
    pub fn shutdown(&self) {
        self.timers.abort_all();
        self.notifier.cancel_all();
        if let Err(e) = self.audio.stop() {
            warn!(error = %e, "Failed to stop audio on shutdown");
        }
    }
}

impl HostAdapter for LinuxHost {
    fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }

    fn arm_wake(
        &self,
        token: WakeToken,
        at: DateTime<Local>,
        precision: WakePrecision,
    ) -> HostResult<()> {
        if precision == WakePrecision::Exact && !self.allow_exact {
            return Err(HostError::ExactWakeDenied(
                "exact wakes disabled by configuration".into(),
            ));
        }

        self.timers.arm_wake(token, at, precision);
        Ok(())
    }

    fn disarm_wake(&self, handle: AlertHandle) -> HostResult<()> {
        self.timers.disarm_wake(handle);
        Ok(())
    }

    fn arm_auto_stop(&self, session_id: &SessionId, after: Duration) -> HostResult<()> {
        self.timers.arm_auto_stop(session_id, after);
        Ok(())
    }

    fn disarm_auto_stop(&self, session_id: &SessionId) -> HostResult<()> {
        self.timers.disarm_auto_stop(session_id);
        Ok(())
    }

    fn post_surface(&self, spec: &SurfaceSpec) -> HostResult<()> {
        self.notifier.post(spec)
    }

    fn cancel_surface(&self, handle: AlertHandle) -> HostResult<()> {
        self.notifier.cancel(handle);
        Ok(())
    }

    fn start_audio(&self, ringtone: Ringtone) -> HostResult<()> {
        self.audio.start(ringtone)
    }

    fn stop_audio(&self) -> HostResult<()> {
        self.audio.stop()
    }

    fn start_vibration(&self, _pattern: &[Duration]) -> HostResult<()> {
        Err(HostError::Unavailable("no vibration motor".into()))
    }

    fn stop_vibration(&self) -> HostResult<()> {
        debug!("No vibration to stop");
        Ok(())
    }

    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<HostEvent>> {
        self.event_rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

impl Drop for LinuxHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}
