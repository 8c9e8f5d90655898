//! Looped alarm tone playback
//!
//! Auto-detects a command-line player:
//! - PipeWire (`pw-play`)
//! - PulseAudio (`paplay`)
//! - ALSA (`aplay`)
//!
//! The tone is looped by a small shell loop running in its own process
//! group, so stopping the alarm is a single group signal.

use promemoria_api::Ringtone;
use promemoria_host_api::{HostError, HostResult};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::process::{find_executable, ManagedProcess};

/// Tone the freedesktop sound theme ships for alarms
const FREEDESKTOP_ALARM: &str = "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga";

const SOUND_EXTENSIONS: [&str; 3] = ["oga", "ogg", "wav"];

/// Detected playback backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerBackend {
    /// PipeWire
    PipeWire,
    /// PulseAudio
    PulseAudio,
    /// ALSA (direct)
    Alsa,
}

impl PlayerBackend {
    /// Detect the best available player
    pub fn detect() -> Option<Self> {
        for backend in [Self::PipeWire, Self::PulseAudio, Self::Alsa] {
            if find_executable(backend.binary()).is_some() {
                info!(player = backend.binary(), "Detected audio player");
                return Some(backend);
            }
        }

        warn!("No audio player detected");
        None
    }

    pub fn binary(&self) -> &'static str {
        match self {
            Self::PipeWire => "pw-play",
            Self::PulseAudio => "paplay",
            Self::Alsa => "aplay",
        }
    }
}

/// Resolve the sound file for a ringtone.
///
/// Looks in the user's data dir first, then in `sounds_dir`. The
/// platform default tone comes from the freedesktop theme.
pub fn resolve_sound(ringtone: Ringtone, sounds_dir: &Path) -> Option<PathBuf> {
    if ringtone.is_silent() {
        return None;
    }

    if ringtone == Ringtone::Default {
        let path = PathBuf::from(FREEDESKTOP_ALARM);
        return path.is_file().then_some(path);
    }

    let user_dir = dirs::data_dir().map(|d| d.join("promemoria").join("sounds"));
    let search: Vec<PathBuf> = user_dir
        .into_iter()
        .chain(std::iter::once(sounds_dir.to_path_buf()))
        .collect();

    search.iter().find_map(|dir| {
        SOUND_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", ringtone.name(), ext)))
            .find(|candidate| candidate.is_file())
    })
}

/// The `sh` loop that replays a file until killed
pub fn loop_argv(player: &str, sound: &Path) -> Vec<String> {
    vec![
        "sh".to_string(),
        "-c".to_string(),
        r#"while :; do "$0" "$1" || exit 1; done"#.to_string(),
        player.to_string(),
        sound.display().to_string(),
    ]
}

/// Single looped output channel
pub struct AudioOutput {
    player: Option<String>,
    sounds_dir: PathBuf,
    playing: Mutex<Option<ManagedProcess>>,
}

impl AudioOutput {
    /// `player` overrides detection when set
    pub fn new(player: Option<String>, sounds_dir: PathBuf) -> Self {
        let player = match player {
            Some(p) if find_executable(&p).is_some() => Some(p),
            Some(p) => {
                warn!(player = %p, "Configured player not found");
                None
            }
            None => PlayerBackend::detect().map(|b| b.binary().to_string()),
        };

        Self {
            player,
            sounds_dir,
            playing: Mutex::new(None),
        }
    }

    fn playing(&self) -> MutexGuard<'_, Option<ManagedProcess>> {
        self.playing.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_available(&self) -> bool {
        self.player.is_some()
    }

    pub fn start(&self, ringtone: Ringtone) -> HostResult<()> {
        let player = self
            .player
            .as_deref()
            .ok_or_else(|| HostError::Unavailable("no audio player".into()))?;

        let sound = resolve_sound(ringtone, &self.sounds_dir).ok_or_else(|| {
            HostError::Unavailable(format!("no sound file for ringtone '{}'", ringtone.name()))
        })?;

        // Replace whatever was playing
        self.stop()?;

        let process = ManagedProcess::spawn(&loop_argv(player, &sound), false)?;
        info!(
            pid = process.pid,
            ringtone = ringtone.name(),
            sound = %sound.display(),
            "Alarm audio started"
        );
        *self.playing() = Some(process);
        Ok(())
    }

    pub fn stop(&self) -> HostResult<()> {
        let Some(process) = self.playing().take() else {
            return Ok(());
        };

        debug!(pid = process.pid, "Stopping alarm audio");
        process.shutdown()
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
