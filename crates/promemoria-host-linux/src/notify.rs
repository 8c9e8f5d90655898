//! Desktop notifications through `notify-send`.
//!
//! Each visible surface is one `notify-send --wait` process. It prints the
//! server-side notification id, then the key of whichever action the user
//! picked; a reader thread turns that into a [`HostEvent`].

use promemoria_api::{AlertAction, SurfaceStyle};
use promemoria_host_api::{HostError, HostEvent, HostResult, SurfaceSpec};
use promemoria_util::AlertHandle;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::process::{find_executable, ManagedProcess};

const NOTIFY_SEND: &str = "notify-send";
const GDBUS: &str = "gdbus";

/// Action key servers use for clicks on the notification body
const DEFAULT_ACTION_KEY: &str = "default";

fn action_key(action: AlertAction) -> &'static str {
    match action {
        AlertAction::Start => "start",
        AlertAction::Stop => "stop",
        AlertAction::Snooze => "snooze",
        AlertAction::Complete => "complete",
    }
}

/// Build the `notify-send` command line for a surface
pub fn notify_send_argv(app_name: &str, spec: &SurfaceSpec) -> Vec<String> {
    let mut argv = vec![
        NOTIFY_SEND.to_string(),
        format!("--app-name={}", app_name),
        "--print-id".to_string(),
        "--wait".to_string(),
    ];

    let urgency = match spec.style {
        SurfaceStyle::Alarm => "critical",
        SurfaceStyle::Reminder if spec.persistent => "critical",
        SurfaceStyle::Reminder => "normal",
    };
    argv.push(format!("--urgency={}", urgency));

    if spec.persistent {
        argv.push("--expire-time=0".to_string());
    }

    if spec.style == SurfaceStyle::Alarm {
        argv.push("--category=alarm".to_string());
    }

    for button in &spec.actions {
        argv.push(format!(
            "--action={}={}",
            action_key(button.request.action),
            button.label
        ));
    }

    if spec.open_on_tap {
        argv.push(format!("--action={}=Open", DEFAULT_ACTION_KEY));
    }

    argv.push(spec.title.clone());
    argv.push(spec.body.clone());
    argv
}

/// Map a line printed by `notify-send` back to a host event
pub fn event_for_output(line: &str, spec: &SurfaceSpec) -> Option<HostEvent> {
    let key = line.trim();

    if key == DEFAULT_ACTION_KEY && spec.open_on_tap {
        return Some(HostEvent::SurfaceTapped {
            handle: spec.handle,
            reminder_id: spec.reminder_id.clone(),
        });
    }

    spec.actions
        .iter()
        .find(|button| action_key(button.request.action) == key)
        .map(|button| HostEvent::ActionInvoked(button.request.clone()))
}

struct PostedSurface {
    process: ManagedProcess,
    server_id: Arc<Mutex<Option<u32>>>,
    generation: u64,
}

type SurfaceMap = Arc<Mutex<HashMap<AlertHandle, PostedSurface>>>;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Notification surfaces keyed by alert handle
pub struct Notifier {
    app_name: String,
    enabled: bool,
    available: bool,
    surfaces: SurfaceMap,
    next_generation: AtomicU64,
    event_tx: mpsc::UnboundedSender<HostEvent>,
}

impl Notifier {
    pub fn new(
        app_name: impl Into<String>,
        enabled: bool,
        event_tx: mpsc::UnboundedSender<HostEvent>,
    ) -> Self {
        let available = find_executable(NOTIFY_SEND).is_some();
        if enabled && !available {
            warn!("notify-send not found; alerts cannot be shown");
        }

        Self {
            app_name: app_name.into(),
            enabled,
            available,
            surfaces: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(1),
            event_tx,
        }
    }

    pub fn is_available(&self) -> bool {
        self.enabled && self.available
    }

    pub fn post(&self, spec: &SurfaceSpec) -> HostResult<()> {
        if !self.enabled {
            return Err(HostError::Unavailable("notifications disabled".into()));
        }
        if !self.available {
            return Err(HostError::Unavailable("notify-send not installed".into()));
        }

        // One surface per handle
        self.cancel(spec.handle);

        let argv = notify_send_argv(&self.app_name, spec);
        let mut process = ManagedProcess::spawn(&argv, true)?;
        let stdout = process
            .take_stdout()
            .ok_or_else(|| HostError::Internal("notify-send stdout not captured".into()))?;

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let server_id = Arc::new(Mutex::new(None));

        locked(&self.surfaces).insert(
            spec.handle,
            PostedSurface {
                process,
                server_id: server_id.clone(),
                generation,
            },
        );

        let handle = spec.handle;
        let surfaces = self.surfaces.clone();
        let event_tx = self.event_tx.clone();
        let spec = spec.clone();
        std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };

                let mut id = locked(&server_id);
                if id.is_none() {
                    if let Ok(parsed) = line.trim().parse::<u32>() {
                        *id = Some(parsed);
                        continue;
                    }
                }
                drop(id);

                if let Some(event) = event_for_output(&line, &spec) {
                    debug!(handle = %spec.handle, output = %line.trim(), "Notification interaction");
                    let _ = event_tx.send(event);
                }
            }

            // notify-send exits once the notification is closed or acted on
            let finished = {
                let mut surfaces = locked(&surfaces);
                match surfaces.get(&spec.handle) {
                    Some(posted) if posted.generation == generation => surfaces.remove(&spec.handle),
                    _ => None,
                }
            };
            if let Some(mut posted) = finished {
                let _ = posted.process.child.wait();
            }
        });

        info!(handle = %handle, generation, "Notification posted");
        Ok(())
    }

    /// Remove the surface for a handle, if any
    pub fn cancel(&self, handle: AlertHandle) {
        let Some(posted) = locked(&self.surfaces).remove(&handle) else {
            return;
        };

        if let Some(id) = *locked(&posted.server_id) {
            close_notification(id);
        }

        if let Err(e) = posted.process.shutdown() {
            warn!(handle = %handle, error = %e, "Failed to stop notify-send");
        }
        debug!(handle = %handle, "Notification cancelled");
    }

    pub fn cancel_all(&self) {
        let handles: Vec<AlertHandle> = locked(&self.surfaces).keys().copied().collect();
        for handle in handles {
            self.cancel(handle);
        }
    }
}

fn close_argv(id: u32) -> Vec<String> {
    [
        GDBUS,
        "call",
        "--session",
        "--dest",
        "org.freedesktop.Notifications",
        "--object-path",
        "/org/freedesktop/Notifications",
        "--method",
        "org.freedesktop.Notifications.CloseNotification",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .chain(std::iter::once(id.to_string()))
    .collect()
}

/// Ask the notification server to close a notification by id.
/// Returns once gdbus is spawned; the reply is reaped off-thread.
fn close_notification(id: u32) {
    if find_executable(GDBUS).is_none() {
        return;
    }

    match ManagedProcess::spawn(&close_argv(id), false) {
        Ok(mut process) => {
            std::thread::spawn(move || {
                let _ = process.child.wait();
            });
        }
        Err(e) => debug!(id, error = %e, "CloseNotification failed"),
    }
}
