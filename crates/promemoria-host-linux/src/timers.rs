//! One-shot wake and auto-stop timers on the tokio runtime

use chrono::{DateTime, Local};
use promemoria_api::WakePrecision;
use promemoria_host_api::{HostEvent, WakeToken};
use promemoria_util::{AlertHandle, SessionId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Longest single sleep while waiting for a wall-clock trigger. The clock is
/// re-read after every chunk so suspend and clock changes are picked up.
pub const MAX_SLEEP_CHUNK: Duration = Duration::from_secs(30);

/// Round `at` up to the next multiple of `window` since the epoch, so
/// inexact wakes close together fire together.
pub fn inexact_fire_time(at: DateTime<Local>, window: Duration) -> DateTime<Local> {
    let window_ms = window.as_millis() as i64;
    if window_ms <= 0 {
        return at;
    }

    let millis = at.timestamp_millis();
    let aligned = millis.div_euclid(window_ms) * window_ms;
    let aligned = if aligned < millis {
        aligned + window_ms
    } else {
        aligned
    };

    promemoria_util::from_epoch_millis(aligned).unwrap_or(at)
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Timer tasks keyed by handle and by session
pub struct Timers {
    runtime: Handle,
    event_tx: mpsc::UnboundedSender<HostEvent>,
    inexact_window: Duration,
    wakes: Mutex<HashMap<AlertHandle, JoinHandle<()>>>,
    auto_stops: Mutex<HashMap<SessionId, JoinHandle<()>>>,
}

impl Timers {
    pub fn new(
        runtime: Handle,
        event_tx: mpsc::UnboundedSender<HostEvent>,
        inexact_window: Duration,
    ) -> Self {
        Self {
            runtime,
            event_tx,
            inexact_window,
            wakes: Mutex::new(HashMap::new()),
            auto_stops: Mutex::new(HashMap::new()),
        }
    }

    /// Arm a wake, aborting whatever was armed for the same handle
    pub fn arm_wake(&self, token: WakeToken, at: DateTime<Local>, precision: WakePrecision) {
        let fire_at = match precision {
            WakePrecision::Exact => at,
            WakePrecision::Inexact => inexact_fire_time(at, self.inexact_window),
        };

        let tx = self.event_tx.clone();
        let task = self.runtime.spawn(async move {
            loop {
                let remaining = promemoria_util::duration_until(&fire_at, &promemoria_util::now());
                if remaining.is_zero() {
                    break;
                }
                tokio::time::sleep(remaining.min(MAX_SLEEP_CHUNK)).await;
            }
            let _ = tx.send(HostEvent::WakeFired(token));
        });

        let mut wakes = locked(&self.wakes);
        wakes.retain(|_, task| !task.is_finished());
        if let Some(previous) = wakes.insert(token.handle, task) {
            previous.abort();
        }

        debug!(
            handle = %token.handle,
            generation = token.generation,
            fire_at = %promemoria_util::format_datetime_full(&fire_at),
            ?precision,
            "Wake timer armed"
        );
    }

    pub fn disarm_wake(&self, handle: AlertHandle) {
        if let Some(task) = locked(&self.wakes).remove(&handle) {
            task.abort();
            debug!(handle = %handle, "Wake timer disarmed");
        }
    }

    /// Auto-stop runs on monotonic time
    pub fn arm_auto_stop(&self, session_id: &SessionId, after: Duration) {
        let tx = self.event_tx.clone();
        let id = session_id.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(HostEvent::AutoStopElapsed(id));
        });

        if let Some(previous) = locked(&self.auto_stops).insert(session_id.clone(), task) {
            previous.abort();
        }
    }

    pub fn disarm_auto_stop(&self, session_id: &SessionId) {
        if let Some(task) = locked(&self.auto_stops).remove(session_id) {
            task.abort();
        }
    }

    /// Abort everything (service shutdown)
    pub fn abort_all(&self) {
        for (_, task) in locked(&self.wakes).drain() {
            task.abort();
        }
        for (_, task) in locked(&self.auto_stops).drain() {
            task.abort();
        }
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.abort_all();
    }
}
