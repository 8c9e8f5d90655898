//! One outstanding wake per handle, armed on the host

use chrono::{DateTime, Local};
use promemoria_api::{AlertKind, ScheduledAlarmInfo, WakePrecision};
use promemoria_host_api::{HostAdapter, HostError, WakeToken};
use promemoria_store::PersistedAlarm;
use promemoria_util::{AlertError, AlertHandle, ReminderId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a wake carries back to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPayload {
    pub reminder_id: ReminderId,
    /// Undecorated title
    pub title: String,
    pub body: String,
    pub kind: AlertKind,
}

/// A wake waiting to fire
#[derive(Debug, Clone)]
pub struct ScheduledAlarm {
    pub handle: AlertHandle,
    pub trigger_at: DateTime<Local>,
    pub payload: AlertPayload,
    pub precision: WakePrecision,
    pub generation: u64,
}

impl ScheduledAlarm {
    pub fn token(&self) -> WakeToken {
        WakeToken {
            handle: self.handle,
            generation: self.generation,
        }
    }

    pub fn info(&self) -> ScheduledAlarmInfo {
        ScheduledAlarmInfo {
            handle: self.handle,
            reminder_id: self.payload.reminder_id.clone(),
            title: self.payload.title.clone(),
            trigger_at: self.trigger_at,
            kind: self.payload.kind,
            precision: self.precision,
        }
    }

    pub fn to_persisted(&self) -> PersistedAlarm {
        PersistedAlarm {
            reminder_id: self.payload.reminder_id.clone(),
            title: self.payload.title.clone(),
            body: self.payload.body.clone(),
            kind: self.payload.kind,
            trigger_at: promemoria_util::to_epoch_millis(&self.trigger_at),
        }
    }
}

/// Schedules and cancels wakes. Scheduling an armed handle replaces the
/// previous wake; each arming gets a fresh generation so a late firing of
/// the replaced one is recognised as stale.
pub struct WakeScheduler {
    host: Arc<dyn HostAdapter>,
    pending: HashMap<AlertHandle, ScheduledAlarm>,
    next_generation: u64,
}

impl WakeScheduler {
    pub fn new(host: Arc<dyn HostAdapter>) -> Self {
        Self {
            host,
            pending: HashMap::new(),
            next_generation: 1,
        }
    }

    /// Arm a wake for `handle`, exact if the host allows it and inexact
    /// otherwise. Fails only when no wake at all could be armed.
    pub fn schedule(
        &mut self,
        handle: AlertHandle,
        trigger_at: DateTime<Local>,
        payload: AlertPayload,
    ) -> Result<&ScheduledAlarm, AlertError> {
        self.cancel(handle);

        let generation = self.next_generation;
        self.next_generation += 1;
        let token = WakeToken { handle, generation };

        let precision = match self.host.arm_wake(token, trigger_at, WakePrecision::Exact) {
            Ok(()) => WakePrecision::Exact,
            Err(exact_err) => {
                let reason = match &exact_err {
                    HostError::ExactWakeDenied(reason) => reason.clone(),
                    other => other.to_string(),
                };
                warn!(
                    error = %AlertError::denied(handle, reason),
                    "Falling back to inexact wake"
                );

                self.host
                    .arm_wake(token, trigger_at, WakePrecision::Inexact)
                    .map_err(|e| {
                        warn!(handle = %handle, error = %e, "Inexact wake failed too");
                        AlertError::SchedulerUnavailable
                    })?;
                WakePrecision::Inexact
            }
        };

        info!(
            handle = %handle,
            reminder_id = %payload.reminder_id,
            trigger_at = %promemoria_util::format_datetime_full(&trigger_at),
            kind = ?payload.kind,
            precision = ?precision,
            "Wake scheduled"
        );

        let alarm = ScheduledAlarm {
            handle,
            trigger_at,
            payload,
            precision,
            generation,
        };
        Ok(self.pending.entry(handle).insert_entry(alarm).into_mut())
    }

    /// Remove the wake for `handle`. The host is always told to disarm;
    /// returns whether a wake was outstanding here.
    pub fn cancel(&mut self, handle: AlertHandle) -> bool {
        if let Err(e) = self.host.disarm_wake(handle) {
            warn!(handle = %handle, error = %e, "Failed to disarm wake");
        }

        let removed = self.pending.remove(&handle).is_some();
        if removed {
            debug!(handle = %handle, "Wake cancelled");
        }
        removed
    }

    /// Claim the wake a firing belongs to. Returns `None` for a token that
    /// no longer matches the armed generation.
    pub fn take_fired(&mut self, token: WakeToken) -> Option<ScheduledAlarm> {
        match self.pending.get(&token.handle) {
            Some(alarm) if alarm.generation == token.generation => {
                self.pending.remove(&token.handle)
            }
            Some(alarm) => {
                debug!(
                    handle = %token.handle,
                    fired = token.generation,
                    armed = alarm.generation,
                    "Ignoring stale wake"
                );
                None
            }
            None => {
                debug!(handle = %token.handle, "Ignoring wake with nothing armed");
                None
            }
        }
    }

    pub fn get(&self, handle: AlertHandle) -> Option<&ScheduledAlarm> {
        self.pending.get(&handle)
    }

    /// Outstanding wakes, soonest first
    pub fn pending(&self) -> Vec<&ScheduledAlarm> {
        let mut alarms: Vec<_> = self.pending.values().collect();
        alarms.sort_by_key(|a| (a.trigger_at, a.handle));
        alarms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
