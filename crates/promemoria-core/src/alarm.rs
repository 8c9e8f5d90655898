//! Continuous alarm output: looped audio, vibration and the auto-stop timer

use chrono::{DateTime, Local};
use promemoria_api::{AlarmSessionInfo, AlarmState, Ringtone, StopReason};
use promemoria_host_api::HostAdapter;
use promemoria_util::{AlertError, AlertHandle, MonotonicInstant, ReminderId, SessionId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long an alarm rings before it stops by itself
pub const AUTO_STOP_AFTER: Duration = Duration::from_secs(60);

/// What to ring for
#[derive(Debug, Clone)]
pub struct AlarmRequest {
    pub handle: AlertHandle,
    pub reminder_id: ReminderId,
    pub ringtone: Ringtone,
    /// Waveform to repeat, or `None` when vibration is disabled
    pub vibration: Option<Vec<Duration>>,
}

/// The one alarm output session that may exist at a time
#[derive(Debug)]
pub struct AlarmSession {
    pub session_id: SessionId,
    pub handle: AlertHandle,
    pub reminder_id: ReminderId,
    pub state: AlarmState,

    /// Wall-clock start time (for display/logging)
    pub started_at: DateTime<Local>,

    /// Monotonic start time (for enforcement)
    pub started_at_mono: MonotonicInstant,

    /// Monotonic auto-stop deadline
    pub deadline_mono: MonotonicInstant,

    pub audio_active: bool,
    pub vibration_active: bool,

    /// Audio was wanted but the channel could not be acquired
    pub degraded: bool,
}

impl AlarmSession {
    pub fn time_remaining(&self, now_mono: MonotonicInstant) -> Duration {
        self.deadline_mono.saturating_duration_until(now_mono)
    }

    pub fn is_expired(&self, now_mono: MonotonicInstant) -> bool {
        now_mono >= self.deadline_mono
    }

    pub fn duration_so_far(&self, now_mono: MonotonicInstant) -> Duration {
        now_mono.duration_since(self.started_at_mono)
    }

    pub fn to_info(&self, now_mono: MonotonicInstant) -> AlarmSessionInfo {
        AlarmSessionInfo {
            session_id: self.session_id.clone(),
            handle: self.handle,
            reminder_id: self.reminder_id.clone(),
            started_at: self.started_at,
            time_remaining: self.time_remaining(now_mono),
            audio_active: self.audio_active,
            vibration_active: self.vibration_active,
        }
    }
}

/// Result of a start attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started {
        session_id: SessionId,
        audio: bool,
        vibration: bool,
        degraded: bool,
    },
    /// Another session holds the output channel; nothing changed
    Busy { active: AlertHandle },
}

/// A session that was just released
#[derive(Debug, Clone)]
pub struct StoppedSession {
    pub session_id: SessionId,
    pub handle: AlertHandle,
    pub reminder_id: ReminderId,
    pub reason: StopReason,
    pub duration: Duration,
}

/// Owns the single output channel. `start` only succeeds from Idle, so at
/// most one session exists. Every stop path releases audio and vibration.
/// Dropping the controller stops any session with `StopReason::Teardown`.
pub struct AlarmOutputController {
    host: Arc<dyn HostAdapter>,
    auto_stop_after: Duration,
    session: Option<AlarmSession>,
}

impl AlarmOutputController {
    pub fn new(host: Arc<dyn HostAdapter>, auto_stop_after: Duration) -> Self {
        Self {
            host,
            auto_stop_after,
            session: None,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.session
            .as_ref()
            .map(|s| s.state)
            .unwrap_or(AlarmState::Idle)
    }

    pub fn session(&self) -> Option<&AlarmSession> {
        self.session.as_ref()
    }

    pub fn active_handle(&self) -> Option<AlertHandle> {
        self.session.as_ref().map(|s| s.handle)
    }

    pub fn start(
        &mut self,
        request: AlarmRequest,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> StartOutcome {
        if let Some(active) = &self.session {
            debug!(
                handle = %request.handle,
                active = %active.handle,
                "Alarm output busy"
            );
            return StartOutcome::Busy {
                active: active.handle,
            };
        }

        let session_id = SessionId::new();
        let mut session = AlarmSession {
            session_id: session_id.clone(),
            handle: request.handle,
            reminder_id: request.reminder_id,
            state: AlarmState::Starting,
            started_at: now,
            started_at_mono: now_mono,
            deadline_mono: now_mono + self.auto_stop_after,
            audio_active: false,
            vibration_active: false,
            degraded: false,
        };

        if !request.ringtone.is_silent() {
            match self.host.start_audio(request.ringtone) {
                Ok(()) => session.audio_active = true,
                Err(e) => {
                    warn!(
                        handle = %session.handle,
                        error = %AlertError::output(e.to_string()),
                        "Alarm audio unavailable, continuing degraded"
                    );
                    session.degraded = true;
                }
            }
        }

        if let Some(pattern) = request.vibration.as_deref().filter(|p| !p.is_empty()) {
            match self.host.start_vibration(pattern) {
                Ok(()) => session.vibration_active = true,
                Err(e) => warn!(handle = %session.handle, error = %e, "Vibration unavailable"),
            }
        }

        // If this fails, tick() still stops the session at the deadline
        if let Err(e) = self.host.arm_auto_stop(&session_id, self.auto_stop_after) {
            warn!(session_id = %session_id, error = %e, "Failed to arm auto-stop timer");
        }

        session.state = AlarmState::Looping;

        info!(
            session_id = %session_id,
            handle = %session.handle,
            ringtone = request.ringtone.name(),
            audio = session.audio_active,
            vibration = session.vibration_active,
            degraded = session.degraded,
            "Alarm started"
        );

        let outcome = StartOutcome::Started {
            session_id,
            audio: session.audio_active,
            vibration: session.vibration_active,
            degraded: session.degraded,
        };
        self.session = Some(session);
        outcome
    }

    /// Stop the active session, whichever handle it belongs to
    pub fn stop(
        &mut self,
        reason: StopReason,
        now_mono: MonotonicInstant,
    ) -> Option<StoppedSession> {
        let mut session = self.session.take()?;
        session.state = AlarmState::Stopping;

        if let Err(e) = self.host.disarm_auto_stop(&session.session_id) {
            warn!(session_id = %session.session_id, error = %e, "Failed to disarm auto-stop timer");
        }

        // Released unconditionally, whatever start managed to acquire
        if let Err(e) = self.host.stop_audio() {
            warn!(session_id = %session.session_id, error = %e, "Failed to release audio");
        }
        if let Err(e) = self.host.stop_vibration() {
            warn!(session_id = %session.session_id, error = %e, "Failed to cancel vibration");
        }

        let duration = session.duration_so_far(now_mono);
        info!(
            session_id = %session.session_id,
            handle = %session.handle,
            reason = ?reason,
            duration_secs = duration.as_secs(),
            "Alarm stopped"
        );

        Some(StoppedSession {
            session_id: session.session_id,
            handle: session.handle,
            reminder_id: session.reminder_id,
            reason,
            duration,
        })
    }

    /// Stop the session only if it belongs to `handle`
    pub fn stop_for(
        &mut self,
        handle: AlertHandle,
        reason: StopReason,
        now_mono: MonotonicInstant,
    ) -> Option<StoppedSession> {
        if self.active_handle() != Some(handle) {
            return None;
        }
        self.stop(reason, now_mono)
    }

    /// The host's auto-stop timer fired. Timers of sessions that already
    /// ended are ignored.
    pub fn auto_stop_elapsed(
        &mut self,
        session_id: &SessionId,
        now_mono: MonotonicInstant,
    ) -> Option<StoppedSession> {
        match &self.session {
            Some(s) if &s.session_id == session_id => self.stop(StopReason::Timeout, now_mono),
            _ => {
                debug!(session_id = %session_id, "Ignoring auto-stop for ended session");
                None
            }
        }
    }

    /// Stop a session that outlived its deadline
    pub fn tick(&mut self, now_mono: MonotonicInstant) -> Option<StoppedSession> {
        let expired = self
            .session
            .as_ref()
            .is_some_and(|s| s.state == AlarmState::Looping && s.is_expired(now_mono));
        if expired {
            self.stop(StopReason::Timeout, now_mono)
        } else {
            None
        }
    }
}

impl Drop for AlarmOutputController {
    fn drop(&mut self) {
        self.stop(StopReason::Teardown, MonotonicInstant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promemoria_host_api::{HostCapabilities, MockCall, MockHost};

    fn request(ringtone: Ringtone, vibration: bool) -> AlarmRequest {
        AlarmRequest {
            handle: AlertHandle::new(3583).unwrap(),
            reminder_id: ReminderId::new("r1"),
            ringtone,
            vibration: vibration.then(|| vec![Duration::ZERO, Duration::from_millis(800)]),
        }
    }

    fn setup() -> (Arc<MockHost>, AlarmOutputController) {
        let host = Arc::new(MockHost::new());
        let controller = AlarmOutputController::new(host.clone(), AUTO_STOP_AFTER);
        (host, controller)
    }

    fn started_id(outcome: &StartOutcome) -> SessionId {
        match outcome {
            StartOutcome::Started { session_id, .. } => session_id.clone(),
            other => panic!("expected Started, got {other:?}"),
        }
    }

    #[test]
    fn start_acquires_outputs_and_arms_auto_stop() {
        let (host, mut controller) = setup();
        let outcome = controller.start(
            request(Ringtone::Urgent, true),
            promemoria_util::now(),
            MonotonicInstant::now(),
        );
        let sid = started_id(&outcome);

        assert_eq!(controller.state(), AlarmState::Looping);
        assert_eq!(host.audio_playing(), Some(Ringtone::Urgent));
        assert!(host.vibrating());
        assert_eq!(host.auto_stop_armed(&sid), Some(AUTO_STOP_AFTER));
    }

    #[test]
    fn second_start_is_refused() {
        let (host, mut controller) = setup();
        let now = promemoria_util::now();
        let mono = MonotonicInstant::now();
        controller.start(request(Ringtone::Chime, false), now, mono);
        host.clear_calls();

        let mut other = request(Ringtone::Beep, false);
        other.handle = AlertHandle::new(1).unwrap();
        let outcome = controller.start(other, now, mono);

        assert_eq!(
            outcome,
            StartOutcome::Busy {
                active: AlertHandle::new(3583).unwrap()
            }
        );
        assert!(host.calls().is_empty());
        assert_eq!(host.audio_playing(), Some(Ringtone::Chime));
    }

    #[test]
    fn audio_failure_is_degraded() {
        let (host, mut controller) = setup();
        host.set_fail_audio(true);

        let outcome = controller.start(
            request(Ringtone::Chime, true),
            promemoria_util::now(),
            MonotonicInstant::now(),
        );
        match outcome {
            StartOutcome::Started {
                audio,
                vibration,
                degraded,
                ..
            } => {
                assert!(!audio);
                assert!(vibration);
                assert!(degraded);
            }
            other => panic!("expected Started, got {other:?}"),
        }
        assert_eq!(controller.state(), AlarmState::Looping);
    }

    #[test]
    fn silent_ringtone_is_not_degraded() {
        let (host, mut controller) = setup();
        let outcome = controller.start(
            request(Ringtone::Silent, false),
            promemoria_util::now(),
            MonotonicInstant::now(),
        );

        assert!(matches!(
            outcome,
            StartOutcome::Started {
                audio: false,
                degraded: false,
                ..
            }
        ));
        assert!(!host.calls().iter().any(|c| matches!(c, MockCall::StartAudio(_))));
    }

    #[test]
    fn missing_vibration_motor_is_tolerated() {
        let host = Arc::new(MockHost::new().with_capabilities(HostCapabilities::linux_desktop()));
        let mut controller = AlarmOutputController::new(host.clone(), AUTO_STOP_AFTER);

        let outcome = controller.start(
            request(Ringtone::Chime, true),
            promemoria_util::now(),
            MonotonicInstant::now(),
        );
        assert!(matches!(
            outcome,
            StartOutcome::Started {
                audio: true,
                vibration: false,
                ..
            }
        ));
    }

    #[test]
    fn stop_always_releases_outputs() {
        let (host, mut controller) = setup();
        let mono = MonotonicInstant::now();
        host.set_fail_audio(true);
        controller.start(request(Ringtone::Chime, false), promemoria_util::now(), mono);
        host.clear_calls();

        let stopped = controller
            .stop(StopReason::UserAction, mono + Duration::from_secs(5))
            .unwrap();
        assert_eq!(stopped.reason, StopReason::UserAction);
        assert_eq!(stopped.duration, Duration::from_secs(5));

        let calls = host.calls();
        assert!(calls.contains(&MockCall::StopAudio));
        assert!(calls.contains(&MockCall::StopVibration));
        assert_eq!(controller.state(), AlarmState::Idle);

        // Stopping again is a no-op
        assert!(controller.stop(StopReason::UserAction, mono).is_none());
    }

    #[test]
    fn stop_for_other_handle_is_ignored() {
        let (_host, mut controller) = setup();
        let mono = MonotonicInstant::now();
        controller.start(request(Ringtone::Chime, false), promemoria_util::now(), mono);

        let other = AlertHandle::new(1).unwrap();
        assert!(controller.stop_for(other, StopReason::UserAction, mono).is_none());
        assert_eq!(controller.state(), AlarmState::Looping);
    }

    #[test]
    fn auto_stop_ignores_stale_sessions() {
        let (host, mut controller) = setup();
        let mono = MonotonicInstant::now();
        let first = started_id(&controller.start(
            request(Ringtone::Chime, false),
            promemoria_util::now(),
            mono,
        ));
        controller.stop(StopReason::UserAction, mono);

        let second = started_id(&controller.start(
            request(Ringtone::Chime, false),
            promemoria_util::now(),
            mono,
        ));

        assert!(controller.auto_stop_elapsed(&first, mono).is_none());
        assert_eq!(controller.state(), AlarmState::Looping);

        let stopped = controller.auto_stop_elapsed(&second, mono).unwrap();
        assert_eq!(stopped.reason, StopReason::Timeout);
        assert!(host.audio_playing().is_none());
    }

    #[test]
    fn tick_stops_overdue_session() {
        let (_host, mut controller) = setup();
        let mono = MonotonicInstant::now();
        controller.start(request(Ringtone::Chime, false), promemoria_util::now(), mono);

        assert!(controller.tick(mono + Duration::from_secs(59)).is_none());
        let stopped = controller.tick(mono + Duration::from_secs(61)).unwrap();
        assert_eq!(stopped.reason, StopReason::Timeout);
    }

    #[test]
    fn drop_releases_channel() {
        let host = Arc::new(MockHost::new());
        {
            let mut controller = AlarmOutputController::new(host.clone(), AUTO_STOP_AFTER);
            controller.start(
                request(Ringtone::Chime, true),
                promemoria_util::now(),
                MonotonicInstant::now(),
            );
            assert!(host.audio_playing().is_some());
        }
        assert!(host.audio_playing().is_none());
        assert!(!host.vibrating());
    }
}
