//! Alert engine: the single owner of scheduler, surfaces and alarm output

use chrono::{DateTime, Local};
use promemoria_api::{
    AlertKind, HealthStatus, ServiceStateSnapshot, StopReason, SurfaceStyle, API_VERSION,
};
use promemoria_config::ServiceConfig;
use promemoria_host_api::{HostAdapter, HostEvent, SurfaceSpec, WakeToken};
use promemoria_store::{
    load_scheduled_alarms, save_scheduled_alarms, AuditEvent, AuditEventType,
    NotificationSettings, Store,
};
use promemoria_util::{
    AlertError, AlertHandle, MonotonicInstant, ReminderId, SessionId, EPHEMERAL_ID_PREFIX,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    alarm_surface, reminder_surface, strip_decoration, AlarmOutputController, AlarmRequest,
    AlarmSession, AlertContent, AlertPayload, CoreEvent, HandleRegistry, NotificationPresenter,
    ReminderStateReader, StartOutcome, StoppedSession, WakeScheduler, AUTO_STOP_AFTER,
    SNOOZE_DELAY,
};

pub const TEST_FIRE_TITLE: &str = "Test reminder";
pub const TEST_FIRE_BODY: &str = "Actions run without opening the app";

/// Engine tunables, taken from the service configuration
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Title used when a schedule request carries none
    pub default_title: String,
    pub vibration_pattern: Vec<Duration>,
    pub auto_stop_after: Duration,
    pub snooze_delay: Duration,
}

impl EngineOptions {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            default_title: config.notifications.default_title.clone(),
            vibration_pattern: config.output.vibration_pattern.clone(),
            auto_stop_after: AUTO_STOP_AFTER,
            snooze_delay: SNOOZE_DELAY,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

/// Every external stimulus the engine reacts to
#[derive(Debug, Clone)]
pub enum Trigger {
    WakeFired(WakeToken),
    Action(promemoria_api::ActionRequest),
    SurfaceTapped {
        handle: AlertHandle,
        reminder_id: ReminderId,
    },
    AutoStopElapsed(SessionId),
    Teardown,
}

impl From<HostEvent> for Trigger {
    fn from(event: HostEvent) -> Self {
        match event {
            HostEvent::WakeFired(token) => Trigger::WakeFired(token),
            HostEvent::AutoStopElapsed(session_id) => Trigger::AutoStopElapsed(session_id),
            HostEvent::ActionInvoked(request) => Trigger::Action(request),
            HostEvent::SurfaceTapped {
                handle,
                reminder_id,
            } => Trigger::SurfaceTapped {
                handle,
                reminder_id,
            },
        }
    }
}

/// The alert engine.
///
/// All state changes go through `&mut self`, so handlers never interleave.
/// Each operation appends [`CoreEvent`]s to an outbox the caller drains.
pub struct AlertEngine {
    pub(crate) options: EngineOptions,
    pub(crate) store: Arc<dyn Store>,
    pub(crate) host: Arc<dyn HostAdapter>,
    pub(crate) registry: HandleRegistry,
    pub(crate) reader: ReminderStateReader,
    pub(crate) scheduler: WakeScheduler,
    pub(crate) presenter: NotificationPresenter,
    pub(crate) alarm: AlarmOutputController,
    outbox: Vec<CoreEvent>,
}

impl AlertEngine {
    pub fn new(options: EngineOptions, store: Arc<dyn Store>, host: Arc<dyn HostAdapter>) -> Self {
        info!(
            auto_stop_secs = options.auto_stop_after.as_secs(),
            snooze_secs = options.snooze_delay.as_secs(),
            "Alert engine initialized"
        );

        Self {
            reader: ReminderStateReader::new(store.clone()),
            scheduler: WakeScheduler::new(host.clone()),
            presenter: NotificationPresenter::new(host.clone()),
            alarm: AlarmOutputController::new(host.clone(), options.auto_stop_after),
            registry: HandleRegistry::new(),
            options,
            store,
            host,
            outbox: Vec::new(),
        }
    }

    /// Dispatch one external trigger
    pub fn handle(&mut self, trigger: Trigger, now: DateTime<Local>, now_mono: MonotonicInstant) {
        match trigger {
            Trigger::WakeFired(token) => self.on_wake_fired(token, now, now_mono),
            Trigger::Action(request) => self.on_action(request, now, now_mono),
            Trigger::SurfaceTapped {
                handle,
                reminder_id,
            } => {
                debug!(handle = %handle, reminder_id = %reminder_id, "Surface tapped");
                self.emit(CoreEvent::OpenRequested { reminder_id });
            }
            Trigger::AutoStopElapsed(session_id) => {
                if let Some(stopped) = self.alarm.auto_stop_elapsed(&session_id, now_mono) {
                    self.finish_alarm(stopped);
                }
            }
            Trigger::Teardown => self.teardown(now_mono),
        }
    }

    /// Schedule (or replace) the alert for a reminder. Returns its handle.
    pub fn schedule_alert(
        &mut self,
        id: &str,
        title: Option<&str>,
        body: &str,
        timestamp_ms: i64,
    ) -> Result<AlertHandle, AlertError> {
        if id.is_empty() || timestamp_ms <= 0 {
            return Err(AlertError::MissingField("id/timestamp"));
        }
        let trigger_at = promemoria_util::from_epoch_millis(timestamp_ms)
            .ok_or(AlertError::MissingField("id/timestamp"))?;

        let title = title
            .map(strip_decoration)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.options.default_title.as_str())
            .to_string();

        let reminder_id = ReminderId::new(id);
        let handle = self.registry.handle_for(&reminder_id);

        self.schedule_wake(
            handle,
            trigger_at,
            AlertPayload {
                reminder_id,
                title,
                body: body.to_string(),
                kind: AlertKind::Primary,
            },
        )?;
        Ok(handle)
    }

    /// Remove the wake, the surface and any alarm output for a reminder
    pub fn cancel_alert(&mut self, id: &str, now_mono: MonotonicInstant) -> Result<(), AlertError> {
        if id.is_empty() {
            return Err(AlertError::MissingField("id"));
        }

        let reminder_id = ReminderId::new(id);
        let handle = self.registry.handle_for(&reminder_id);

        self.cancel_wake(handle);
        self.cancel_surface(handle);
        self.stop_alarm_for(handle, StopReason::Reconciled, now_mono);

        info!(handle = %handle, reminder_id = %reminder_id, "Alert cancelled");
        self.audit(AuditEventType::AlertCancelled {
            handle,
            reminder_id,
        });
        Ok(())
    }

    /// Show a reminder surface right away under a synthetic id
    pub fn test_fire(&mut self, now: DateTime<Local>) -> AlertHandle {
        let reminder_id = ReminderId::new(format!(
            "{EPHEMERAL_ID_PREFIX}{}",
            promemoria_util::to_epoch_millis(&now)
        ));
        let handle = self.registry.handle_for(&reminder_id);

        let content = AlertContent {
            handle,
            reminder_id,
            title: TEST_FIRE_TITLE.into(),
            body: TEST_FIRE_BODY.into(),
        };
        let user_name = self.reader.user_name();
        let spec = reminder_surface(&content, AlertKind::Primary, user_name.as_deref());
        self.show_surface(&spec);

        info!(handle = %handle, reminder_id = %content.reminder_id, "Test alert shown");
        handle
    }

    /// Re-arm the wakes saved by a previous run. Returns how many were armed.
    pub fn restore(&mut self) -> usize {
        let saved = load_scheduled_alarms(self.store.as_ref());
        let mut restored = 0;

        for alarm in saved {
            let Some(trigger_at) = promemoria_util::from_epoch_millis(alarm.trigger_at) else {
                warn!(reminder_id = %alarm.reminder_id, "Discarding saved wake with invalid time");
                continue;
            };
            let handle = self.registry.handle_for(&alarm.reminder_id);
            let payload = AlertPayload {
                reminder_id: alarm.reminder_id,
                title: alarm.title,
                body: alarm.body,
                kind: alarm.kind,
            };

            match self.arm_wake(handle, trigger_at, payload) {
                Ok(()) => restored += 1,
                Err(e) => warn!(handle = %handle, error = %e, "Failed to restore wake"),
            }
        }

        // The saved list is left as loaded, so a wake that failed to re-arm
        // is retried on the next start

        if restored > 0 {
            info!(count = restored, "Restored saved wakes");
        }
        restored
    }

    /// Stop an alarm whose auto-stop timer never arrived
    pub fn tick(&mut self, now_mono: MonotonicInstant) {
        if let Some(stopped) = self.alarm.tick(now_mono) {
            warn!(session_id = %stopped.session_id, "Alarm outlived its deadline");
            self.finish_alarm(stopped);
        }
    }

    /// Release the output channel and its surface. Wakes stay armed and
    /// saved so a restart picks them up.
    pub fn teardown(&mut self, now_mono: MonotonicInstant) {
        self.stop_alarm(StopReason::Teardown, now_mono);
    }

    pub fn snapshot(&self, now_mono: MonotonicInstant) -> ServiceStateSnapshot {
        ServiceStateSnapshot {
            api_version: API_VERSION,
            pending_wakes: self.scheduler.pending().iter().map(|a| a.info()).collect(),
            alarm_state: self.alarm.state(),
            active_session: self.alarm.session().map(|s| s.to_info(now_mono)),
        }
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            live: true,
            host_adapter_ok: self.host.is_healthy(),
            store_ok: self.store.is_healthy(),
        }
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn active_session(&self) -> Option<&AlarmSession> {
        self.alarm.session()
    }

    pub fn has_pending_wake(&self, handle: AlertHandle) -> bool {
        self.scheduler.get(handle).is_some()
    }

    pub fn is_surface_visible(&self, handle: AlertHandle) -> bool {
        self.presenter.is_visible(handle)
    }

    pub fn surface_style(&self, handle: AlertHandle) -> Option<SurfaceStyle> {
        self.presenter.style_of(handle)
    }

    /// The handle a reminder id maps to (allocating it if new)
    pub fn handle_for(&mut self, id: &ReminderId) -> AlertHandle {
        self.registry.handle_for(id)
    }

    // Building blocks shared by the dispatch paths

    pub(crate) fn emit(&mut self, event: CoreEvent) {
        self.outbox.push(event);
    }

    pub(crate) fn audit(&self, event: AuditEventType) {
        if let Err(e) = self.store.append_audit(AuditEvent::new(event)) {
            warn!(error = %e, "Failed to append audit event");
        }
    }

    pub(crate) fn persist_schedule(&self) {
        let alarms: Vec<_> = self
            .scheduler
            .pending()
            .iter()
            .map(|a| a.to_persisted())
            .collect();
        if let Err(e) = save_scheduled_alarms(self.store.as_ref(), &alarms) {
            warn!(error = %e, "Failed to save pending wakes");
        }
    }

    pub(crate) fn schedule_wake(
        &mut self,
        handle: AlertHandle,
        trigger_at: DateTime<Local>,
        payload: AlertPayload,
    ) -> Result<(), AlertError> {
        self.arm_wake(handle, trigger_at, payload)?;
        self.persist_schedule();
        Ok(())
    }

    /// Arm a wake without rewriting the saved list
    fn arm_wake(
        &mut self,
        handle: AlertHandle,
        trigger_at: DateTime<Local>,
        payload: AlertPayload,
    ) -> Result<(), AlertError> {
        let alarm = self.scheduler.schedule(handle, trigger_at, payload)?;
        let event = CoreEvent::WakeScheduled {
            handle,
            reminder_id: alarm.payload.reminder_id.clone(),
            trigger_at: alarm.trigger_at,
            kind: alarm.payload.kind,
            precision: alarm.precision,
        };
        let audit = AuditEventType::AlertScheduled {
            handle,
            reminder_id: alarm.payload.reminder_id.clone(),
            trigger_at: alarm.trigger_at,
            kind: alarm.payload.kind,
            precision: alarm.precision,
        };

        self.emit(event);
        self.audit(audit);
        Ok(())
    }

    pub(crate) fn cancel_wake(&mut self, handle: AlertHandle) {
        if self.scheduler.cancel(handle) {
            self.emit(CoreEvent::WakeCancelled { handle });
            self.persist_schedule();
        }
    }

    pub(crate) fn show_surface(&mut self, spec: &SurfaceSpec) {
        if self.presenter.show(spec) {
            self.emit(CoreEvent::SurfacePosted {
                handle: spec.handle,
                reminder_id: spec.reminder_id.clone(),
                title: spec.title.clone(),
                body: spec.body.clone(),
                style: spec.style,
            });
        }
    }

    pub(crate) fn cancel_surface(&mut self, handle: AlertHandle) {
        if self.presenter.cancel(handle) {
            self.emit(CoreEvent::SurfaceCancelled { handle });
        }
    }

    /// Start the alarm output for `content` and post its ongoing surface.
    /// The surface goes up even when another alarm holds the channel.
    pub(crate) fn start_alarm(
        &mut self,
        content: &AlertContent,
        settings: &NotificationSettings,
        user_name: Option<&str>,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) {
        let request = AlarmRequest {
            handle: content.handle,
            reminder_id: content.reminder_id.clone(),
            ringtone: settings.ringtone,
            vibration: settings
                .vibration_enabled
                .then(|| self.options.vibration_pattern.clone()),
        };

        match self.alarm.start(request, now, now_mono) {
            StartOutcome::Started {
                session_id,
                audio,
                vibration,
                degraded,
            } => {
                self.audit(AuditEventType::AlarmStarted {
                    session_id: session_id.clone(),
                    handle: content.handle,
                    degraded,
                });
                self.emit(CoreEvent::AlarmStarted {
                    session_id,
                    handle: content.handle,
                    reminder_id: content.reminder_id.clone(),
                    audio,
                    vibration,
                });
            }
            StartOutcome::Busy { active } => {
                info!(
                    handle = %content.handle,
                    active = %active,
                    "Alarm already ringing, posting surface only"
                );
            }
        }

        let spec = alarm_surface(content, user_name);
        self.show_surface(&spec);
    }

    /// Stop the active alarm, whichever handle it rings for
    pub(crate) fn stop_alarm(&mut self, reason: StopReason, now_mono: MonotonicInstant) {
        if let Some(stopped) = self.alarm.stop(reason, now_mono) {
            self.finish_alarm(stopped);
        }
    }

    /// Stop the active alarm only if it rings for `handle`
    pub(crate) fn stop_alarm_for(
        &mut self,
        handle: AlertHandle,
        reason: StopReason,
        now_mono: MonotonicInstant,
    ) {
        if let Some(stopped) = self.alarm.stop_for(handle, reason, now_mono) {
            self.finish_alarm(stopped);
        }
    }

    fn finish_alarm(&mut self, stopped: StoppedSession) {
        self.cancel_surface(stopped.handle);
        self.audit(AuditEventType::AlarmStopped {
            session_id: stopped.session_id.clone(),
            handle: stopped.handle,
            reason: stopped.reason,
            duration: stopped.duration,
        });
        self.emit(CoreEvent::AlarmStopped {
            session_id: stopped.session_id,
            handle: stopped.handle,
            reason: stopped.reason,
            duration: stopped.duration,
        });
    }
}

impl Drop for AlertEngine {
    fn drop(&mut self) {
        self.teardown(MonotonicInstant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{engine_with, reminders_json};
    use promemoria_api::{AlarmState, WakePrecision};
    use promemoria_host_api::MockCall;

    const T: i64 = 1_900_000_000_000;

    #[test]
    fn schedule_requires_id_and_timestamp() {
        let (host, _store, mut engine) = engine_with(None);

        assert!(matches!(
            engine.schedule_alert("", Some("x"), "", T),
            Err(AlertError::MissingField("id/timestamp"))
        ));
        assert!(matches!(
            engine.schedule_alert("r1", Some("x"), "", 0),
            Err(AlertError::MissingField("id/timestamp"))
        ));
        assert!(host.armed_wakes().is_empty());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn schedule_arms_and_persists() {
        let (host, store, mut engine) = engine_with(None);

        let handle = engine
            .schedule_alert("r1", Some("⏰ Dentist"), "10:30", T)
            .unwrap();
        assert_eq!(handle, AlertHandle::derive(&"r1".into()));

        let armed = host.armed_wake(handle).unwrap();
        assert_eq!(promemoria_util::to_epoch_millis(&armed.at), T);
        assert_eq!(armed.precision, WakePrecision::Exact);

        let saved = load_scheduled_alarms(store.as_ref());
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Dentist");
        assert_eq!(saved[0].trigger_at, T);

        let events = engine.drain_events();
        assert!(matches!(
            events.as_slice(),
            [CoreEvent::WakeScheduled { kind: AlertKind::Primary, .. }]
        ));
    }

    #[test]
    fn missing_title_uses_default() {
        let (_host, store, mut engine) = engine_with(None);
        engine.schedule_alert("r1", None, "", T).unwrap();
        engine.schedule_alert("r2", Some(""), "", T).unwrap();

        let saved = load_scheduled_alarms(store.as_ref());
        assert!(saved.iter().all(|a| a.title == engine.options().default_title));
    }

    #[test]
    fn scheduler_unavailable_is_reported() {
        let (host, store, mut engine) = engine_with(None);
        host.set_fail_wakes(true);

        assert!(matches!(
            engine.schedule_alert("r1", None, "", T),
            Err(AlertError::SchedulerUnavailable)
        ));
        assert!(engine.drain_events().is_empty());
        assert!(load_scheduled_alarms(store.as_ref()).is_empty());

        host.set_fail_wakes(false);
        assert!(engine.schedule_alert("r1", None, "", T).is_ok());
    }

    #[test]
    fn cancel_requires_id_and_is_idempotent() {
        let (host, _store, mut engine) = engine_with(None);
        let mono = MonotonicInstant::now();

        assert!(matches!(
            engine.cancel_alert("", mono),
            Err(AlertError::MissingField("id"))
        ));

        let handle = engine.schedule_alert("r1", None, "", T).unwrap();
        engine.drain_events();

        engine.cancel_alert("r1", mono).unwrap();
        assert!(host.armed_wake(handle).is_none());
        assert_eq!(
            engine.drain_events(),
            vec![CoreEvent::WakeCancelled { handle }]
        );

        engine.cancel_alert("r1", mono).unwrap();
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_fire_shows_immediately() {
        let (host, _store, mut engine) = engine_with(None);
        let now = promemoria_util::now();

        let handle = engine.test_fire(now);
        let surface = host.surface(handle).unwrap();
        assert_eq!(surface.title, format!("⏰ {TEST_FIRE_TITLE}"));
        assert_eq!(surface.body, TEST_FIRE_BODY);
        assert!(surface.reminder_id.as_str().starts_with("test-"));
        assert!(host.armed_wakes().is_empty());
    }

    #[test]
    fn test_fire_without_notifications_is_absorbed() {
        let (host, _store, mut engine) = engine_with(None);
        host.set_fail_surface(true);

        engine.test_fire(promemoria_util::now());
        assert_eq!(host.visible_surfaces(), 0);
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn restore_rearms_saved_wakes() {
        let (_host, store, mut engine) = engine_with(None);
        engine.schedule_alert("r1", Some("Dentist"), "10:30", T).unwrap();
        drop(engine);

        let host = Arc::new(promemoria_host_api::MockHost::new());
        let mut restarted = AlertEngine::new(EngineOptions::default(), store, host.clone());
        assert_eq!(restarted.restore(), 1);

        let handle = AlertHandle::derive(&"r1".into());
        assert_eq!(
            promemoria_util::to_epoch_millis(&host.armed_wake(handle).unwrap().at),
            T
        );
        assert!(restarted.has_pending_wake(handle));
    }

    #[test]
    fn failed_restore_keeps_saved_wakes() {
        let (_host, store, mut engine) = engine_with(None);
        engine.schedule_alert("r1", None, "", T).unwrap();
        engine.schedule_alert("r2", None, "", T + 60_000).unwrap();
        drop(engine);

        let host = Arc::new(promemoria_host_api::MockHost::new());
        host.set_fail_wakes(true);
        let mut restarted =
            AlertEngine::new(EngineOptions::default(), store.clone(), host.clone());
        assert_eq!(restarted.restore(), 0);
        assert_eq!(load_scheduled_alarms(store.as_ref()).len(), 2);

        // A later start with a working host picks both up
        drop(restarted);
        let host = Arc::new(promemoria_host_api::MockHost::new());
        let mut restarted = AlertEngine::new(EngineOptions::default(), store.clone(), host);
        assert_eq!(restarted.restore(), 2);
        assert_eq!(load_scheduled_alarms(store.as_ref()).len(), 2);
    }

    #[test]
    fn surface_tap_only_requests_open() {
        let (host, _store, mut engine) = engine_with(None);
        host.clear_calls();

        engine.handle(
            Trigger::SurfaceTapped {
                handle: AlertHandle::new(1).unwrap(),
                reminder_id: "r1".into(),
            },
            promemoria_util::now(),
            MonotonicInstant::now(),
        );

        assert_eq!(
            engine.drain_events(),
            vec![CoreEvent::OpenRequested {
                reminder_id: "r1".into()
            }]
        );
        assert!(host.calls().is_empty());
    }

    #[test]
    fn teardown_releases_output_but_keeps_wakes() {
        let (host, store, mut engine) =
            engine_with(Some(&reminders_json(&[("r1", false)])));
        let now = promemoria_util::now();
        let mono = MonotonicInstant::now();

        let handle = engine.schedule_alert("r1", None, "", T).unwrap();
        let content = AlertContent {
            handle,
            reminder_id: "r1".into(),
            title: "Dentist".into(),
            body: String::new(),
        };
        let settings = NotificationSettings {
            vibration_enabled: true,
            ringtone: promemoria_api::Ringtone::Chime,
            alarm_mode: true,
        };
        engine.start_alarm(&content, &settings, None, now, mono);
        assert!(host.audio_playing().is_some());
        host.clear_calls();

        engine.handle(Trigger::Teardown, now, mono);
        assert!(host.audio_playing().is_none());
        assert!(!host.vibrating());
        assert!(host.surface(handle).is_none());
        assert_eq!(engine.snapshot(mono).alarm_state, AlarmState::Idle);

        assert!(host.armed_wake(handle).is_some());
        assert_eq!(load_scheduled_alarms(store.as_ref()).len(), 1);
        assert!(!host.calls().contains(&MockCall::DisarmWake(handle)));
    }

    #[test]
    fn tick_backstops_missed_auto_stop() {
        let (host, _store, mut engine) = engine_with(None);
        let now = promemoria_util::now();
        let mono = MonotonicInstant::now();
        let content = AlertContent {
            handle: AlertHandle::new(5).unwrap(),
            reminder_id: "test-1".into(),
            title: "x".into(),
            body: String::new(),
        };
        engine.start_alarm(&content, &NotificationSettings::default(), None, now, mono);

        engine.tick(mono + Duration::from_secs(30));
        assert!(engine.active_session().is_some());

        engine.tick(mono + Duration::from_secs(61));
        assert!(engine.active_session().is_none());
        assert!(host.audio_playing().is_none());
    }

    #[test]
    fn snapshot_lists_pending_wakes() {
        let (_host, _store, mut engine) = engine_with(None);
        engine.schedule_alert("r2", None, "", T + 1000).unwrap();
        engine.schedule_alert("r1", None, "", T).unwrap();

        let snapshot = engine.snapshot(MonotonicInstant::now());
        assert_eq!(snapshot.pending_wakes.len(), 2);
        assert_eq!(snapshot.pending_wakes[0].reminder_id.as_str(), "r1");
        assert_eq!(snapshot.alarm_state, AlarmState::Idle);
        assert!(snapshot.active_session.is_none());
    }

    #[test]
    fn health_reports_components() {
        let (_host, _store, engine) = engine_with(None);
        let health = engine.health();
        assert!(health.live);
        assert!(health.host_adapter_ok);
        assert!(health.store_ok);
    }
}
