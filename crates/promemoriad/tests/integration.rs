//! Integration tests for promemoriad
//!
//! These drive the alert engine end to end against the mock host and an
//! in-memory store, the same way the service loop does.

use promemoria_api::{AlarmState, AlertAction, AlertKind, StopReason, SurfaceStyle};
use promemoria_core::{AlertEngine, CoreEvent, EngineOptions, Trigger};
use promemoria_host_api::{HostAdapter, HostEvent, MockCall, MockHost};
use promemoria_store::{
    AuditEventType, SqliteStore, Store, REMINDERS_KEY, SETTINGS_KEY,
};
use promemoria_util::{AlertHandle, MonotonicInstant};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

struct Harness {
    host: Arc<MockHost>,
    store: Arc<SqliteStore>,
    engine: AlertEngine,
    events: UnboundedReceiver<HostEvent>,
}

impl Harness {
    fn new(reminders: &str, settings: Option<&str>) -> Self {
        let host = Arc::new(MockHost::new());
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.set(REMINDERS_KEY, reminders).unwrap();
        if let Some(settings) = settings {
            store.set(SETTINGS_KEY, settings).unwrap();
        }

        let events = host.subscribe().unwrap();
        let engine = AlertEngine::new(EngineOptions::default(), store.clone(), host.clone());

        Self {
            host,
            store,
            engine,
            events,
        }
    }

    /// Deliver every pending host event to the engine
    fn pump(&mut self, now: chrono::DateTime<chrono::Local>, now_mono: MonotonicInstant) {
        while let Ok(event) = self.events.try_recv() {
            self.engine.handle(Trigger::from(event), now, now_mono);
        }
    }

    fn fire(&mut self, handle: AlertHandle, now: chrono::DateTime<chrono::Local>) {
        assert!(self.host.fire_wake(handle).is_some(), "no wake armed");
        self.pump(now, MonotonicInstant::now());
    }

    fn set_reminders(&self, json: &str) {
        self.store.set(REMINDERS_KEY, json).unwrap();
    }

    fn starts(&self) -> usize {
        self.host
            .calls()
            .iter()
            .filter(|c| matches!(c, MockCall::StartAudio(_) | MockCall::StartVibration))
            .count()
    }
}

const R1_OPEN: &str = r#"[{"id":"r1","title":"Dentist","isCompleted":false}]"#;
const R1_DONE: &str = r#"[{"id":"r1","title":"Dentist","isCompleted":true}]"#;

fn at(ms: i64) -> chrono::DateTime<chrono::Local> {
    promemoria_util::from_epoch_millis(ms).unwrap()
}

const T: i64 = 1_900_000_000_000;

#[test]
fn scenario_a_plain_alert_shows_once() {
    let mut h = Harness::new(R1_OPEN, Some(r#"{"alarmMode":false}"#));
    let handle = h
        .engine
        .schedule_alert("r1", Some("Dentist"), "10:30 at the clinic", T)
        .unwrap();

    h.fire(handle, at(T));

    let posted = h.host.posted_surfaces();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].handle, handle);
    assert_eq!(posted[0].title, "⏰ Dentist");
    assert_eq!(posted[0].body, "10:30 at the clinic");
    assert_eq!(posted[0].style, SurfaceStyle::Reminder);
    assert!(posted[0].persistent);
    assert_eq!(h.starts(), 0);
}

#[test]
fn scenario_b_snooze_reschedules_same_handle() {
    let mut h = Harness::new(R1_OPEN, None);
    let handle = h.engine.schedule_alert("r1", Some("Dentist"), "", T).unwrap();
    h.fire(handle, at(T));

    let t2 = at(T + 42_000);
    let snooze = h
        .host
        .surface(handle)
        .unwrap()
        .action(AlertAction::Snooze)
        .unwrap()
        .request
        .clone();
    h.host.press(snooze);
    h.pump(t2, MonotonicInstant::now());

    assert!(h.host.surface(handle).is_none());
    let armed = h.host.armed_wake(handle).unwrap();
    assert_eq!(armed.at, t2 + chrono::Duration::minutes(5));

    // Firing re-validates and shows the snooze decoration
    h.fire(handle, armed.at);
    let surface = h.host.surface(handle).unwrap();
    assert_eq!(surface.title, "🔄 Dentist");
}

#[test]
fn scenario_c_completed_before_snooze_fires() {
    let mut h = Harness::new(R1_OPEN, None);
    let handle = h.engine.schedule_alert("r1", Some("Dentist"), "", T).unwrap();
    h.fire(handle, at(T));

    let snooze = h
        .host
        .surface(handle)
        .unwrap()
        .action(AlertAction::Snooze)
        .unwrap()
        .request
        .clone();
    h.host.press(snooze);
    h.pump(at(T + 1_000), MonotonicInstant::now());
    h.engine.drain_events();

    // Completed in the app while snoozed
    h.set_reminders(R1_DONE);
    h.fire(handle, at(T + 301_000));

    assert_eq!(h.host.visible_surfaces(), 0);
    assert_eq!(h.host.posted_surfaces().len(), 1);
    assert!(!h.engine.is_surface_visible(handle));
    assert!(matches!(
        h.engine.drain_events().as_slice(),
        [CoreEvent::AlertSuppressed { .. }]
    ));
}

#[test]
fn scenario_d_alarm_auto_stops_after_a_minute() {
    let mut h = Harness::new(
        R1_OPEN,
        Some(r#"{"alarmMode":true,"ringtone":"gentle","vibrationEnabled":true}"#),
    );
    let handle = h.engine.schedule_alert("r1", Some("Dentist"), "", T).unwrap();
    h.fire(handle, at(T));

    let session = h.engine.active_session().unwrap();
    let sid = session.session_id.clone();
    assert_eq!(session.handle, handle);
    assert_eq!(h.host.auto_stop_armed(&sid), Some(Duration::from_secs(60)));
    assert!(h.host.audio_playing().is_some());
    assert!(h.host.vibrating());
    assert_eq!(h.host.surface(handle).unwrap().style, SurfaceStyle::Alarm);
    assert_eq!(h.engine.surface_style(handle), Some(SurfaceStyle::Alarm));

    assert!(h.host.elapse_auto_stop(&sid));
    h.pump(at(T + 60_000), MonotonicInstant::now());

    assert!(h.engine.active_session().is_none());
    assert!(h.host.audio_playing().is_none());
    assert!(!h.host.vibrating());
    assert!(h.host.surface(handle).is_none());

    let stopped = h
        .engine
        .drain_events()
        .into_iter()
        .find_map(|e| match e {
            CoreEvent::AlarmStopped { reason, .. } => Some(reason),
            _ => None,
        });
    assert_eq!(stopped, Some(StopReason::Timeout));
}

#[test]
fn cancel_before_trigger_means_no_alert() {
    let mut h = Harness::new(R1_OPEN, None);
    let handle = h.engine.schedule_alert("r1", None, "", T).unwrap();
    let token = h.host.armed_wake(handle).unwrap().token;

    h.engine
        .cancel_alert("r1", MonotonicInstant::now())
        .unwrap();
    assert!(h.host.armed_wake(handle).is_none());

    // Even a wake that raced the cancel is dropped
    h.engine
        .handle(Trigger::WakeFired(token), at(T), MonotonicInstant::now());
    assert_eq!(h.host.posted_surfaces().len(), 0);
}

#[test]
fn absent_reminder_causes_no_activity() {
    let mut h = Harness::new("[]", Some(r#"{"alarmMode":true}"#));
    let handle = h.engine.schedule_alert("r1", None, "", T).unwrap();
    h.host.clear_calls();

    h.fire(handle, at(T));

    assert!(!h.host.calls().iter().any(|c| matches!(
        c,
        MockCall::PostSurface(_) | MockCall::StartAudio(_) | MockCall::StartVibration
    )));
    assert_eq!(h.host.visible_surfaces(), 0);
    assert!(h.engine.active_session().is_none());
}

#[test]
fn stop_releases_outputs_for_every_reason() {
    for reason in ["action", "timeout", "teardown", "cancel"] {
        let mut h = Harness::new(R1_OPEN, Some(r#"{"alarmMode":true,"vibrationEnabled":true}"#));
        let handle = h.engine.schedule_alert("r1", None, "", T).unwrap();
        h.fire(handle, at(T));
        let sid = h.engine.active_session().unwrap().session_id.clone();
        let mono = MonotonicInstant::now();

        match reason {
            "action" => {
                let stop = h
                    .host
                    .surface(handle)
                    .unwrap()
                    .action(AlertAction::Stop)
                    .unwrap()
                    .request
                    .clone();
                h.engine.handle(Trigger::Action(stop), at(T), mono);
            }
            "timeout" => h.engine.handle(Trigger::AutoStopElapsed(sid), at(T), mono),
            "teardown" => h.engine.handle(Trigger::Teardown, at(T), mono),
            _ => h.engine.cancel_alert("r1", mono).unwrap(),
        }

        assert!(h.host.audio_playing().is_none(), "{reason}");
        assert!(!h.host.vibrating(), "{reason}");
        assert_eq!(
            h.engine.snapshot(mono).alarm_state,
            AlarmState::Idle,
            "{reason}"
        );
    }
}

#[test]
fn dropping_engine_releases_outputs() {
    let mut h = Harness::new(R1_OPEN, Some(r#"{"alarmMode":true}"#));
    let handle = h.engine.schedule_alert("r1", None, "", T).unwrap();
    h.fire(handle, at(T));
    assert!(h.host.audio_playing().is_some());

    let Harness { host, engine, .. } = h;
    drop(engine);
    assert!(host.audio_playing().is_none());
}

#[test]
fn cancel_twice_is_a_noop() {
    let mut h = Harness::new(R1_OPEN, None);
    h.engine.schedule_alert("r1", None, "", T).unwrap();
    let mono = MonotonicInstant::now();

    h.engine.cancel_alert("r1", mono).unwrap();
    h.engine.drain_events();

    h.engine.cancel_alert("r1", mono).unwrap();
    assert!(h.engine.drain_events().is_empty());
    assert!(h.host.armed_wakes().is_empty());
}

#[test]
fn colliding_ids_get_distinct_handles() {
    // "Aa" and "BB" share the same derived hash
    let mut h = Harness::new(
        r#"[{"id":"Aa","isCompleted":false},{"id":"BB","isCompleted":false}]"#,
        None,
    );
    let a = h.engine.schedule_alert("Aa", Some("A"), "", T).unwrap();
    let b = h.engine.schedule_alert("BB", Some("B"), "", T).unwrap();
    assert_ne!(a, b);
    assert_eq!(h.host.armed_wakes().len(), 2);

    h.fire(a, at(T));
    h.fire(b, at(T));
    assert_eq!(h.host.surface(a).unwrap().title, "⏰ A");
    assert_eq!(h.host.surface(b).unwrap().title, "⏰ B");
}

#[test]
fn denied_exact_wakes_fall_back() {
    let mut h = Harness::new(R1_OPEN, None);
    h.host.set_deny_exact(true);

    let handle = h.engine.schedule_alert("r1", None, "", T).unwrap();
    assert_eq!(
        h.host.armed_wake(handle).unwrap().precision,
        promemoria_api::WakePrecision::Inexact
    );

    h.fire(handle, at(T));
    assert!(h.host.surface(handle).is_some());
}

#[test]
fn audit_trail_records_lifecycle() {
    let mut h = Harness::new(R1_OPEN, None);
    let handle = h.engine.schedule_alert("r1", None, "", T).unwrap();
    h.fire(handle, at(T));

    let complete = h
        .host
        .surface(handle)
        .unwrap()
        .action(AlertAction::Complete)
        .unwrap()
        .request
        .clone();
    h.host.press(complete);
    h.pump(at(T + 1000), MonotonicInstant::now());

    let audits = h.store.recent_audits(10).unwrap();
    let kinds: Vec<_> = audits.iter().map(|a| &a.event).collect();
    assert!(matches!(kinds[0], AuditEventType::Completed { .. }));
    assert!(matches!(
        kinds[1],
        AuditEventType::AlertFired {
            kind: AlertKind::Primary,
            alarm_mode: false,
            ..
        }
    ));
    assert!(matches!(kinds[2], AuditEventType::AlertScheduled { .. }));
}

#[test]
fn restart_restores_pending_wakes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        store.set(REMINDERS_KEY, R1_OPEN).unwrap();
        let host = Arc::new(MockHost::new());
        let mut engine = AlertEngine::new(EngineOptions::default(), store, host);
        engine.schedule_alert("r1", Some("Dentist"), "", T).unwrap();
    }

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let host = Arc::new(MockHost::new());
    let mut engine = AlertEngine::new(EngineOptions::default(), store, host.clone());
    assert_eq!(engine.restore(), 1);

    let handle = engine.handle_for(&"r1".into());
    let token = host.fire_wake(handle).unwrap();
    engine.handle(Trigger::WakeFired(token), at(T), MonotonicInstant::now());
    assert_eq!(host.surface(handle).unwrap().title, "⏰ Dentist");
}
