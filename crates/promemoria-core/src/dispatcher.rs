//! Handling of fired wakes

use chrono::{DateTime, Local};
use promemoria_api::{StopReason, SuppressReason};
use promemoria_host_api::WakeToken;
use promemoria_store::AuditEventType;
use promemoria_util::MonotonicInstant;
use tracing::{debug, info};

use crate::{reminder_surface, AlertContent, AlertEngine, CoreEvent};

impl AlertEngine {
    /// A wake reached its trigger time. Primary and snooze firings take the
    /// same path: the reminder is re-validated before anything is shown.
    pub(crate) fn on_wake_fired(
        &mut self,
        token: WakeToken,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) {
        let Some(alarm) = self.scheduler.take_fired(token) else {
            debug!(handle = %token.handle, generation = token.generation, "Stale wake dropped");
            return;
        };
        // Clears whatever the host may still hold for this handle
        self.scheduler.cancel(alarm.handle);
        self.persist_schedule();

        let kind = alarm.payload.kind;
        let content = AlertContent {
            handle: alarm.handle,
            reminder_id: alarm.payload.reminder_id,
            title: alarm.payload.title,
            body: alarm.payload.body,
        };

        if let Some(reason) = self.reader.exists(&content.reminder_id).suppress_reason() {
            self.suppress(&content, reason, now_mono);
            return;
        }

        let settings = self.reader.settings();
        let user_name = self.reader.user_name();

        info!(
            handle = %content.handle,
            reminder_id = %content.reminder_id,
            kind = ?kind,
            alarm_mode = settings.alarm_mode,
            "Wake fired"
        );

        if settings.alarm_mode {
            self.start_alarm(&content, &settings, user_name.as_deref(), now, now_mono);
        } else {
            let spec = reminder_surface(&content, kind, user_name.as_deref());
            self.show_surface(&spec);
        }

        self.audit(AuditEventType::AlertFired {
            handle: content.handle,
            reminder_id: content.reminder_id,
            kind,
            alarm_mode: settings.alarm_mode,
        });
    }

    /// The reminder is gone or done: leave nothing on screen or ringing
    fn suppress(
        &mut self,
        content: &AlertContent,
        reason: SuppressReason,
        now_mono: MonotonicInstant,
    ) {
        self.cancel_surface(content.handle);
        self.stop_alarm_for(content.handle, StopReason::Reconciled, now_mono);

        info!(
            handle = %content.handle,
            reminder_id = %content.reminder_id,
            reason = ?reason,
            "Alert suppressed"
        );

        self.emit(CoreEvent::AlertSuppressed {
            handle: content.handle,
            reminder_id: content.reminder_id.clone(),
            reason,
        });
        self.audit(AuditEventType::AlertSuppressed {
            handle: content.handle,
            reminder_id: content.reminder_id.clone(),
            reason,
        });
    }
}
