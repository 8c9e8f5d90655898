//! Surface actions: snooze, complete, stop and start

use chrono::{DateTime, Local};
use promemoria_api::{ActionRequest, AlertAction, AlertKind, StopReason};
use promemoria_store::AuditEventType;
use promemoria_util::MonotonicInstant;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{strip_decoration, AlertContent, AlertEngine, AlertPayload, CoreEvent};

/// Snooze always reschedules relative to the moment the action was taken
pub const SNOOZE_DELAY: Duration = Duration::from_secs(5 * 60);

impl AlertEngine {
    pub(crate) fn on_action(
        &mut self,
        request: ActionRequest,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) {
        let handle = if request.reminder_id.is_empty() {
            request.handle
        } else {
            self.registry.handle_for(&request.reminder_id)
        };
        if handle != request.handle {
            // Surface posted under a handle this process did not allocate
            debug!(posted = %request.handle, resolved = %handle, "Action handle remapped");
            self.cancel_surface(request.handle);
        }

        let content = AlertContent {
            handle,
            reminder_id: request.reminder_id,
            title: strip_decoration(&request.title).to_string(),
            body: request.body,
        };

        info!(
            handle = %handle,
            reminder_id = %content.reminder_id,
            action = ?request.action,
            "Action received"
        );

        match request.action {
            AlertAction::Snooze => self.snooze(content, now, now_mono),
            AlertAction::Complete => self.complete(content, now_mono),
            AlertAction::Stop => {
                self.stop_alarm(StopReason::UserAction, now_mono);
                self.cancel_surface(handle);
            }
            AlertAction::Start => self.start_requested(content, now, now_mono),
        }
    }

    fn snooze(&mut self, content: AlertContent, now: DateTime<Local>, now_mono: MonotonicInstant) {
        self.cancel_surface(content.handle);
        self.cancel_wake(content.handle);
        self.stop_alarm_for(content.handle, StopReason::UserAction, now_mono);

        if let Some(reason) = self.reader.exists(&content.reminder_id).suppress_reason() {
            info!(
                handle = %content.handle,
                reminder_id = %content.reminder_id,
                reason = ?reason,
                "Snooze dropped"
            );
            return;
        }

        let until = promemoria_util::add_duration(now, self.options.snooze_delay);
        let payload = AlertPayload {
            reminder_id: content.reminder_id.clone(),
            title: content.title,
            body: content.body,
            kind: AlertKind::Snooze,
        };

        if let Err(e) = self.schedule_wake(content.handle, until, payload) {
            warn!(handle = %content.handle, error = %e, "Snooze could not be scheduled");
            return;
        }

        self.emit(CoreEvent::Snoozed {
            handle: content.handle,
            reminder_id: content.reminder_id.clone(),
            until,
        });
        self.audit(AuditEventType::Snoozed {
            handle: content.handle,
            reminder_id: content.reminder_id,
            until,
        });
    }

    fn complete(&mut self, content: AlertContent, now_mono: MonotonicInstant) {
        self.cancel_surface(content.handle);
        self.cancel_wake(content.handle);
        self.stop_alarm_for(content.handle, StopReason::UserAction, now_mono);

        self.emit(CoreEvent::Completed {
            handle: content.handle,
            reminder_id: content.reminder_id.clone(),
        });
        self.audit(AuditEventType::Completed {
            handle: content.handle,
            reminder_id: content.reminder_id,
        });
    }

    fn start_requested(
        &mut self,
        content: AlertContent,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) {
        if let Some(reason) = self.reader.exists(&content.reminder_id).suppress_reason() {
            info!(handle = %content.handle, reason = ?reason, "Start ignored");
            self.cancel_surface(content.handle);
            return;
        }

        let settings = self.reader.settings();
        let user_name = self.reader.user_name();
        self.start_alarm(&content, &settings, user_name.as_deref(), now, now_mono);
    }
}
