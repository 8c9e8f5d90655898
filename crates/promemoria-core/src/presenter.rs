//! Alert surfaces: building, posting and removing them

use promemoria_api::{ActionRequest, AlertAction, AlertKind, SurfaceStyle};
use promemoria_host_api::{HostAdapter, SurfaceAction, SurfaceSpec};
use promemoria_util::{AlertError, AlertHandle, ReminderId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PRIMARY_DECORATION: &str = "⏰";
pub const SNOOZE_DECORATION: &str = "🔄";

pub const COMPLETE_LABEL: &str = "✓ Done";
pub const SNOOZE_LABEL: &str = "⏰ 5 min";

/// What an alert is about. `title` is always the undecorated title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertContent {
    pub handle: AlertHandle,
    pub reminder_id: ReminderId,
    pub title: String,
    pub body: String,
}

impl AlertContent {
    /// The payload a surface button hands back for `action`
    pub fn request(&self, action: AlertAction) -> ActionRequest {
        ActionRequest {
            action,
            handle: self.handle,
            reminder_id: self.reminder_id.clone(),
            title: self.title.clone(),
            body: self.body.clone(),
        }
    }
}

/// Remove any leading run of decoration glyphs (and the whitespace after
/// them) from a title
pub fn strip_decoration(title: &str) -> &str {
    let mut rest = title.trim_start();
    loop {
        let stripped = rest
            .strip_prefix(PRIMARY_DECORATION)
            .or_else(|| rest.strip_prefix(SNOOZE_DECORATION));
        match stripped {
            Some(after) => rest = after.trim_start(),
            None => return rest,
        }
    }
}

pub fn decoration_for(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::Primary => PRIMARY_DECORATION,
        AlertKind::Snooze => SNOOZE_DECORATION,
    }
}

/// The title as shown to the user: decoration, then the greeting when a
/// user name is known, then the plain title
pub fn display_title(title: &str, decoration: &str, user_name: Option<&str>) -> String {
    let title = strip_decoration(title);
    match user_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("{decoration} Hey {name}! {title}"),
        None => format!("{decoration} {title}"),
    }
}

/// Persistent reminder surface with Complete and Snooze buttons
pub fn reminder_surface(
    content: &AlertContent,
    kind: AlertKind,
    user_name: Option<&str>,
) -> SurfaceSpec {
    SurfaceSpec {
        handle: content.handle,
        reminder_id: content.reminder_id.clone(),
        title: display_title(&content.title, decoration_for(kind), user_name),
        body: content.body.clone(),
        style: SurfaceStyle::Reminder,
        persistent: true,
        actions: vec![
            SurfaceAction {
                label: COMPLETE_LABEL.into(),
                request: content.request(AlertAction::Complete),
            },
            SurfaceAction {
                label: SNOOZE_LABEL.into(),
                request: content.request(AlertAction::Snooze),
            },
        ],
        open_on_tap: true,
    }
}

/// Ongoing alarm surface. The "done" button only silences the alarm; the
/// reminder itself stays open.
pub fn alarm_surface(content: &AlertContent, user_name: Option<&str>) -> SurfaceSpec {
    SurfaceSpec {
        handle: content.handle,
        reminder_id: content.reminder_id.clone(),
        title: display_title(&content.title, PRIMARY_DECORATION, user_name),
        body: content.body.clone(),
        style: SurfaceStyle::Alarm,
        persistent: true,
        actions: vec![
            SurfaceAction {
                label: COMPLETE_LABEL.into(),
                request: content.request(AlertAction::Stop),
            },
            SurfaceAction {
                label: SNOOZE_LABEL.into(),
                request: content.request(AlertAction::Snooze),
            },
        ],
        open_on_tap: true,
    }
}

/// Owns every surface the service has put on screen
pub struct NotificationPresenter {
    host: Arc<dyn HostAdapter>,
    visible: HashMap<AlertHandle, SurfaceStyle>,
}

impl NotificationPresenter {
    pub fn new(host: Arc<dyn HostAdapter>) -> Self {
        Self {
            host,
            visible: HashMap::new(),
        }
    }

    /// Post a surface, replacing whatever was shown for its handle. A host
    /// without a working notification service drops the alert; returns
    /// whether the surface is now visible.
    pub fn show(&mut self, spec: &SurfaceSpec) -> bool {
        match self.host.post_surface(spec) {
            Ok(()) => {
                info!(
                    handle = %spec.handle,
                    reminder_id = %spec.reminder_id,
                    style = ?spec.style,
                    "Surface posted"
                );
                self.visible.insert(spec.handle, spec.style);
                true
            }
            Err(e) => {
                warn!(
                    handle = %spec.handle,
                    error = %AlertError::surface(e.to_string()),
                    "Alert dropped"
                );
                self.visible.remove(&spec.handle);
                false
            }
        }
    }

    /// Remove the surface for `handle`. The host is always asked; returns
    /// whether a surface was visible.
    pub fn cancel(&mut self, handle: AlertHandle) -> bool {
        if let Err(e) = self.host.cancel_surface(handle) {
            warn!(handle = %handle, error = %e, "Failed to cancel surface");
        }

        let was_visible = self.visible.remove(&handle).is_some();
        if was_visible {
            debug!(handle = %handle, "Surface cancelled");
        }
        was_visible
    }

    pub fn is_visible(&self, handle: AlertHandle) -> bool {
        self.visible.contains_key(&handle)
    }

    pub fn style_of(&self, handle: AlertHandle) -> Option<SurfaceStyle> {
        self.visible.get(&handle).copied()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promemoria_host_api::{MockCall, MockHost};

    fn content() -> AlertContent {
        AlertContent {
            handle: AlertHandle::new(3583).unwrap(),
            reminder_id: ReminderId::new("r1"),
            title: "Dentist".into(),
            body: "10:30".into(),
        }
    }

    #[test]
    fn strip_removes_leading_glyph_runs() {
        assert_eq!(strip_decoration("⏰ Dentist"), "Dentist");
        assert_eq!(strip_decoration("🔄 ⏰ Dentist"), "Dentist");
        assert_eq!(strip_decoration("🔄🔄Dentist"), "Dentist");
        assert_eq!(strip_decoration("Dentist ⏰"), "Dentist ⏰");
        assert_eq!(strip_decoration(""), "");
    }

    #[test]
    fn display_title_personalises() {
        assert_eq!(display_title("Dentist", "⏰", None), "⏰ Dentist");
        assert_eq!(
            display_title("Dentist", "🔄", Some("Ada")),
            "🔄 Hey Ada! Dentist"
        );
        assert_eq!(display_title("Dentist", "⏰", Some("  ")), "⏰ Dentist");
        // Redecorating never stacks glyphs
        assert_eq!(display_title("⏰ Dentist", "🔄", None), "🔄 Dentist");
    }

    #[test]
    fn reminder_surface_carries_plain_payloads() {
        let spec = reminder_surface(&content(), AlertKind::Snooze, Some("Ada"));

        assert_eq!(spec.title, "🔄 Hey Ada! Dentist");
        assert_eq!(spec.style, SurfaceStyle::Reminder);
        assert!(spec.persistent);
        assert!(spec.open_on_tap);

        let complete = spec.action(AlertAction::Complete).unwrap();
        assert_eq!(complete.label, COMPLETE_LABEL);
        assert_eq!(complete.request.title, "Dentist");
        assert_eq!(complete.request.body, "10:30");

        let snooze = spec.action(AlertAction::Snooze).unwrap();
        assert_eq!(snooze.label, SNOOZE_LABEL);
        assert_eq!(snooze.request.reminder_id, ReminderId::new("r1"));
    }

    #[test]
    fn alarm_surface_offers_stop_and_snooze() {
        let spec = alarm_surface(&content(), None);

        assert_eq!(spec.style, SurfaceStyle::Alarm);
        assert_eq!(spec.title, "⏰ Dentist");
        assert!(spec.action(AlertAction::Stop).is_some());
        assert!(spec.action(AlertAction::Snooze).is_some());
        assert!(spec.action(AlertAction::Complete).is_none());
    }

    #[test]
    fn show_and_cancel() {
        let host = Arc::new(MockHost::new());
        let mut presenter = NotificationPresenter::new(host.clone());
        let spec = reminder_surface(&content(), AlertKind::Primary, None);

        assert!(presenter.show(&spec));
        assert!(presenter.is_visible(spec.handle));
        assert_eq!(host.surface(spec.handle).unwrap().title, "⏰ Dentist");

        assert!(presenter.cancel(spec.handle));
        assert!(!presenter.cancel(spec.handle));
        assert!(host.surface(spec.handle).is_none());
        assert_eq!(
            host.calls()
                .iter()
                .filter(|c| matches!(c, MockCall::CancelSurface(_)))
                .count(),
            2
        );
    }

    #[test]
    fn failed_post_drops_alert() {
        let host = Arc::new(MockHost::new());
        host.set_fail_surface(true);
        let mut presenter = NotificationPresenter::new(host.clone());

        let spec = reminder_surface(&content(), AlertKind::Primary, None);
        assert!(!presenter.show(&spec));
        assert_eq!(presenter.visible_count(), 0);
        assert_eq!(host.visible_surfaces(), 0);
    }
}
