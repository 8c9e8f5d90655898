//! Read-only view of the reminder application's store

use promemoria_api::SuppressReason;
use promemoria_store::{load_user_name, lookup_reminder, NotificationSettings, Store};
use promemoria_util::ReminderId;
use std::sync::Arc;
use tracing::warn;

/// Outcome of an existence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderPresence {
    Present { completed: bool },
    Absent,
}

impl ReminderPresence {
    /// Why an alert for this reminder must not be shown, if it must not
    pub fn suppress_reason(&self) -> Option<SuppressReason> {
        match self {
            Self::Present { completed: false } => None,
            Self::Present { completed: true } => Some(SuppressReason::Completed),
            Self::Absent => Some(SuppressReason::Absent),
        }
    }
}

/// Snapshot reads of the externally-owned store. No locking: a reminder
/// edited between the read and the alert is an accepted race.
pub struct ReminderStateReader {
    store: Arc<dyn Store>,
}

impl ReminderStateReader {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn exists(&self, id: &ReminderId) -> ReminderPresence {
        if id.is_ephemeral() {
            return ReminderPresence::Present { completed: false };
        }

        match lookup_reminder(self.store.as_ref(), id) {
            Ok(Some(reminder)) => ReminderPresence::Present {
                completed: reminder.is_completed,
            },
            Ok(None) => ReminderPresence::Absent,
            Err(e) => {
                // Fail open
                warn!(reminder_id = %id, error = %e, "Reminder state unreadable, assuming present");
                ReminderPresence::Present { completed: false }
            }
        }
    }

    pub fn settings(&self) -> NotificationSettings {
        NotificationSettings::load(self.store.as_ref())
    }

    pub fn user_name(&self) -> Option<String> {
        load_user_name(self.store.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promemoria_store::{SqliteStore, REMINDERS_KEY};

    fn reader_with(reminders: Option<&str>) -> ReminderStateReader {
        let store = SqliteStore::in_memory().unwrap();
        if let Some(json) = reminders {
            store.set(REMINDERS_KEY, json).unwrap();
        }
        ReminderStateReader::new(Arc::new(store))
    }

    #[test]
    fn present_and_completed() {
        let reader = reader_with(Some(
            r#"[{"id":"r1","isCompleted":false},{"id":"r2","isCompleted":true}]"#,
        ));

        assert_eq!(
            reader.exists(&"r1".into()),
            ReminderPresence::Present { completed: false }
        );
        assert_eq!(
            reader.exists(&"r2".into()),
            ReminderPresence::Present { completed: true }
        );
        assert_eq!(reader.exists(&"r3".into()), ReminderPresence::Absent);
    }

    #[test]
    fn missing_key_is_absent() {
        let reader = reader_with(None);
        assert_eq!(reader.exists(&"r1".into()), ReminderPresence::Absent);
    }

    #[test]
    fn malformed_fails_open() {
        let reader = reader_with(Some("{not an array"));
        assert_eq!(
            reader.exists(&"r1".into()),
            ReminderPresence::Present { completed: false }
        );
    }

    #[test]
    fn partly_corrupt_list_fails_open() {
        let reader = reader_with(Some(r#"["garbage", {"id":"r2"}]"#));
        assert_eq!(
            reader.exists(&"r1".into()),
            ReminderPresence::Present { completed: false }
        );

        // The bad element comes before the match, so the completed flag is never trusted
        let reader = reader_with(Some(r#"[{"id":"r0"}, 17, {"id":"r1","isCompleted":true}]"#));
        assert_eq!(
            reader.exists(&"r1".into()),
            ReminderPresence::Present { completed: false }
        );
    }

    #[test]
    fn loosely_typed_fields_are_coerced() {
        let reader = reader_with(Some(r#"[{"id":"r1","isCompleted":"true"},{"id":7}]"#));
        assert_eq!(
            reader.exists(&"r1".into()),
            ReminderPresence::Present { completed: true }
        );
        assert_eq!(
            reader.exists(&"7".into()),
            ReminderPresence::Present { completed: false }
        );
    }

    #[test]
    fn ephemeral_ids_are_always_present() {
        let reader = reader_with(Some("[]"));
        assert_eq!(
            reader.exists(&"test-1700000000000".into()),
            ReminderPresence::Present { completed: false }
        );
        assert_eq!(
            reader.exists(&"".into()),
            ReminderPresence::Present { completed: false }
        );
    }

    #[test]
    fn suppress_reasons() {
        assert_eq!(ReminderPresence::Absent.suppress_reason(), Some(SuppressReason::Absent));
        assert_eq!(
            ReminderPresence::Present { completed: true }.suppress_reason(),
            Some(SuppressReason::Completed)
        );
        assert_eq!(ReminderPresence::Present { completed: false }.suppress_reason(), None);
    }
}
