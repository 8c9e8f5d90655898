//! Decoding of the key-value layout written by the reminder application.
//!
//! Everything here is lenient: the layout is owned by another program and
//! the alert path must keep working when it is stale, partial, or corrupt.

use promemoria_api::{AlertKind, Ringtone};
use promemoria_util::{AlertError, ReminderId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{Store, StoreResult};

/// Ordered JSON array of reminders
pub const REMINDERS_KEY: &str = "reminders";

/// `{vibrationEnabled, ringtone, alarmMode}`
pub const SETTINGS_KEY: &str = "notification-settings";

/// Display name used to personalise titles
pub const USER_NAME_KEY: &str = "user-name";

/// Wakes outstanding when the service last changed them. Owned by the
/// service, so they can be re-armed after a restart.
pub const SCHEDULED_ALARMS_KEY: &str = "promemoria/scheduled-alarms";

/// The part of a persisted reminder the alert core reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedReminder {
    pub id: ReminderId,
    pub title: Option<String>,
    pub is_completed: bool,
}

impl PersistedReminder {
    /// Decode one element. Only a non-object is rejected; the fields
    /// themselves are coerced the way the reminder application reads them.
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        Some(Self {
            id: ReminderId::new(coerce_string(object.get("id")).unwrap_or_default()),
            title: coerce_string(object.get("title")),
            is_completed: coerce_bool(object.get("isCompleted")),
        })
    }
}

/// Strings as-is, scalars by their text; null and missing are absent
fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `true` or a case-insensitive `"true"` string; anything else is false
fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Decode the `reminders` value. A value that is not an array, or an
/// element that is not an object, makes the whole list malformed.
pub fn parse_reminders(raw: &str) -> Result<Vec<PersistedReminder>, AlertError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AlertError::malformed(REMINDERS_KEY, e.to_string()))?;

    let items = value
        .as_array()
        .ok_or_else(|| AlertError::malformed(REMINDERS_KEY, "expected an array"))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            PersistedReminder::from_value(item).ok_or_else(|| {
                AlertError::malformed(REMINDERS_KEY, format!("element {index} is not an object"))
            })
        })
        .collect()
}

/// Find a reminder by id. A missing `reminders` key reads as an empty list.
pub fn lookup_reminder(
    store: &dyn Store,
    id: &ReminderId,
) -> Result<Option<PersistedReminder>, AlertError> {
    let raw = store
        .get(REMINDERS_KEY)
        .map_err(|e| AlertError::store(e.to_string()))?;

    let Some(raw) = raw else {
        return Ok(None);
    };

    Ok(parse_reminders(&raw)?.into_iter().find(|r| &r.id == id))
}

/// Notification settings chosen in the reminder application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSettings {
    pub vibration_enabled: bool,
    pub ringtone: Ringtone,
    pub alarm_mode: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            vibration_enabled: false,
            ringtone: Ringtone::Chime,
            alarm_mode: false,
        }
    }
}

impl NotificationSettings {
    /// Decode with per-field fallback to the defaults
    pub fn from_json(raw: &str) -> Self {
        let defaults = Self::default();

        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = SETTINGS_KEY, error = %e, "Malformed settings, using defaults");
                return defaults;
            }
        };

        let Some(object) = value.as_object() else {
            warn!(key = SETTINGS_KEY, "Settings are not an object, using defaults");
            return defaults;
        };

        Self {
            vibration_enabled: object
                .get("vibrationEnabled")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.vibration_enabled),
            ringtone: object
                .get("ringtone")
                .and_then(Value::as_str)
                .map(Ringtone::from_name)
                .unwrap_or(defaults.ringtone),
            alarm_mode: object
                .get("alarmMode")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.alarm_mode),
        }
    }

    /// Read the settings; any failure yields the defaults
    pub fn load(store: &dyn Store) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => Self::from_json(&raw),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(key = SETTINGS_KEY, error = %e, "Settings unreadable, using defaults");
                Self::default()
            }
        }
    }
}

/// Decode the user name. The value may be stored raw or JSON-encoded.
pub fn parse_user_name(raw: &str) -> Option<String> {
    let name = match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(s)) => s,
        Ok(Value::Null) => return None,
        _ => raw.to_string(),
    };

    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Read the user name; blank or unreadable means none
pub fn load_user_name(store: &dyn Store) -> Option<String> {
    match store.get(USER_NAME_KEY) {
        Ok(Some(raw)) => parse_user_name(&raw),
        Ok(None) => None,
        Err(e) => {
            warn!(key = USER_NAME_KEY, error = %e, "User name unreadable");
            None
        }
    }
}

/// A wake as saved across restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAlarm {
    pub reminder_id: ReminderId,
    pub title: String,
    pub body: String,
    pub kind: AlertKind,
    /// Epoch milliseconds
    pub trigger_at: i64,
}

/// Load saved wakes; unreadable state means none
pub fn load_scheduled_alarms(store: &dyn Store) -> Vec<PersistedAlarm> {
    let raw = match store.get(SCHEDULED_ALARMS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key = SCHEDULED_ALARMS_KEY, error = %e, "Saved wakes unreadable");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(alarms) => alarms,
        Err(e) => {
            warn!(key = SCHEDULED_ALARMS_KEY, error = %e, "Saved wakes malformed, discarding");
            Vec::new()
        }
    }
}

pub fn save_scheduled_alarms(store: &dyn Store, alarms: &[PersistedAlarm]) -> StoreResult<()> {
    if alarms.is_empty() {
        return store.remove(SCHEDULED_ALARMS_KEY);
    }
    let json = serde_json::to_string(alarms)?;
    store.set(SCHEDULED_ALARMS_KEY, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteStore;

    #[test]
    fn reminders_are_decoded_leniently() {
        let raw = r#"[
            {"id": "r1", "title": "Dentist", "date": "2025-01-01", "time": "10:00",
             "categoryId": "c", "priority": "high", "isCompleted": false},
            {"id": "r2", "isCompleted": true},
            {"id": 42},
            {"id": "r3", "isCompleted": "yes"},
            {"id": "r4", "isCompleted": "TRUE"},
            {"title": "no id"}
        ]"#;

        let reminders = parse_reminders(raw).unwrap();
        assert_eq!(reminders.len(), 6);
        assert_eq!(reminders[0].title.as_deref(), Some("Dentist"));
        assert!(!reminders[0].is_completed);
        assert!(reminders[1].is_completed);
        assert_eq!(reminders[2].id.as_str(), "42");
        assert!(!reminders[3].is_completed);
        assert!(reminders[4].is_completed);
        assert!(reminders[5].id.is_empty());
    }

    #[test]
    fn non_object_element_makes_list_malformed() {
        for raw in [
            r#"["garbage", {"id": "r2"}]"#,
            r#"[{"id": "r0"}, 17, {"id": "r1", "isCompleted": true}]"#,
            r#"[{"id": "r1"}, null]"#,
        ] {
            assert!(
                matches!(
                    parse_reminders(raw),
                    Err(AlertError::MalformedPersistedState { .. })
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn non_array_reminders_are_malformed() {
        assert!(matches!(
            parse_reminders(r#"{"id":"r1"}"#),
            Err(AlertError::MalformedPersistedState { .. })
        ));
        assert!(matches!(
            parse_reminders("not json"),
            Err(AlertError::MalformedPersistedState { .. })
        ));
    }

    #[test]
    fn lookup_missing_key_is_absent() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(lookup_reminder(&store, &"r1".into()).unwrap(), None);

        store.set(REMINDERS_KEY, r#"[{"id":"r1"}]"#).unwrap();
        assert!(lookup_reminder(&store, &"r1".into()).unwrap().is_some());
        assert!(lookup_reminder(&store, &"r2".into()).unwrap().is_none());
    }

    #[test]
    fn settings_fall_back_per_field() {
        let settings = NotificationSettings::from_json(
            r#"{"vibrationEnabled": "on", "ringtone": "urgent", "alarmMode": true}"#,
        );
        assert!(!settings.vibration_enabled);
        assert_eq!(settings.ringtone, Ringtone::Urgent);
        assert!(settings.alarm_mode);

        assert_eq!(
            NotificationSettings::from_json("{broken"),
            NotificationSettings::default()
        );
        assert_eq!(
            NotificationSettings::from_json(r#"{"ringtone":"kazoo"}"#).ringtone,
            Ringtone::Default
        );
    }

    #[test]
    fn settings_load_defaults_when_missing() {
        let store = SqliteStore::in_memory().unwrap();
        let settings = NotificationSettings::load(&store);
        assert_eq!(settings.ringtone, Ringtone::Chime);
        assert!(!settings.alarm_mode);
    }

    #[test]
    fn scheduled_alarms_survive_reopen() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(load_scheduled_alarms(&store).is_empty());

        let alarm = PersistedAlarm {
            reminder_id: ReminderId::new("r1"),
            title: "Dentist".into(),
            body: "10:30".into(),
            kind: AlertKind::Snooze,
            trigger_at: 1_760_000_000_000,
        };
        save_scheduled_alarms(&store, std::slice::from_ref(&alarm)).unwrap();
        assert_eq!(load_scheduled_alarms(&store), vec![alarm]);

        save_scheduled_alarms(&store, &[]).unwrap();
        assert!(store.get(SCHEDULED_ALARMS_KEY).unwrap().is_none());

        store.set(SCHEDULED_ALARMS_KEY, "garbage").unwrap();
        assert!(load_scheduled_alarms(&store).is_empty());
    }

    #[test]
    fn user_name_raw_or_json() {
        assert_eq!(parse_user_name("Ada").as_deref(), Some("Ada"));
        assert_eq!(parse_user_name(r#""Ada""#).as_deref(), Some("Ada"));
        assert_eq!(parse_user_name(r#""  ""#), None);
        assert_eq!(parse_user_name(""), None);
        assert_eq!(parse_user_name("null"), None);
    }
}
