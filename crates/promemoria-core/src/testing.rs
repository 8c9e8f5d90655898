//! Shared fixtures for the engine tests

use promemoria_host_api::MockHost;
use promemoria_store::{SqliteStore, Store, REMINDERS_KEY, SETTINGS_KEY, USER_NAME_KEY};
use std::sync::Arc;

use crate::{AlertEngine, EngineOptions};

/// `reminders` JSON for `(id, completed)` pairs
pub fn reminders_json(reminders: &[(&str, bool)]) -> String {
    let items: Vec<_> = reminders
        .iter()
        .map(|(id, done)| serde_json::json!({"id": id, "title": id, "isCompleted": done}))
        .collect();
    serde_json::Value::Array(items).to_string()
}

pub fn engine_with(reminders: Option<&str>) -> (Arc<MockHost>, Arc<SqliteStore>, AlertEngine) {
    let host = Arc::new(MockHost::new());
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    if let Some(json) = reminders {
        store.set(REMINDERS_KEY, json).unwrap();
    }
    let engine = AlertEngine::new(EngineOptions::default(), store.clone(), host.clone());
    (host, store, engine)
}

pub fn set_settings(store: &SqliteStore, json: &str) {
    store.set(SETTINGS_KEY, json).unwrap();
}

pub fn set_user_name(store: &SqliteStore, name: &str) {
    store
        .set(USER_NAME_KEY, &serde_json::to_string(name).unwrap())
        .unwrap();
}
