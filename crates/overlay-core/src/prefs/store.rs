use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::storage::{FileStorage, MemoryStorage, StorageBackend};
use crate::config::CoreConfig;

/// Callback invoked with the newly written value.
pub type ChangeHandler = Rc<dyn Fn(&str)>;

/// Tri-state write used by callers that carry an "absent / remove / value"
/// decision around as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefUpdate {
    /// Leave the key as it is. Only checks that the storage is readable.
    Keep,
    Remove,
    Value(String),
}

/// Observable key/value preference store.
///
/// One instance is created per process and shared by reference (`Rc`). All
/// methods take `&self`: the backend and listener registry live behind
/// `RefCell`s that are never borrowed across a listener call, so a listener
/// may freely read or write the store again.
pub struct PreferenceStore {
    backend: RefCell<Box<dyn StorageBackend>>,
    listeners: RefCell<HashMap<String, Vec<ChangeHandler>>>,
}

impl PreferenceStore {
    /// Bind to the durable file for `config`'s origin, or fall back to memory.
    pub fn open(config: &CoreConfig) -> Self {
        let path = config.prefs_path();
        match FileStorage::open(&path, config.quota_bytes) {
            Ok(storage) => Self::with_backend(Box::new(storage)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "durable preference storage unavailable, falling back to memory"
                );
                Self::in_memory()
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(MemoryStorage::new()))
    }

    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend: RefCell::new(backend),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    pub fn is_durable(&self) -> bool {
        self.backend.borrow().is_durable()
    }

    /// Current value for `key`. Read failures look like a missing key.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.backend.borrow().get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key, error = %e, "preference read failed");
                None
            }
        }
    }

    /// Persist `value` under `key` and notify listeners.
    ///
    /// Returns `false` if the value could not be saved; listeners are not
    /// called in that case.
    pub fn set(&self, key: &str, value: &str) -> bool {
        let result = self.backend.borrow_mut().set_item(key, value);
        match result {
            Ok(()) => {
                self.notify(key, value);
                true
            }
            Err(e) => {
                tracing::error!(key, error = %e, "failed to save preference");
                false
            }
        }
    }

    /// Remove `key`. Listeners are only told about written values, not removals.
    pub fn remove(&self, key: &str) -> bool {
        let result = self.backend.borrow_mut().remove_item(key);
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to remove preference");
                false
            }
        }
    }

    pub fn update(&self, key: &str, update: PrefUpdate) -> bool {
        match update {
            PrefUpdate::Keep => self.backend.borrow().get_item(key).is_ok(),
            PrefUpdate::Remove => self.remove(key),
            PrefUpdate::Value(value) => self.set(key, &value),
        }
    }

    /// Register `handler` for successful writes to `key`.
    ///
    /// Handlers accumulate; registering never replaces an earlier one.
    pub fn on_change<F>(&self, key: &str, handler: F)
    where
        F: Fn(&str) + 'static,
    {
        self.listeners
            .borrow_mut()
            .entry(key.to_string())
            .or_default()
            .push(Rc::new(handler));
    }

    pub fn keys(&self) -> Vec<String> {
        self.backend.borrow().keys()
    }

    fn notify(&self, key: &str, value: &str) {
        // Snapshot so handlers can register further handlers or write again
        let handlers: Vec<ChangeHandler> = self
            .listeners
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_default();

        for handler in handlers {
            handler(value);
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("durable", &self.is_durable())
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    proptest! {
        #[test]
        fn test_set_then_get_returns_value(key in any::<String>(), value in any::<String>()) {
            let store = PreferenceStore::in_memory();
            prop_assert!(store.set(&key, &value));
            prop_assert_eq!(store.get(&key), Some(value));
        }

        #[test]
        fn test_remove_then_get_is_absent(
            key in any::<String>(),
            value in any::<String>(),
            other in any::<String>(),
        ) {
            prop_assume!(key != other);
            let store = PreferenceStore::in_memory();
            store.set(&key, &value);
            store.set(&other, &value);

            prop_assert!(store.remove(&key));
            prop_assert_eq!(store.get(&key), None);
            prop_assert_eq!(store.get(&other), Some(value));
        }

        #[test]
        fn test_last_write_wins(key in "[a-zA-Z]{1,16}", values in prop::collection::vec(any::<String>(), 1..6)) {
            let dir = tempdir().unwrap();
            let config = CoreConfig::new(dir.path());
            {
                let store = PreferenceStore::open(&config);
                for value in &values {
                    prop_assert!(store.set(&key, value));
                }
            }
            let reopened = PreferenceStore::open(&config);
            let got = reopened.get(&key);
            prop_assert_eq!(got.as_ref(), values.last());
        }
    }

    #[test]
    fn test_remove_then_get_returns_none() {
        let store = PreferenceStore::in_memory();
        store.set("dataLayers", "{}");
        assert!(store.remove("dataLayers"));
        assert_eq!(store.get("dataLayers"), None);
        // Removing an absent key is still a success
        assert!(store.remove("dataLayers"));
    }

    #[test]
    fn test_keep_is_a_pure_read() {
        let store = PreferenceStore::in_memory();
        assert!(store.update("photoTypesFilter", PrefUpdate::Keep));
        assert_eq!(store.get("photoTypesFilter"), None);

        assert!(store.update(
            "photoTypesFilter",
            PrefUpdate::Value(r#"{"flat":true}"#.to_string())
        ));
        assert_eq!(
            store.get("photoTypesFilter").as_deref(),
            Some(r#"{"flat":true}"#)
        );

        assert!(store.update("photoTypesFilter", PrefUpdate::Remove));
        assert_eq!(store.get("photoTypesFilter"), None);
    }

    #[test]
    fn test_the_string_undefined_is_an_ordinary_value() {
        let store = PreferenceStore::in_memory();
        assert!(store.set("k", "undefined"));
        assert_eq!(store.get("k").as_deref(), Some("undefined"));
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let store = PreferenceStore::in_memory();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = log.clone();
            store.on_change("dataLayers", move |value| {
                log.borrow_mut().push(format!("{}:{}", name, value));
            });
        }

        assert!(store.set("dataLayers", "{}"));
        assert_eq!(
            *log.borrow(),
            vec!["first:{}", "second:{}", "third:{}"]
        );
    }

    #[test]
    fn test_listeners_only_hear_their_key() {
        let store = PreferenceStore::in_memory();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        store.on_change("a", move |_| c.set(c.get() + 1));

        store.set("b", "x");
        assert_eq!(calls.get(), 0);
        store.set("a", "x");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_removal_does_not_notify() {
        let store = PreferenceStore::in_memory();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        store.on_change("a", move |_| c.set(c.get() + 1));

        store.set("a", "x");
        store.remove("a");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failed_write_returns_false_and_skips_listeners() {
        let dir = tempdir().unwrap();
        let config = CoreConfig::new(dir.path()).with_quota_bytes(8);
        let store = PreferenceStore::open(&config);
        assert!(store.is_durable());

        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        store.on_change("k", move |_| c.set(c.get() + 1));

        assert!(store.set("k", "ok"));
        assert!(!store.set("k", "much too long for the quota"));
        assert_eq!(calls.get(), 1);
        // The last durable value is still what a read returns
        assert_eq!(store.get("k").as_deref(), Some("ok"));
    }

    #[test]
    fn test_listener_may_write_back_into_store() {
        let store = Rc::new(PreferenceStore::in_memory());
        let inner = Rc::downgrade(&store);
        store.on_change("source", move |value| {
            if let Some(store) = inner.upgrade() {
                store.set("mirror", value);
            }
        });

        store.set("source", "hello");
        assert_eq!(store.get("mirror").as_deref(), Some("hello"));
    }

    #[test]
    fn test_open_falls_back_to_memory_when_unavailable() {
        let dir = tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let store = PreferenceStore::open(&CoreConfig::new(&blocker));
        assert!(!store.is_durable());
        assert!(store.set("k", "v"));
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_read_only_file_keeps_saved_values() {
        let dir = tempdir().unwrap();
        let config = CoreConfig::new(dir.path()).with_origin("frozen");
        {
            let store = PreferenceStore::open(&config);
            assert!(store.set("dataLayers", r#"{"osm":true}"#));
        }
        let prefs_path = config.prefs_path();
        std::fs::create_dir(prefs_path.with_extension("json.tmp")).unwrap();

        let store = PreferenceStore::open(&config);
        assert!(store.is_durable());
        assert_eq!(store.get("dataLayers").as_deref(), Some(r#"{"osm":true}"#));
        assert!(!store.set("dataLayers", "{}"));
        assert!(!store.remove("dataLayers"));
        assert_eq!(store.get("dataLayers").as_deref(), Some(r#"{"osm":true}"#));
    }

    #[test]
    fn test_open_reloads_previous_session() {
        let dir = tempdir().unwrap();
        let config = CoreConfig::new(dir.path()).with_origin("session");

        {
            let store = PreferenceStore::open(&config);
            store.set("dataLayers", r#"{"osm":true}"#);
        }

        let store = PreferenceStore::open(&config);
        assert_eq!(store.get("dataLayers").as_deref(), Some(r#"{"osm":true}"#));
    }
}
