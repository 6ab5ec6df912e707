//! Typed access to the JSON blobs kept under individual preference keys.
//!
//! The on-disk shape stays a flat string-keyed JSON object (or array), but
//! callers only ever see typed maps. Missing or malformed blobs decode to the
//! empty value; nothing here returns an error.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::PreferenceStore;

pub fn read_map<V: DeserializeOwned>(store: &PreferenceStore, key: &str) -> BTreeMap<String, V> {
    let Some(raw) = store.get(key) else {
        return BTreeMap::new();
    };
    match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed preference blob");
            BTreeMap::new()
        }
    }
}

pub fn write_map<V: Serialize>(store: &PreferenceStore, key: &str, map: &BTreeMap<String, V>) -> bool {
    match serde_json::to_string(map) {
        Ok(json) => store.set(key, &json),
        Err(e) => {
            tracing::error!(key, error = %e, "failed to encode preference blob");
            false
        }
    }
}

/// Read-modify-write of a single entry, keeping every other entry as stored.
pub fn merge_entry<V>(store: &PreferenceStore, key: &str, entry: &str, value: V) -> bool
where
    V: Serialize + DeserializeOwned,
{
    let mut map: BTreeMap<String, V> = read_map(store, key);
    map.insert(entry.to_string(), value);
    write_map(store, key, &map)
}

pub fn read_list(store: &PreferenceStore, key: &str) -> Vec<String> {
    let Some(raw) = store.get(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed preference list");
            Vec::new()
        }
    }
}

/// An empty list removes the key rather than storing `[]`.
pub fn write_list(store: &PreferenceStore, key: &str, list: &[String]) -> bool {
    if list.is_empty() {
        return store.remove(key);
    }
    match serde_json::to_string(list) {
        Ok(json) => store.set(key, &json),
        Err(e) => {
            tracing::error!(key, error = %e, "failed to encode preference list");
            false
        }
    }
}
