//! Application-wide constants
//!
//! Centralized location for preference keys, well-known layer ids and the
//! fixed member lists used across the panel sections.

use std::time::Duration;

/// Preference keys. Each one holds an independent JSON blob.
pub mod pref_keys {
    /// Layer id -> visibility (`{"mapillary":true}`)
    pub const DATA_LAYERS: &str = "dataLayers";
    /// Photo type -> shown (`{"flat":true,"panoramic":false}`)
    pub const PHOTO_TYPES_FILTER: &str = "photoTypesFilter";
    /// Date filter member -> ISO date (`{"fromDate":"2021-01-01"}`)
    pub const PHOTO_DATE_FILTER: &str = "photoDateFilter";
    /// JSON array of usernames
    pub const PHOTO_USERNAME_FILTER: &str = "photoUsernameFilter";
}

/// Layers whose disappearance can strand edit-mode state.
pub const PRIMARY_DATA_LAYERS: [&str; 2] = ["osm", "notes"];

pub const LOCAL_PHOTOS_LAYER: &str = "local-photos";

// Interaction modes
pub const BROWSE_MODE: &str = "browse";
/// Any mode id starting with this prefix is an in-progress drawing.
pub const DRAW_MODE_PREFIX: &str = "draw";

/// Photo overlay layers, in the order the photo service reports them.
pub const OVERLAY_LAYER_IDS: [&str; 8] = [
    "streetside",
    "mapillary",
    "mapillary-map-features",
    "mapillary-signs",
    "kartaview",
    "mapilio",
    "vegbilder",
    "panoramax",
];

pub const PHOTO_TYPES: [&str; 2] = ["flat", "panoramic"];

pub const FROM_DATE: &str = "fromDate";
pub const TO_DATE: &str = "toDate";
pub const DATE_FILTERS: [&str; 2] = [FROM_DATE, TO_DATE];

// Identities of the singleton rows
pub const USERNAME_FILTER_KEY: &str = "username-filter";
pub const LOCAL_PHOTOS_KEY: &str = "local-photos";

/// Quiet interval after the last map move before the panel recomputes.
pub const DEFAULT_MOVE_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Same order of magnitude as browser local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;
