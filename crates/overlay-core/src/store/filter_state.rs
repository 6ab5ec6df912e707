//! Photo filter state: which photo types, date range and usernames are active.
//!
//! Each category persists as its own preference blob. Whether a category is
//! applied at all is derived from which photo layers are shown, so turning a
//! layer off suppresses a filter without clearing its stored values.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::NaiveDate;

use crate::constants::{pref_keys, DATE_FILTERS, FROM_DATE, OVERLAY_LAYER_IDS, PHOTO_TYPES, TO_DATE};
use crate::context::{LayerRegistry, PhotoService};
use crate::prefs::{blob, PreferenceStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq)]
struct FilterValues {
    shown_types: BTreeMap<String, bool>,
    dates: BTreeMap<String, NaiveDate>,
    usernames: Vec<String>,
    /// Changed in memory since the last commit
    dates_dirty: bool,
    usernames_dirty: bool,
}

pub struct FilterState {
    store: Rc<PreferenceStore>,
    layers: Rc<dyn LayerRegistry>,
    overlay_layer_ids: Vec<String>,
    photo_types: Vec<String>,
    values: RefCell<FilterValues>,
}

impl FilterState {
    /// Fresh state with every photo type shown and no date or username filter.
    pub fn new(store: Rc<PreferenceStore>, layers: Rc<dyn LayerRegistry>) -> Self {
        Self {
            store,
            layers,
            overlay_layer_ids: OVERLAY_LAYER_IDS.iter().map(|id| id.to_string()).collect(),
            photo_types: PHOTO_TYPES.iter().map(|t| t.to_string()).collect(),
            values: RefCell::new(FilterValues::default()),
        }
    }

    /// State restored from the persisted filter blobs.
    pub fn load(store: Rc<PreferenceStore>, layers: Rc<dyn LayerRegistry>) -> Self {
        let state = Self::new(store, layers);
        {
            let mut values = state.values.borrow_mut();

            let stored_types: BTreeMap<String, bool> =
                blob::read_map(&state.store, pref_keys::PHOTO_TYPES_FILTER);
            values.shown_types = stored_types
                .into_iter()
                .filter(|(photo_type, _)| state.photo_types.contains(photo_type))
                .collect();

            let stored_dates: BTreeMap<String, String> =
                blob::read_map(&state.store, pref_keys::PHOTO_DATE_FILTER);
            values.dates = stored_dates
                .into_iter()
                .filter(|(member, _)| DATE_FILTERS.contains(&member.as_str()))
                .filter_map(|(member, raw)| parse_date(&raw).map(|date| (member, date)))
                .collect();
            // A hand-edited blob may hold an inverted range. The start wins.
            order_date_range(&mut values.dates, FROM_DATE);

            values.usernames = blob::read_list(&state.store, pref_keys::PHOTO_USERNAME_FILTER)
                .iter()
                .flat_map(|raw| parse_usernames(raw))
                .collect();
        }
        state
    }

    fn shows_layer(&self, id: &str) -> bool {
        self.layers
            .layer(id)
            .map(|layer| layer.supported() && layer.enabled())
            .unwrap_or(false)
    }

    /// Set a photo type's visibility. Returns whether anything changed.
    pub fn set_photo_type_shown(&self, photo_type: &str, shown: bool) -> bool {
        if !self.photo_types.iter().any(|t| t == photo_type) {
            tracing::debug!(photo_type, "ignoring unknown photo type");
            return false;
        }
        if self.shows_photo_type(photo_type) == shown {
            return false;
        }

        self.values
            .borrow_mut()
            .shown_types
            .insert(photo_type.to_string(), shown);
        self.persist_photo_types();
        true
    }

    fn persist_photo_types(&self) {
        let mapping: BTreeMap<String, bool> = self
            .photo_types
            .iter()
            .map(|t| (t.clone(), self.shows_photo_type(t)))
            .collect();
        blob::write_map(&self.store, pref_keys::PHOTO_TYPES_FILTER, &mapping);
    }

    fn persist_dates(&self) {
        let mapping: BTreeMap<String, String> = self
            .values
            .borrow()
            .dates
            .iter()
            .map(|(member, date)| (member.clone(), date.format(DATE_FORMAT).to_string()))
            .collect();
        if blob::write_map(&self.store, pref_keys::PHOTO_DATE_FILTER, &mapping) {
            self.values.borrow_mut().dates_dirty = false;
        }
    }

    fn persist_usernames(&self) {
        let usernames = self.values.borrow().usernames.clone();
        if blob::write_list(&self.store, pref_keys::PHOTO_USERNAME_FILTER, &usernames) {
            self.values.borrow_mut().usernames_dirty = false;
        }
    }
}

/// Parse a `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Split a username field on `;` or `,`, dropping blanks.
pub fn parse_usernames(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl PhotoService for FilterState {
    fn overlay_layer_ids(&self) -> Vec<String> {
        self.overlay_layer_ids.clone()
    }

    fn all_photo_types(&self) -> Vec<String> {
        self.photo_types.clone()
    }

    fn should_filter_by_photo_type(&self) -> bool {
        self.shows_layer("mapillary")
            || (self.shows_layer("streetside") && self.shows_layer("kartaview"))
            || self.shows_layer("vegbilder")
            || self.shows_layer("panoramax")
    }

    fn shows_photo_type(&self, photo_type: &str) -> bool {
        if !self.photo_types.iter().any(|t| t == photo_type) {
            return false;
        }
        self.values
            .borrow()
            .shown_types
            .get(photo_type)
            .copied()
            .unwrap_or(true)
    }

    fn toggle_photo_type(&self, photo_type: &str) {
        let shown = self.shows_photo_type(photo_type);
        self.set_photo_type_shown(photo_type, !shown);
    }

    fn date_filters(&self) -> Vec<String> {
        DATE_FILTERS.iter().map(|d| d.to_string()).collect()
    }

    fn should_filter_by_date(&self) -> bool {
        ["mapillary", "kartaview", "streetside", "vegbilder", "panoramax"]
            .iter()
            .any(|id| self.shows_layer(id))
    }

    fn date_filter_value(&self, member: &str) -> Option<String> {
        self.values
            .borrow()
            .dates
            .get(member)
            .map(|date| date.format(DATE_FORMAT).to_string())
    }

    fn set_date_filter(&self, member: &str, value: &str, commit: bool) {
        if !DATE_FILTERS.contains(&member) {
            tracing::debug!(member, "ignoring unknown date filter");
            return;
        }

        let dirty = {
            let mut values = self.values.borrow_mut();
            let before = values.dates.clone();

            match parse_date(value) {
                Some(date) => {
                    values.dates.insert(member.to_string(), date);
                }
                None => {
                    values.dates.remove(member);
                }
            }

            order_date_range(&mut values.dates, member);

            if values.dates != before {
                values.dates_dirty = true;
            }
            values.dates_dirty
        };

        if commit && dirty {
            self.persist_dates();
        }
    }

    fn should_filter_by_username(&self) -> bool {
        (self.shows_layer("kartaview")
            && !self.shows_layer("mapillary")
            && !self.shows_layer("streetside"))
            || self.shows_layer("panoramax")
    }

    fn usernames(&self) -> Option<Vec<String>> {
        let values = self.values.borrow();
        if values.usernames.is_empty() {
            None
        } else {
            Some(values.usernames.clone())
        }
    }

    fn set_username_filter(&self, raw: &str, commit: bool) {
        let dirty = {
            let mut values = self.values.borrow_mut();
            let usernames = parse_usernames(raw);
            if values.usernames != usernames {
                values.usernames = usernames;
                values.usernames_dirty = true;
            }
            values.usernames_dirty
        };

        if commit && dirty {
            self.persist_usernames();
        }
    }
}

/// Drag the end opposite `anchor` along when the range is inverted.
fn order_date_range(dates: &mut BTreeMap<String, NaiveDate>, anchor: &str) {
    let from = dates.get(FROM_DATE).copied();
    let to = dates.get(TO_DATE).copied();
    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            if anchor == FROM_DATE {
                dates.insert(TO_DATE.to_string(), from);
            } else {
                dates.insert(FROM_DATE.to_string(), to);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayerDescriptor, LayerSet};
    use std::cell::Cell;

    fn layers(enabled: &[&str]) -> Rc<LayerSet> {
        let layers = OVERLAY_LAYER_IDS
            .iter()
            .map(|id| {
                LayerDescriptor::new(*id)
                    .with_enabled(enabled.contains(id))
                    .into_rc()
            })
            .collect();
        Rc::new(LayerSet::new(layers))
    }

    fn state_with(enabled: &[&str]) -> (Rc<PreferenceStore>, FilterState) {
        let store = Rc::new(PreferenceStore::in_memory());
        let state = FilterState::new(store.clone(), layers(enabled));
        (store, state)
    }

    #[test]
    fn test_parse_usernames() {
        assert_eq!(parse_usernames("alice; bob;carol"), vec!["alice", "bob", "carol"]);
        assert_eq!(parse_usernames("  alice ,bob  "), vec!["alice", "bob"]);
        assert_eq!(parse_usernames(";;  ; "), Vec::<String>::new());
        assert!(parse_usernames("").is_empty());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(" 2021-03-04 "), NaiveDate::from_ymd_opt(2021, 3, 4));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2021-13-01"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_all_types_shown_by_default() {
        let (_, state) = state_with(&[]);
        assert!(state.shows_photo_type("flat"));
        assert!(state.shows_photo_type("panoramic"));
        assert!(!state.shows_photo_type("fisheye"));
    }

    #[test]
    fn test_toggle_photo_type_persists_whole_mapping() {
        let (store, state) = state_with(&["mapillary"]);

        state.toggle_photo_type("panoramic");
        assert!(!state.shows_photo_type("panoramic"));
        assert_eq!(
            store.get("photoTypesFilter").as_deref(),
            Some(r#"{"flat":true,"panoramic":false}"#)
        );

        state.toggle_photo_type("panoramic");
        assert!(state.shows_photo_type("panoramic"));
        assert_eq!(
            store.get("photoTypesFilter").as_deref(),
            Some(r#"{"flat":true,"panoramic":true}"#)
        );
    }

    #[test]
    fn test_set_photo_type_shown_is_idempotent() {
        let (store, state) = state_with(&[]);
        let writes = Rc::new(Cell::new(0));
        let w = writes.clone();
        store.on_change("photoTypesFilter", move |_| w.set(w.get() + 1));

        assert!(state.set_photo_type_shown("flat", false));
        assert!(!state.set_photo_type_shown("flat", false));
        assert_eq!(writes.get(), 1);
        assert!(!state.set_photo_type_shown("fisheye", false));
    }

    #[test]
    fn test_date_filter_commit_controls_persistence() {
        let (store, state) = state_with(&["mapillary"]);

        state.set_date_filter("fromDate", "2020-05-01", false);
        assert_eq!(state.date_filter_value("fromDate").as_deref(), Some("2020-05-01"));
        assert_eq!(store.get("photoDateFilter"), None);

        // Committing the same value still writes what was typed earlier
        state.set_date_filter("fromDate", "2020-05-01", true);
        assert_eq!(
            store.get("photoDateFilter").as_deref(),
            Some(r#"{"fromDate":"2020-05-01"}"#)
        );
    }

    #[test]
    fn test_date_filter_commit_is_idempotent() {
        let (store, state) = state_with(&[]);
        let writes = Rc::new(Cell::new(0));
        let w = writes.clone();
        store.on_change("photoDateFilter", move |_| w.set(w.get() + 1));

        state.set_date_filter("toDate", "2022-01-31", true);
        state.set_date_filter("toDate", "2022-01-31", true);
        assert_eq!(writes.get(), 1);
    }

    #[test]
    fn test_invalid_or_empty_date_clears_member() {
        let (_, state) = state_with(&[]);
        state.set_date_filter("fromDate", "2020-05-01", true);
        state.set_date_filter("fromDate", "not a date", true);
        assert_eq!(state.date_filter_value("fromDate"), None);

        state.set_date_filter("toDate", "2020-05-01", true);
        state.set_date_filter("toDate", "", true);
        assert_eq!(state.date_filter_value("toDate"), None);
    }

    #[test]
    fn test_date_range_stays_ordered() {
        let (_, state) = state_with(&[]);
        state.set_date_filter("toDate", "2020-01-10", true);
        state.set_date_filter("fromDate", "2020-02-01", true);
        assert_eq!(state.date_filter_value("toDate").as_deref(), Some("2020-02-01"));

        state.set_date_filter("toDate", "2019-12-31", true);
        assert_eq!(state.date_filter_value("fromDate").as_deref(), Some("2019-12-31"));
    }

    #[test]
    fn test_unknown_date_member_is_ignored() {
        let (store, state) = state_with(&[]);
        state.set_date_filter("someDate", "2020-01-01", true);
        assert_eq!(state.date_filter_value("someDate"), None);
        assert_eq!(store.get("photoDateFilter"), None);
    }

    #[test]
    fn test_username_filter_roundtrip() {
        let (store, state) = state_with(&["kartaview"]);
        state.set_username_filter("alice; bob", true);
        assert_eq!(
            state.usernames(),
            Some(vec!["alice".to_string(), "bob".to_string()])
        );
        assert_eq!(
            store.get("photoUsernameFilter").as_deref(),
            Some(r#"["alice","bob"]"#)
        );

        state.set_username_filter("   ", true);
        assert_eq!(state.usernames(), None);
        assert_eq!(store.get("photoUsernameFilter"), None);
    }

    #[test]
    fn test_activation_follows_shown_layers() {
        let (_, none) = state_with(&[]);
        assert!(!none.should_filter_by_photo_type());
        assert!(!none.should_filter_by_date());
        assert!(!none.should_filter_by_username());

        let (_, mapillary) = state_with(&["mapillary"]);
        assert!(mapillary.should_filter_by_photo_type());
        assert!(mapillary.should_filter_by_date());
        assert!(!mapillary.should_filter_by_username());

        let (_, kartaview) = state_with(&["kartaview"]);
        assert!(!kartaview.should_filter_by_photo_type());
        assert!(kartaview.should_filter_by_date());
        assert!(kartaview.should_filter_by_username());

        let (_, both) = state_with(&["streetside", "kartaview"]);
        assert!(both.should_filter_by_photo_type());
        assert!(!both.should_filter_by_username());
    }

    #[test]
    fn test_disabled_category_keeps_values() {
        let store = Rc::new(PreferenceStore::in_memory());
        let layer_set = layers(&["kartaview"]);
        let state = FilterState::new(store.clone(), layer_set.clone());
        state.set_username_filter("alice", true);

        layer_set.layer("kartaview").unwrap().set_enabled(false);
        assert!(!state.should_filter_by_username());
        assert_eq!(state.usernames(), Some(vec!["alice".to_string()]));
        assert!(store.get("photoUsernameFilter").is_some());
    }

    #[test]
    fn test_load_restores_persisted_filters() {
        let store = Rc::new(PreferenceStore::in_memory());
        store.set("photoTypesFilter", r#"{"flat":false,"fisheye":true}"#);
        store.set("photoDateFilter", r#"{"fromDate":"2021-06-01","toDate":"garbage","x":"2020-01-01"}"#);
        store.set("photoUsernameFilter", r#"["alice"," bob "]"#);

        let state = FilterState::load(store, layers(&[]));
        assert!(!state.shows_photo_type("flat"));
        assert!(state.shows_photo_type("panoramic"));
        assert_eq!(state.date_filter_value("fromDate").as_deref(), Some("2021-06-01"));
        assert_eq!(state.date_filter_value("toDate"), None);
        assert_eq!(
            state.usernames(),
            Some(vec!["alice".to_string(), "bob".to_string()])
        );
    }

    #[test]
    fn test_load_orders_inverted_date_range() {
        let store = Rc::new(PreferenceStore::in_memory());
        store.set("photoDateFilter", r#"{"fromDate":"2022-03-01","toDate":"2021-01-01"}"#);

        let state = FilterState::load(store.clone(), layers(&[]));
        assert_eq!(state.date_filter_value("fromDate").as_deref(), Some("2022-03-01"));
        assert_eq!(state.date_filter_value("toDate").as_deref(), Some("2022-03-01"));
        // Loading alone does not rewrite the stored blob
        assert_eq!(
            store.get("photoDateFilter").as_deref(),
            Some(r#"{"fromDate":"2022-03-01","toDate":"2021-01-01"}"#)
        );
    }

    #[test]
    fn test_load_tolerates_corrupt_blobs() {
        let store = Rc::new(PreferenceStore::in_memory());
        store.set("photoTypesFilter", "{");
        store.set("photoDateFilter", "[]");
        store.set("photoUsernameFilter", "42");

        let state = FilterState::load(store, layers(&[]));
        assert!(state.shows_photo_type("flat"));
        assert_eq!(state.date_filter_value("fromDate"), None);
        assert_eq!(state.usernames(), None);
    }
}
