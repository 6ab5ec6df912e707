//! Per-section data and state rules.
//!
//! Each section computes its logical list from the editor context and knows
//! how to turn one datum into a control. The lists are recomputed on every
//! pass. Nothing here mutates the context.

use std::rc::Rc;

use crate::constants::{LOCAL_PHOTOS_KEY, LOCAL_PHOTOS_LAYER, USERNAME_FILTER_KEY};
use crate::context::{EditorContext, Layer};
use crate::reconcile::{ControlItem, ControlState, InputKind, SectionRules};

use super::labels;

const INDENTED_SOURCES: [&str; 2] = ["mapillary-signs", "mapillary-map-features"];

fn layer_enabled(layer: &dyn Layer) -> bool {
    layer.supported() && layer.enabled()
}

/// Photo source layers that exist, are online and are either on or have imagery here.
pub struct PhotoSources<'a> {
    ctx: &'a dyn EditorContext,
}

impl<'a> PhotoSources<'a> {
    pub fn new(ctx: &'a dyn EditorContext) -> Self {
        Self { ctx }
    }

    pub fn data(&self) -> Vec<Rc<dyn Layer>> {
        let photo_ids = self.ctx.photos().overlay_layer_ids();
        let map = self.ctx.map();
        self.ctx
            .layers()
            .all()
            .into_iter()
            .filter(|layer| photo_ids.iter().any(|id| id == layer.id()))
            .filter(|layer| {
                if !layer.supported() {
                    return false;
                }
                if layer.enabled() {
                    return true;
                }
                layer
                    .coverage()
                    .map(|coverage| coverage.valid_here(&map.extent(), map.zoom()))
                    .unwrap_or(true)
            })
            .collect()
    }

    fn rendered(&self, layer: &dyn Layer) -> bool {
        layer
            .render_gate()
            .map(|gate| gate.rendered(self.ctx.map().zoom()))
            .unwrap_or(true)
    }
}

impl SectionRules<Rc<dyn Layer>> for PhotoSources<'_> {
    fn key(&self, layer: &Rc<dyn Layer>) -> String {
        layer.id().to_string()
    }

    fn enter(&self, layer: &Rc<dyn Layer>) -> ControlItem {
        let id = layer.id();
        let mut classes = vec!["list-item-photos".to_string(), format!("list-item-{id}")];
        if INDENTED_SOURCES.contains(&id) {
            classes.push("indented".to_string());
        }
        ControlItem::new(id, labels::photo_source_label_key(id), InputKind::Checkbox)
            .with_classes(classes)
    }

    fn update(&self, layer: &Rc<dyn Layer>) -> ControlState {
        let enabled = layer_enabled(layer.as_ref());
        let rendered = self.rendered(layer.as_ref());
        let tooltip = if rendered {
            labels::photo_source_tooltip_key(layer.id())
        } else {
            labels::MINZOOM_TOOLTIP.to_string()
        };
        ControlState {
            active: enabled,
            checked: enabled,
            disabled: !rendered,
            tooltip,
            ..Default::default()
        }
    }
}

/// Photo type checkboxes, listed only while the type filter applies.
pub struct PhotoTypes<'a> {
    ctx: &'a dyn EditorContext,
}

impl<'a> PhotoTypes<'a> {
    pub fn new(ctx: &'a dyn EditorContext) -> Self {
        Self { ctx }
    }

    pub fn data(&self) -> Vec<String> {
        let photos = self.ctx.photos();
        if photos.should_filter_by_photo_type() {
            photos.all_photo_types()
        } else {
            Vec::new()
        }
    }
}

impl SectionRules<String> for PhotoTypes<'_> {
    fn key(&self, photo_type: &String) -> String {
        photo_type.clone()
    }

    fn enter(&self, photo_type: &String) -> ControlItem {
        ControlItem::new(
            photo_type.as_str(),
            labels::photo_type_label_key(photo_type),
            InputKind::Checkbox,
        )
        .with_classes(["list-item-photo-types".to_string(), format!("list-item-{photo_type}")])
    }

    fn update(&self, photo_type: &String) -> ControlState {
        let shown = self.ctx.photos().shows_photo_type(photo_type);
        ControlState {
            active: shown,
            checked: shown,
            tooltip: labels::photo_type_tooltip_key(photo_type),
            ..Default::default()
        }
    }
}

/// `fromDate` and `toDate` inputs, listed only while the date filter applies.
pub struct DateFilter<'a> {
    ctx: &'a dyn EditorContext,
}

impl<'a> DateFilter<'a> {
    pub fn new(ctx: &'a dyn EditorContext) -> Self {
        Self { ctx }
    }

    pub fn data(&self) -> Vec<String> {
        let photos = self.ctx.photos();
        if photos.should_filter_by_date() {
            photos.date_filters()
        } else {
            Vec::new()
        }
    }
}

impl SectionRules<String> for DateFilter<'_> {
    fn key(&self, member: &String) -> String {
        member.clone()
    }

    fn enter(&self, member: &String) -> ControlItem {
        ControlItem::new(member.as_str(), labels::date_filter_label_key(member), InputKind::Date)
            .with_classes(["list-item-date-filter"])
    }

    fn update(&self, member: &String) -> ControlState {
        let value = self.ctx.photos().date_filter_value(member);
        ControlState {
            active: value.is_some(),
            tooltip: labels::date_filter_tooltip_key(member),
            value: Some(value.unwrap_or_default()),
            ..Default::default()
        }
    }
}

/// Single username input, listed only while the username filter applies.
pub struct UsernameFilter<'a> {
    ctx: &'a dyn EditorContext,
}

impl<'a> UsernameFilter<'a> {
    pub fn new(ctx: &'a dyn EditorContext) -> Self {
        Self { ctx }
    }

    pub fn data(&self) -> Vec<&'static str> {
        if self.ctx.photos().should_filter_by_username() {
            vec![USERNAME_FILTER_KEY]
        } else {
            Vec::new()
        }
    }
}

impl SectionRules<&'static str> for UsernameFilter<'_> {
    fn key(&self, key: &&'static str) -> String {
        key.to_string()
    }

    fn enter(&self, key: &&'static str) -> ControlItem {
        ControlItem::new(*key, labels::USERNAME_FILTER_TITLE, InputKind::Text)
            .with_classes(["list-item-username-filter"])
    }

    fn update(&self, _key: &&'static str) -> ControlState {
        let usernames = self.ctx.photos().usernames();
        ControlState {
            active: usernames.as_ref().is_some_and(|names| !names.is_empty()),
            tooltip: labels::USERNAME_FILTER_TOOLTIP.to_string(),
            value: usernames.map(|names| names.join("; ")),
            ..Default::default()
        }
    }
}

/// Row for photos loaded from disk, present only when the layer exists.
pub struct LocalPhotos<'a> {
    ctx: &'a dyn EditorContext,
}

impl<'a> LocalPhotos<'a> {
    pub fn new(ctx: &'a dyn EditorContext) -> Self {
        Self { ctx }
    }

    pub fn data(&self) -> Vec<Rc<dyn Layer>> {
        self.ctx
            .layers()
            .layer(LOCAL_PHOTOS_LAYER)
            .into_iter()
            .collect()
    }
}

impl SectionRules<Rc<dyn Layer>> for LocalPhotos<'_> {
    fn key(&self, _layer: &Rc<dyn Layer>) -> String {
        LOCAL_PHOTOS_KEY.to_string()
    }

    fn enter(&self, _layer: &Rc<dyn Layer>) -> ControlItem {
        ControlItem::new(LOCAL_PHOTOS_KEY, labels::LOCAL_PHOTOS_HEADER, InputKind::Checkbox)
            .with_classes(["list-item-local-photos"])
    }

    fn update(&self, layer: &Rc<dyn Layer>) -> ControlState {
        let has_data = layer
            .local_photos()
            .map(|photos| photos.has_data())
            .unwrap_or(false);
        let shows_data = has_data && layer.enabled();
        ControlState {
            active: shows_data,
            checked: shows_data,
            disabled: !has_data,
            deemphasized: !has_data,
            tooltip: labels::LOCAL_PHOTOS_TOOLTIP.to_string(),
            actions_disabled: !has_data,
            value: None,
        }
    }
}
