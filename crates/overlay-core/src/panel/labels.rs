//! Localization keys for panel controls. Translation itself happens in the host.

pub const MINZOOM_TOOLTIP: &str = "street_side.minzoom_tooltip";
pub const USERNAME_FILTER_TITLE: &str = "photo_overlays.username_filter.title";
pub const USERNAME_FILTER_TOOLTIP: &str = "photo_overlays.username_filter.tooltip";
pub const LOCAL_PHOTOS_HEADER: &str = "local_photos.header";
pub const LOCAL_PHOTOS_TOOLTIP: &str = "local_photos.tooltip";

fn underscored(id: &str) -> String {
    id.replace('-', "_")
}

pub fn photo_source_tooltip_key(layer_id: &str) -> String {
    match layer_id {
        "mapillary-signs" => "mapillary.signs.tooltip".to_string(),
        "mapillary" => "mapillary_images.tooltip".to_string(),
        "kartaview" => "kartaview_images.tooltip".to_string(),
        other => format!("{}.tooltip", underscored(other)),
    }
}

pub fn photo_source_label_key(layer_id: &str) -> String {
    match layer_id {
        "mapillary-signs" => "photo_overlays.traffic_signs.title".to_string(),
        other => format!("{}.title", underscored(other)),
    }
}

pub fn photo_type_label_key(photo_type: &str) -> String {
    format!("photo_overlays.photo_type.{photo_type}.title")
}

pub fn photo_type_tooltip_key(photo_type: &str) -> String {
    format!("photo_overlays.photo_type.{photo_type}.tooltip")
}

pub fn date_filter_label_key(member: &str) -> String {
    format!("photo_overlays.date_filter.{member}.title")
}

pub fn date_filter_tooltip_key(member: &str) -> String {
    format!("photo_overlays.date_filter.{member}.tooltip")
}
