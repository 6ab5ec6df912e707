//! Interfaces to the collaborators the panel core reads from.
//!
//! Layers follow a base contract plus optional capabilities. A missing
//! capability has an explicit default: no `Coverage` means valid everywhere,
//! no `RenderGate` means rendered at every zoom, no `LocalPhotoSet` means no
//! local data.

use std::path::PathBuf;
use std::rc::Rc;

use crate::models::{Extent, Mode};

/// Whether a layer has imagery for the visible area.
pub trait Coverage {
    fn valid_here(&self, extent: &Extent, zoom: f64) -> bool;
}

/// Whether a layer actually draws anything at a zoom level.
pub trait RenderGate {
    fn rendered(&self, zoom: f64) -> bool;
}

/// Capability of the local-photos layer.
pub trait LocalPhotoSet {
    fn has_data(&self) -> bool;
    /// Ask the map to zoom to the loaded photos.
    fn fit_zoom(&self);
    fn set_file_list(&self, files: Vec<PathBuf>);
}

pub trait Layer {
    fn id(&self) -> &str;

    /// Whether the backing service is usable at all.
    fn supported(&self) -> bool {
        true
    }

    /// Layers that carry no visibility state report disabled.
    fn enabled(&self) -> bool {
        false
    }

    fn set_enabled(&self, _enabled: bool) {}

    fn coverage(&self) -> Option<&dyn Coverage> {
        None
    }

    fn render_gate(&self) -> Option<&dyn RenderGate> {
        None
    }

    fn local_photos(&self) -> Option<&dyn LocalPhotoSet> {
        None
    }
}

pub trait LayerRegistry {
    fn layer(&self, id: &str) -> Option<Rc<dyn Layer>>;
    fn all(&self) -> Vec<Rc<dyn Layer>>;
}

/// Photo filtering state as seen by the panel.
pub trait PhotoService {
    fn overlay_layer_ids(&self) -> Vec<String>;

    fn all_photo_types(&self) -> Vec<String>;
    fn should_filter_by_photo_type(&self) -> bool;
    fn shows_photo_type(&self, photo_type: &str) -> bool;
    fn toggle_photo_type(&self, photo_type: &str);

    fn date_filters(&self) -> Vec<String>;
    fn should_filter_by_date(&self) -> bool;
    fn date_filter_value(&self, member: &str) -> Option<String>;
    fn set_date_filter(&self, member: &str, value: &str, commit: bool);

    fn should_filter_by_username(&self) -> bool;
    fn usernames(&self) -> Option<Vec<String>>;
    fn set_username_filter(&self, raw: &str, commit: bool);
}

pub trait ModeController {
    fn mode_id(&self) -> String;
    fn enter(&self, mode: Mode);
}

pub trait MapView {
    fn extent(&self) -> Extent;
    fn zoom(&self) -> f64;
}

/// Everything the panel needs from the surrounding editor.
pub trait EditorContext {
    fn layers(&self) -> &dyn LayerRegistry;
    fn photos(&self) -> &dyn PhotoService;
    fn mode(&self) -> &dyn ModeController;
    fn map(&self) -> &dyn MapView;
}
