pub mod config;
pub mod constants;
pub mod context;
pub mod models;
pub mod panel;
pub mod prefs;
pub mod reconcile;
pub mod scheduler;
pub mod store;
pub mod visibility;

pub use config::{ConfigError, CoreConfig};
pub use context::{
    Coverage, EditorContext, Layer, LayerRegistry, LocalPhotoSet, MapView, ModeController,
    PhotoService, RenderGate,
};
pub use models::{
    BoundsCoverage, Editor, Extent, LayerDescriptor, LayerSet, LocalPhotoFiles, MapState, MinZoom,
    Mode, ModeState,
};
pub use panel::{PanelEvent, PhotoOverlaysPanel, SectionId, SectionPatches};
pub use prefs::{PrefUpdate, PreferenceStore};
pub use reconcile::{partition, ControlItem, ControlState, Partition, Patch, RenderedList};
pub use scheduler::{Debouncer, IdleQueue, RecomputeScheduler};
pub use store::FilterState;
pub use visibility::{is_layer_shown, restore_layers, set_layer_visibility, toggle_layer};
