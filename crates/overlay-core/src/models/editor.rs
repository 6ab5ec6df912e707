use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::context::{EditorContext, LayerRegistry, MapView, ModeController, PhotoService};
use crate::models::{Extent, LayerSet, Mode};
use crate::store::FilterState;

/// Current interaction mode plus the transitions it went through.
#[derive(Debug)]
pub struct ModeState {
    current: RefCell<Mode>,
    history: RefCell<Vec<Mode>>,
}

impl ModeState {
    pub fn new(mode: Mode) -> Self {
        Self {
            current: RefCell::new(mode),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Modes entered through [`ModeController::enter`], oldest first.
    pub fn history(&self) -> Vec<Mode> {
        self.history.borrow().clone()
    }
}

impl Default for ModeState {
    fn default() -> Self {
        Self::new(Mode::browse())
    }
}

impl ModeController for ModeState {
    fn mode_id(&self) -> String {
        self.current.borrow().id.clone()
    }

    fn enter(&self, mode: Mode) {
        tracing::debug!(from = %self.current.borrow().id, to = %mode.id, "entering mode");
        self.history.borrow_mut().push(mode.clone());
        *self.current.borrow_mut() = mode;
    }
}

#[derive(Debug)]
pub struct MapState {
    extent: Cell<Extent>,
    zoom: Cell<f64>,
}

impl MapState {
    pub fn new(extent: Extent, zoom: f64) -> Self {
        Self {
            extent: Cell::new(extent),
            zoom: Cell::new(zoom),
        }
    }

    /// Move the viewport. The caller is responsible for reporting the move to the panel.
    pub fn set_view(&self, extent: Extent, zoom: f64) {
        self.extent.set(extent);
        self.zoom.set(zoom);
    }
}

impl Default for MapState {
    fn default() -> Self {
        Self::new(Extent::world(), 2.0)
    }
}

impl MapView for MapState {
    fn extent(&self) -> Extent {
        self.extent.get()
    }

    fn zoom(&self) -> f64 {
        self.zoom.get()
    }
}

/// In-process editor context wiring a layer set, filter state, mode and map together.
pub struct Editor {
    pub layers: Rc<LayerSet>,
    pub photos: Rc<FilterState>,
    pub mode: ModeState,
    pub map: MapState,
}

impl Editor {
    pub fn new(layers: Rc<LayerSet>, photos: Rc<FilterState>) -> Self {
        Self {
            layers,
            photos,
            mode: ModeState::default(),
            map: MapState::default(),
        }
    }
}

impl EditorContext for Editor {
    fn layers(&self) -> &dyn LayerRegistry {
        self.layers.as_ref()
    }

    fn photos(&self) -> &dyn PhotoService {
        self.photos.as_ref()
    }

    fn mode(&self) -> &dyn ModeController {
        &self.mode
    }

    fn map(&self) -> &dyn MapView {
        &self.map
    }
}
