use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use crate::context::{Coverage, Layer, LayerRegistry, LocalPhotoSet, RenderGate};
use crate::models::Extent;

/// Layer only draws at or above the given zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinZoom(pub f64);

impl RenderGate for MinZoom {
    fn rendered(&self, zoom: f64) -> bool {
        zoom >= self.0
    }
}

/// Imagery limited to a region and a minimum zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsCoverage {
    pub bounds: Extent,
    pub min_zoom: f64,
}

impl Coverage for BoundsCoverage {
    fn valid_here(&self, extent: &Extent, zoom: f64) -> bool {
        zoom >= self.min_zoom && self.bounds.intersects(extent)
    }
}

/// Photos loaded from the user's machine.
#[derive(Debug, Default)]
pub struct LocalPhotoFiles {
    files: RefCell<Vec<PathBuf>>,
    fit_requests: Cell<u32>,
}

impl LocalPhotoFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.files.borrow().clone()
    }

    /// How many times a zoom-to-data was requested.
    pub fn fit_requests(&self) -> u32 {
        self.fit_requests.get()
    }
}

impl LocalPhotoSet for LocalPhotoFiles {
    fn has_data(&self) -> bool {
        !self.files.borrow().is_empty()
    }

    fn fit_zoom(&self) {
        self.fit_requests.set(self.fit_requests.get() + 1);
    }

    fn set_file_list(&self, files: Vec<PathBuf>) {
        *self.files.borrow_mut() = files;
    }
}

/// Concrete layer with optional capabilities, built fluently.
pub struct LayerDescriptor {
    id: String,
    supported: bool,
    enabled: Cell<bool>,
    coverage: Option<Box<dyn Coverage>>,
    render_gate: Option<Box<dyn RenderGate>>,
    local_photos: Option<Rc<LocalPhotoFiles>>,
}

impl LayerDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supported: true,
            enabled: Cell::new(false),
            coverage: None,
            render_gate: None,
            local_photos: None,
        }
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        self.enabled.set(enabled);
        self
    }

    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    pub fn with_coverage(mut self, coverage: impl Coverage + 'static) -> Self {
        self.coverage = Some(Box::new(coverage));
        self
    }

    pub fn with_render_gate(mut self, gate: impl RenderGate + 'static) -> Self {
        self.render_gate = Some(Box::new(gate));
        self
    }

    pub fn with_min_zoom(self, min_zoom: f64) -> Self {
        self.with_render_gate(MinZoom(min_zoom))
    }

    pub fn with_local_photos(mut self, files: Rc<LocalPhotoFiles>) -> Self {
        self.local_photos = Some(files);
        self
    }

    pub fn into_rc(self) -> Rc<dyn Layer> {
        Rc::new(self)
    }
}

impl Layer for LayerDescriptor {
    fn id(&self) -> &str {
        &self.id
    }

    fn supported(&self) -> bool {
        self.supported
    }

    fn enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn coverage(&self) -> Option<&dyn Coverage> {
        self.coverage.as_deref()
    }

    fn render_gate(&self) -> Option<&dyn RenderGate> {
        self.render_gate.as_deref()
    }

    fn local_photos(&self) -> Option<&dyn LocalPhotoSet> {
        self.local_photos.as_deref().map(|files| files as &dyn LocalPhotoSet)
    }
}

/// Ordered layer registry.
#[derive(Default)]
pub struct LayerSet {
    layers: Vec<Rc<dyn Layer>>,
}

impl LayerSet {
    pub fn new(layers: Vec<Rc<dyn Layer>>) -> Self {
        Self { layers }
    }
}

impl LayerRegistry for LayerSet {
    fn layer(&self, id: &str) -> Option<Rc<dyn Layer>> {
        self.layers.iter().find(|l| l.id() == id).cloned()
    }

    fn all(&self) -> Vec<Rc<dyn Layer>> {
        self.layers.clone()
    }
}
