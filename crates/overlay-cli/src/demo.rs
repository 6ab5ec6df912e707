//! A fixed layer set standing in for a real editor.

use std::rc::Rc;

use overlay_core::{BoundsCoverage, Extent, LayerDescriptor, LayerSet, LocalPhotoFiles};

/// Rough bounding box of Norway, where vegbilder has imagery.
pub const NORWAY: Extent = Extent {
    min_lon: 4.0,
    min_lat: 57.0,
    max_lon: 31.5,
    max_lat: 71.5,
};

pub fn demo_layers(local_photos: Rc<LocalPhotoFiles>) -> LayerSet {
    LayerSet::new(vec![
        LayerDescriptor::new("osm").with_enabled(true).into_rc(),
        LayerDescriptor::new("notes").into_rc(),
        LayerDescriptor::new("streetside").into_rc(),
        LayerDescriptor::new("mapillary").into_rc(),
        LayerDescriptor::new("mapillary-map-features")
            .with_min_zoom(16.0)
            .into_rc(),
        LayerDescriptor::new("mapillary-signs")
            .with_min_zoom(16.0)
            .into_rc(),
        LayerDescriptor::new("kartaview").into_rc(),
        LayerDescriptor::new("mapilio").into_rc(),
        LayerDescriptor::new("vegbilder")
            .with_coverage(BoundsCoverage {
                bounds: NORWAY,
                min_zoom: 14.0,
            })
            .into_rc(),
        LayerDescriptor::new("panoramax").into_rc(),
        LayerDescriptor::new("local-photos")
            .with_local_photos(local_photos)
            .into_rc(),
    ])
}
