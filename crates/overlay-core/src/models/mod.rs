pub mod editor;
pub mod extent;
pub mod layer;
pub mod mode;

pub use editor::{Editor, MapState, ModeState};
pub use extent::Extent;
pub use layer::{BoundsCoverage, LayerDescriptor, LayerSet, LocalPhotoFiles, MinZoom};
pub use mode::Mode;
