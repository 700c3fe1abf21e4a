pub mod raster_inspector;

pub use raster_inspector::RasterInspector;
