pub mod aoi;
pub mod file_info;
pub mod raster;
pub mod stac;

pub use aoi::AreaOfInterest;
pub use file_info::{AccumulationPeriod, FileInfo, ProcessingPass};
pub use raster::{BandStatistics, MediaKind, RasterInfo, Sentinel, Statistics};
pub use stac::{Asset, Collection, Item, ItemAsset, Link, Provider, RasterBand};
