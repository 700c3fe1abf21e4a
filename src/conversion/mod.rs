pub mod pipeline;
pub mod scratch;
pub mod tools;

pub use pipeline::{ConversionOptions, ConversionPipeline, ConversionResult, ConvertedAsset};
pub use scratch::ScratchDir;
pub use tools::{Clamp, GdalCommandLine, GeoTools, OptimizeRequest};
