use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::utils::constants::{
    DEFAULT_CALC_PROGRAM, DEFAULT_COMPRESS, DEFAULT_WARP_PROGRAM, SUPPORTED_COMPRESSION,
};

/// Environment variable prefix, e.g. `MRMS_QPE_WARP_PROGRAM=/opt/gdal/bin/gdalwarp`.
pub const ENV_PREFIX: &str = "MRMS_QPE";

fn validate_compress(compress: &str) -> std::result::Result<(), ValidationError> {
    if SUPPORTED_COMPRESSION.contains(&compress.to_uppercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_compression"))
    }
}

/// External tool configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ToolSettings {
    #[validate(length(min = 1))]
    pub warp_program: String,

    #[validate(length(min = 1))]
    pub calc_program: String,

    #[validate(custom(function = "validate_compress"))]
    pub compress: String,

    #[validate(range(min = 1))]
    pub max_workers: Option<usize>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            warp_program: DEFAULT_WARP_PROGRAM.to_string(),
            calc_program: DEFAULT_CALC_PROGRAM.to_string(),
            compress: DEFAULT_COMPRESS.to_string(),
            max_workers: None,
        }
    }
}

impl ToolSettings {
    /// Defaults, then the optional settings file, then `MRMS_QPE_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let settings: ToolSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
