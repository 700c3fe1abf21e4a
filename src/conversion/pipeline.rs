use crate::conversion::scratch::{persist, ScratchDir};
use crate::conversion::tools::{Clamp, GeoTools, OptimizeRequest};
use crate::error::Result;
use crate::models::MediaKind;
use crate::utils::constants::{
    COG_DATA_NODATA, COG_EXTENSION, COG_MASK_NODATA, COG_MASK_TYPE, GRIB2_EXTENSION, MASK_INFIX,
};
use crate::utils::filename::{
    cog_output_path, grib2_output_path, mask_output_path, strip_source_suffixes,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which representations to produce for one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionOptions {
    pub gzip: bool,
    pub reproject_to: Option<String>,
    pub cog: bool,
    pub grib: bool,
    pub mask: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedAsset {
    pub kind: MediaKind,
    pub path: PathBuf,
}

/// Final files produced by one conversion, all located next to the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionResult {
    pub assets: Vec<ConvertedAsset>,
}

impl ConversionResult {
    pub fn path(&self, kind: MediaKind) -> Option<&Path> {
        self.assets
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.path.as_path())
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Remove every file this conversion produced. A passed-through `source` is left alone.
    pub fn discard(&self, source: &Path) {
        for asset in self.assets.iter().filter(|a| a.path != source) {
            if let Err(e) = fs::remove_file(&asset.path) {
                warn!("failed to remove {}: {}", asset.path.display(), e);
            }
        }
    }
}

pub struct ConversionPipeline<'a> {
    tools: &'a dyn GeoTools,
}

impl<'a> ConversionPipeline<'a> {
    pub fn new(tools: &'a dyn GeoTools) -> Self {
        Self { tools }
    }

    /// Decompress, reproject and optimize `source`. Intermediates live in a private scratch
    /// directory; final files are moved next to the source only once every stage succeeded.
    pub fn convert(&self, source: &Path, options: &ConversionOptions) -> Result<ConversionResult> {
        let scratch = ScratchDir::new()?;
        let stem = strip_source_suffixes(source);

        let mut input = source.to_path_buf();
        if options.gzip {
            input = scratch.decompress(source, &format!("{}{}", stem, GRIB2_EXTENSION))?;
        }

        let mut staged: Vec<(MediaKind, PathBuf, PathBuf)> = Vec::new();
        let mut result = ConversionResult::default();

        if options.cog {
            let mut cog_input = input.clone();
            if let Some(crs) = &options.reproject_to {
                let warped = scratch.file(&format!("{}-warped{}", stem, COG_EXTENSION));
                cog_input = self.tools.reproject(&cog_input, &warped, crs)?;
            }

            let cog = self.tools.optimize(
                &cog_input,
                &scratch.file(&format!("{}{}", stem, COG_EXTENSION)),
                &OptimizeRequest {
                    clamp: Clamp::Floor(COG_DATA_NODATA),
                    nodata: COG_DATA_NODATA,
                    data_type: None,
                },
            )?;
            staged.push((MediaKind::Cog, cog, cog_output_path(source)));

            if options.mask {
                let mask = self.tools.optimize(
                    &cog_input,
                    &scratch.file(&format!("{}{}{}", stem, MASK_INFIX, COG_EXTENSION)),
                    &OptimizeRequest {
                        clamp: Clamp::Ceiling(COG_MASK_NODATA),
                        nodata: COG_MASK_NODATA,
                        data_type: Some(COG_MASK_TYPE),
                    },
                )?;
                staged.push((MediaKind::CogMask, mask, mask_output_path(source)));
            }
        } else if options.reproject_to.is_some() {
            warn!("reprojection requested without a COG output, ignoring it");
        }

        if options.grib {
            if options.gzip {
                staged.push((MediaKind::Grib2, input.clone(), grib2_output_path(source)));
            } else {
                result.assets.push(ConvertedAsset {
                    kind: MediaKind::Grib2,
                    path: source.to_path_buf(),
                });
            }
        }

        let mut persisted: Vec<PathBuf> = Vec::new();
        for (kind, intermediate, destination) in staged {
            debug!(from = %intermediate.display(), to = %destination.display(), "persisting");
            if let Err(e) = persist(&intermediate, &destination) {
                for path in &persisted {
                    let _ = fs::remove_file(path);
                }
                return Err(e);
            }
            persisted.push(destination.clone());
            result.assets.push(ConvertedAsset {
                kind,
                path: destination,
            });
        }

        // outputs are already in place; close() logs its own failure
        let _ = scratch.close();

        info!(
            "converted {} into {} asset(s)",
            source.display(),
            result.assets.len()
        );
        Ok(result)
    }
}
