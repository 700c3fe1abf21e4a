use crate::error::{ProcessingError, Result};
use crate::models::{BandStatistics, MediaKind, RasterInfo};
use gdal::errors::GdalError;
use gdal::raster::RasterBand;
use gdal::spatial_ref::SpatialRef;
use gdal::Dataset;
use std::path::Path;
use tracing::{debug, warn};

/// Reads geometry and per-band statistics from a raster through GDAL.
pub struct RasterInspector;

impl RasterInspector {
    /// Inspect `path`, classifying pixels against the sentinel catalog of `kind`.
    /// The dataset is closed before returning.
    pub fn inspect(path: &Path, kind: MediaKind) -> Result<RasterInfo> {
        let dataset = Dataset::open(path)
            .map_err(|e| ProcessingError::raster_read(path, e.to_string()))?;
        Self::inspect_dataset(&dataset, path, kind)
    }

    fn inspect_dataset(dataset: &Dataset, path: &Path, kind: MediaKind) -> Result<RasterInfo> {
        let band_count = dataset.raster_count();
        if band_count == 0 {
            return Err(ProcessingError::raster_read(path, "raster has no bands"));
        }

        let transform = dataset.geo_transform().ok();
        let (width, height) = dataset.raster_size();
        let shape = (width > 0 && height > 0).then_some([height, width]);
        let (epsg, projjson) = match dataset.spatial_ref() {
            Ok(srs) => Self::crs(&srs),
            Err(_) => (None, None),
        };

        let mut bands = Vec::new();
        for index in 1..=band_count {
            let band = dataset
                .rasterband(index)
                .map_err(|e| ProcessingError::raster_read(path, e.to_string()))?;
            let data_type = stac_data_type(&band.band_type().name());

            let statistics = match Self::band_statistics(&band, &data_type, kind) {
                Ok(statistics) => statistics,
                Err(e) => {
                    warn!(
                        "pixel data of band {} in {} is not readable: {}",
                        index,
                        path.display(),
                        e
                    );
                    BandStatistics::new(data_type)
                }
            };
            bands.push(statistics);
        }

        debug!(
            path = %path.display(),
            ?kind,
            bands = bands.len(),
            ?epsg,
            "inspected raster"
        );

        Ok(RasterInfo {
            transform,
            shape,
            epsg,
            projjson,
            bands,
        })
    }

    /// Fold the band one block window at a time so a full grid is never held in memory.
    fn band_statistics(
        band: &RasterBand,
        data_type: &str,
        kind: MediaKind,
    ) -> std::result::Result<BandStatistics, GdalError> {
        let (width, height) = band.size();
        let (block_x, block_y) = band.block_size();
        let (block_x, block_y) = (block_x.clamp(1, width.max(1)), block_y.clamp(1, height.max(1)));

        let mut statistics = BandStatistics::new(data_type);
        for y in (0..height).step_by(block_y) {
            let rows = block_y.min(height - y);
            for x in (0..width).step_by(block_x) {
                let cols = block_x.min(width - x);
                let window = band.read_as::<f64>(
                    (x as isize, y as isize),
                    (cols, rows),
                    (cols, rows),
                    None,
                )?;
                statistics.accumulate(window.data(), kind.sentinels());
            }
        }
        Ok(statistics)
    }

    /// EPSG code when the CRS has one, otherwise its PROJJSON description.
    fn crs(srs: &SpatialRef) -> (Option<i32>, Option<serde_json::Value>) {
        let epsg = match srs.auth_name() {
            Some(name) if name.eq_ignore_ascii_case("EPSG") => srs.auth_code().ok(),
            _ => None,
        };
        if epsg.is_some() {
            return (epsg, None);
        }

        let projjson = srs
            .to_projjson()
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok());
        (None, projjson)
    }
}

/// Map a GDAL type name onto the STAC raster `data_type` vocabulary.
pub fn stac_data_type(gdal_name: &str) -> String {
    match gdal_name.to_lowercase().as_str() {
        "byte" => "uint8".to_string(),
        "unknown" | "" => "other".to_string(),
        other => other.to_string(),
    }
}
