use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    MEDIA_TYPE_COG, MEDIA_TYPE_GRIB2, SPATIAL_RESOLUTION, UNIT,
};

/// Reserved pixel values that flag missing data instead of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentinel {
    Missing,
    NoCoverage,
    LegacyNoData,
}

impl Sentinel {
    pub fn value(&self) -> f64 {
        match self {
            Sentinel::Missing => -1.0,
            Sentinel::NoCoverage => -3.0,
            Sentinel::LegacyNoData => -999.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sentinel::Missing => "missing",
            Sentinel::NoCoverage => "no_coverage",
            Sentinel::LegacyNoData => "no_data",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Sentinel::Missing => "Missing data",
            Sentinel::NoCoverage => "No radar or gauge coverage",
            Sentinel::LegacyNoData => "No data (legacy files)",
        }
    }
}

/// Representations of a QPE grid that can end up as an item asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Grib2,
    Cog,
    CogMask,
}

impl MediaKind {
    pub fn asset_key(&self) -> &'static str {
        match self {
            MediaKind::Grib2 => "grib2",
            MediaKind::Cog => "cog",
            MediaKind::CogMask => "cog-mask",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            MediaKind::Grib2 => MEDIA_TYPE_GRIB2,
            MediaKind::Cog | MediaKind::CogMask => MEDIA_TYPE_COG,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MediaKind::Grib2 => "Original GRIB2 file",
            MediaKind::Cog => "Processed Cloud-Optimized GeoTiff file",
            MediaKind::CogMask => "Cloud-Optimized GeoTiff no-data mask",
        }
    }

    pub fn roles(&self) -> [&'static str; 2] {
        match self {
            MediaKind::Grib2 => ["data", "source"],
            MediaKind::Cog => ["data", "cloud-optimized"],
            MediaKind::CogMask => ["data-mask", "cloud-optimized"],
        }
    }

    /// Sentinel values that may appear in files of this kind.
    pub fn sentinels(&self) -> &'static [Sentinel] {
        match self {
            MediaKind::Cog => &[Sentinel::Missing],
            MediaKind::Grib2 | MediaKind::CogMask => &[
                Sentinel::Missing,
                Sentinel::NoCoverage,
                Sentinel::LegacyNoData,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub minimum: f64,
    pub maximum: f64,
}

/// Per-band summary extracted from pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct BandStatistics {
    pub spatial_resolution: f64,
    pub unit: &'static str,
    pub data_type: String,
    pub statistics: Option<Statistics>,
    pub observed: Vec<Sentinel>,
}

impl BandStatistics {
    /// Band description without pixel information.
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            spatial_resolution: SPATIAL_RESOLUTION,
            unit: UNIT,
            data_type: data_type.into(),
            statistics: None,
            observed: Vec::new(),
        }
    }

    /// Scan `values` once, splitting them into valid measurements and members of `catalog`.
    pub fn from_values(data_type: impl Into<String>, values: &[f64], catalog: &[Sentinel]) -> Self {
        let mut band = Self::new(data_type);
        band.accumulate(values, catalog);
        band
    }

    /// Fold another window of pixels into the running range and observed sentinels.
    /// Sentinels stay in `catalog` order regardless of the order windows arrive in.
    pub fn accumulate(&mut self, values: &[f64], catalog: &[Sentinel]) {
        for &value in values {
            if value.is_nan() {
                continue;
            }

            if let Some(sentinel) = catalog.iter().find(|s| s.value() == value) {
                if !self.observed.contains(sentinel) {
                    self.observed.push(*sentinel);
                    self.observed
                        .sort_by_key(|s| catalog.iter().position(|c| c == s));
                }
                continue;
            }

            self.statistics = Some(match self.statistics {
                Some(r) => Statistics {
                    minimum: r.minimum.min(value),
                    maximum: r.maximum.max(value),
                },
                None => Statistics {
                    minimum: value,
                    maximum: value,
                },
            });
        }
    }

    /// The single sentinel present in the band, if there is exactly one.
    pub fn nodata(&self) -> Option<f64> {
        match self.observed.as_slice() {
            [only] => Some(only.value()),
            _ => None,
        }
    }

    pub fn classes(&self) -> &[Sentinel] {
        &self.observed
    }
}

/// What the inspector learned about one raster file.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    pub transform: Option<[f64; 6]>,
    pub shape: Option<[usize; 2]>,
    pub epsg: Option<i32>,
    pub projjson: Option<serde_json::Value>,
    pub bands: Vec<BandStatistics>,
}

impl RasterInfo {
    pub fn same_crs(&self, other: &RasterInfo) -> bool {
        self.epsg == other.epsg && self.projjson == other.projjson
    }
}
