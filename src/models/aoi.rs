use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ProcessingError;

/// Regions covered by the MRMS QPE product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaOfInterest {
    Conus,
    Alaska,
    Hawaii,
    Guam,
    Carib,
}

impl AreaOfInterest {
    pub const ALL: [AreaOfInterest; 5] = [
        AreaOfInterest::Conus,
        AreaOfInterest::Hawaii,
        AreaOfInterest::Guam,
        AreaOfInterest::Alaska,
        AreaOfInterest::Carib,
    ];

    /// Bounding box as west, south, east, north in degrees.
    pub fn bbox(&self) -> [f64; 4] {
        match self {
            AreaOfInterest::Conus => [-130.0, 20.0, -60.0, 55.0],
            AreaOfInterest::Hawaii => [-164.0, 15.0, -151.0, 26.0],
            AreaOfInterest::Guam => [140.0, 9.0, 150.0, 18.0],
            AreaOfInterest::Alaska => [-176.0, 50.0, -126.0, 72.0],
            AreaOfInterest::Carib => [-90.0, 10.0, -60.0, 25.0],
        }
    }

    /// Upper-case name used as the item id prefix.
    pub fn name(&self) -> &'static str {
        match self {
            AreaOfInterest::Conus => "CONUS",
            AreaOfInterest::Alaska => "ALASKA",
            AreaOfInterest::Hawaii => "HAWAII",
            AreaOfInterest::Guam => "GUAM",
            AreaOfInterest::Carib => "CARIB",
        }
    }

    /// Lower-case value stored in the `noaa_mrms_qpe:region` property.
    pub fn region(&self) -> &'static str {
        match self {
            AreaOfInterest::Conus => "conus",
            AreaOfInterest::Alaska => "alaska",
            AreaOfInterest::Hawaii => "hawaii",
            AreaOfInterest::Guam => "guam",
            AreaOfInterest::Carib => "carib",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AreaOfInterest::Conus => "Continental US",
            AreaOfInterest::Alaska => "Alaska",
            AreaOfInterest::Hawaii => "Hawaii",
            AreaOfInterest::Guam => "Guam",
            AreaOfInterest::Carib => "Caribbean",
        }
    }
}

impl FromStr for AreaOfInterest {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AreaOfInterest::ALL
            .into_iter()
            .find(|aoi| aoi.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ProcessingError::InvalidArgument(format!(
                    "Unknown area of interest '{}', expected one of CONUS, ALASKA, HAWAII, GUAM, CARIB",
                    s
                ))
            })
    }
}

impl std::fmt::Display for AreaOfInterest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
