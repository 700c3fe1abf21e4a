//! STAC 1.0.0 documents produced by the crate.
//!
//! Only the fields this product needs are typed; projection fields and item properties are
//! kept as JSON maps because their presence depends on how the assets were produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::models::raster::{BandStatistics, Sentinel, Statistics};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: &str, href: impl Into<String>) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
            media_type: None,
            title: None,
        }
    }

    pub fn with_media_type(mut self, media_type: &str) -> Self {
        self.media_type = Some(media_type.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationClass {
    pub value: f64,
    pub name: String,
    pub description: String,
    pub nodata: bool,
}

impl From<Sentinel> for ClassificationClass {
    fn from(sentinel: Sentinel) -> Self {
        Self {
            value: sentinel.value(),
            name: sentinel.name().to_string(),
            description: sentinel.description().to_string(),
            nodata: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodata: Option<f64>,
    pub data_type: String,
    pub spatial_resolution: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
    #[serde(
        rename = "classification:classes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub classes: Option<Vec<ClassificationClass>>,
}

impl From<&BandStatistics> for RasterBand {
    fn from(band: &BandStatistics) -> Self {
        let classes = if band.classes().is_empty() {
            None
        } else {
            Some(band.classes().iter().copied().map(Into::into).collect())
        };

        Self {
            nodata: band.nodata(),
            data_type: band.data_type.clone(),
            spatial_resolution: band.spatial_resolution,
            unit: band.unit.to_string(),
            statistics: band.statistics,
            classes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(
        rename = "raster:bands",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub raster_bands: Option<Vec<RasterBand>>,
    /// Projection fields (`proj:*`).
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

/// Asset template advertised by a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAsset {
    #[serde(rename = "type")]
    pub media_type: String,
    pub title: String,
    pub roles: Vec<String>,
    #[serde(rename = "raster:bands")]
    pub raster_bands: Vec<RasterBand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub geometry: Value,
    pub bbox: Vec<f64>,
    pub properties: Map<String, Value>,
    pub links: Vec<Link>,
    pub assets: BTreeMap<String, Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl Item {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.properties
            .get("datetime")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<[f64; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<DateTime<Utc>>; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub license: String,
    pub providers: Vec<Provider>,
    pub extent: Extent,
    pub summaries: Map<String, Value>,
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assets: BTreeMap<String, Asset>,
    #[serde(default)]
    pub item_assets: BTreeMap<String, ItemAsset>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::raster::MediaKind;
    use serde_json::json;

    #[test]
    fn test_raster_band_from_clean_statistics() {
        let stats = BandStatistics::from_values("float64", &[0.0, 2.0], &[Sentinel::Missing]);
        let band = serde_json::to_value(RasterBand::from(&stats)).unwrap();

        assert_eq!(
            band,
            json!({
                "data_type": "float64",
                "spatial_resolution": 1000.0,
                "unit": "mm",
                "statistics": {"minimum": 0.0, "maximum": 2.0}
            })
        );
    }

    #[test]
    fn test_raster_band_with_classes() {
        let stats = BandStatistics::from_values("float64", &[-1.0, 3.0], MediaKind::Cog.sentinels());
        let band = RasterBand::from(&stats);

        assert_eq!(band.nodata, Some(-1.0));
        let classes = band.classes.unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].value, -1.0);
        assert!(classes[0].nodata);
    }

    #[test]
    fn test_asset_projection_fields_are_flattened() {
        let mut extra = Map::new();
        extra.insert("proj:epsg".to_string(), Value::Null);
        extra.insert("proj:shape".to_string(), json!([10, 20]));

        let asset = Asset {
            href: "a.tif".to_string(),
            media_type: MediaKind::Cog.media_type().to_string(),
            title: None,
            roles: vec!["data".to_string()],
            raster_bands: None,
            extra_fields: extra,
        };

        let value = serde_json::to_value(&asset).unwrap();
        assert!(value["proj:epsg"].is_null());
        assert_eq!(value["proj:shape"], json!([10, 20]));

        let back: Asset = serde_json::from_value(value).unwrap();
        assert_eq!(back, asset);
    }
}
