use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::conversion::{ConversionOptions, ConversionPipeline, ConvertedAsset, GeoTools};
use crate::error::Result;
use crate::models::stac::{Extent, SpatialExtent, TemporalExtent};
use crate::models::{
    AccumulationPeriod, AreaOfInterest, Asset, BandStatistics, Collection, FileInfo, Item,
    ItemAsset, Link, MediaKind, ProcessingPass, Provider, RasterBand, RasterInfo,
};
use crate::readers::RasterInspector;
use crate::utils::constants::*;

/// Collection level switches.
#[derive(Debug, Clone)]
pub struct CollectionOptions {
    pub id: Option<String>,
    pub thumbnail: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub cog: bool,
    pub grib: bool,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            id: None,
            thumbnail: None,
            start_time: None,
            cog: true,
            grib: true,
        }
    }
}

/// Item level switches.
#[derive(Debug, Clone)]
pub struct ItemOptions<'a> {
    pub aoi: AreaOfInterest,
    pub cog: bool,
    pub grib: bool,
    pub mask: bool,
    pub epsg: Option<u32>,
    pub collection: Option<&'a Collection>,
}

impl<'a> ItemOptions<'a> {
    pub fn new(aoi: AreaOfInterest) -> Self {
        Self {
            aoi,
            cog: true,
            grib: true,
            mask: false,
            epsg: None,
            collection: None,
        }
    }
}

pub fn collection_id(period: AccumulationPeriod, pass_no: ProcessingPass) -> String {
    format!("noaa-mrms-qpe-{}h-pass{}", period, pass_no)
}

pub fn item_id(aoi: AreaOfInterest, file: &FileInfo) -> String {
    format!("{}_{}", aoi.name(), file.id)
}

fn template_band() -> RasterBand {
    RasterBand::from(&BandStatistics::new(DEFAULT_DATA_TYPE))
}

fn item_asset(kind: MediaKind) -> ItemAsset {
    ItemAsset {
        media_type: kind.media_type().to_string(),
        title: kind.title().to_string(),
        roles: kind.roles().iter().map(|r| r.to_string()).collect(),
        raster_bands: vec![template_band()],
    }
}

fn collection_description(period: AccumulationPeriod, pass_no: ProcessingPass) -> String {
    let mut description = String::from(
        "The Multi-Radar Multi-Sensor (MRMS) quantitative precipitation estimation (QPE) \
         product is generated fully automatically from multiple sources to generate seamless, \
         hourly 1 km mosaics over the US.\n\n",
    );
    match pass_no {
        ProcessingPass::One => description.push_str(&format!(
            "This is the {}-hour pass 1 product with less latency (60 min), but less gauges (60-65 %).",
            period
        )),
        ProcessingPass::Two => description.push_str(&format!(
            "This is the {}-hour pass 2 product with more latency (120 min), but more gauges (99 %).",
            period
        )),
    }
    description
}

/// Build the collection describing one period / pass sub-product.
pub fn create_collection(
    period: AccumulationPeriod,
    pass_no: ProcessingPass,
    options: &CollectionOptions,
) -> Collection {
    let providers = vec![
        Provider {
            name: "NOAA National Severe Storms Laboratory".to_string(),
            roles: vec!["producer".to_string(), "licensor".to_string()],
            description: None,
            url: Some(PRODUCER_URL.to_string()),
        },
        Provider {
            name: "Stactools".to_string(),
            roles: vec!["processor".to_string()],
            description: Some("Conversion from GRIB to COG files".to_string()),
            url: Some(REPOSITORY.to_string()),
        },
    ];

    let mut bbox = vec![UNION_EXTENT];
    bbox.extend(AreaOfInterest::ALL.iter().map(|aoi| aoi.bbox()));
    let start_time = options.start_time.unwrap_or_else(Utc::now);

    let keywords = [
        "NOAA",
        "MRMS",
        "QPE",
        "multi-radar",
        "multi-sensor",
        "precipitation",
    ]
    .iter()
    .map(|k| k.to_string())
    .chain(std::iter::once(format!("{}-hour", period)))
    .collect();

    let mut summaries = Map::new();
    summaries.insert(EXT_PASS.to_string(), json!([pass_no.number()]));
    summaries.insert(EXT_PERIOD.to_string(), json!([period.hours()]));
    summaries.insert(
        EXT_REGION.to_string(),
        json!(AreaOfInterest::ALL
            .iter()
            .map(|aoi| aoi.region())
            .collect::<Vec<_>>()),
    );

    let mut item_assets = BTreeMap::new();
    if options.cog {
        item_assets.insert(MediaKind::Cog.asset_key().to_string(), item_asset(MediaKind::Cog));
    }
    if options.grib {
        item_assets.insert(
            MediaKind::Grib2.asset_key().to_string(),
            item_asset(MediaKind::Grib2),
        );
    }

    let mut assets = BTreeMap::new();
    if let Some(thumbnail) = options.thumbnail.as_deref().filter(|t| !t.is_empty()) {
        let media_type = if thumbnail.to_lowercase().ends_with(".png") {
            MEDIA_TYPE_PNG
        } else {
            MEDIA_TYPE_JPEG
        };
        assets.insert(
            "thumbnail".to_string(),
            Asset {
                href: thumbnail.to_string(),
                media_type: media_type.to_string(),
                title: Some("Preview".to_string()),
                roles: vec!["thumbnail".to_string()],
                raster_bands: None,
                extra_fields: Map::new(),
            },
        );
    }

    Collection {
        kind: "Collection".to_string(),
        stac_version: STAC_VERSION.to_string(),
        stac_extensions: vec![
            EXTENSION.to_string(),
            PROJECTION_EXTENSION.to_string(),
            RASTER_EXTENSION.to_string(),
            CLASSIFICATION_EXTENSION.to_string(),
            ITEM_ASSETS_EXTENSION.to_string(),
        ],
        id: options
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| collection_id(period, pass_no)),
        title: format!("NOAA MRMS QPE {}-hour Pass {}", period, pass_no),
        description: collection_description(period, pass_no),
        keywords,
        license: LICENSE.to_string(),
        providers,
        extent: Extent {
            spatial: SpatialExtent { bbox },
            temporal: TemporalExtent {
                interval: vec![[Some(start_time), None]],
            },
        },
        summaries,
        links: vec![
            Link::new("license", LINK_LICENSE_HREF)
                .with_media_type(MEDIA_TYPE_PDF)
                .with_title("MRMS Dataset Sharing Policy"),
            Link::new("about", LINK_MRMS_HOME_HREF)
                .with_media_type(MEDIA_TYPE_HTML)
                .with_title("MRMS Homepage"),
            Link::new("about", LINK_MRMS_TECH_GUIDE_HREF)
                .with_media_type(MEDIA_TYPE_HTML)
                .with_title("MRMS QPE Technical Product Guide"),
        ],
        assets,
        item_assets,
    }
}

fn projection_fields(raster: &RasterInfo) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("proj:epsg".to_string(), json!(raster.epsg));
    if raster.epsg.is_none() {
        if let Some(projjson) = &raster.projjson {
            fields.insert("proj:projjson".to_string(), projjson.clone());
        }
    }
    fields
}

fn geometry(bbox: [f64; 4]) -> Value {
    let [west, south, east, north] = bbox;
    json!({
        "type": "Polygon",
        "coordinates": [[
            [west, south],
            [east, south],
            [east, north],
            [west, north],
            [west, south]
        ]]
    })
}

/// Fold parsed filename fields and inspected assets into an item.
pub fn build_item(
    file: &FileInfo,
    aoi: AreaOfInterest,
    assets: &[(ConvertedAsset, RasterInfo)],
    collection: Option<&Collection>,
) -> Item {
    let shared_crs = assets.windows(2).all(|w| w[0].1.same_crs(&w[1].1));

    let mut properties = Map::new();
    properties.insert(
        "datetime".to_string(),
        json!(file.datetime.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    properties.insert(
        "description".to_string(),
        json!(format!(
            "MRMS QPE {}-hour precipitation accumulation (pass {}) over {} ending {}",
            file.period,
            file.pass_no,
            aoi.display_name(),
            file.datetime.format("%Y-%m-%d %H:%M UTC")
        )),
    );
    properties.insert(EXT_PASS.to_string(), json!(file.pass_no.number()));
    properties.insert(EXT_PERIOD.to_string(), json!(file.period.hours()));
    properties.insert(EXT_REGION.to_string(), json!(aoi.region()));

    if shared_crs {
        if let Some((_, raster)) = assets.first() {
            properties.extend(projection_fields(raster));
        }
    }

    let mut has_classes = false;
    let mut item_assets = BTreeMap::new();
    for (converted, raster) in assets {
        let mut extra_fields = Map::new();
        if let Some(shape) = raster.shape {
            extra_fields.insert("proj:shape".to_string(), json!(shape));
        }
        if let Some(transform) = raster.transform {
            extra_fields.insert("proj:transform".to_string(), json!(transform));
        }
        if !shared_crs {
            extra_fields.extend(projection_fields(raster));
        }

        let bands: Vec<RasterBand> = raster.bands.iter().map(RasterBand::from).collect();
        has_classes |= bands.iter().any(|b| b.classes.is_some());

        let kind = converted.kind;
        item_assets.insert(
            kind.asset_key().to_string(),
            Asset {
                href: converted.path.to_string_lossy().into_owned(),
                media_type: kind.media_type().to_string(),
                title: Some(kind.title().to_string()),
                roles: kind.roles().iter().map(|r| r.to_string()).collect(),
                raster_bands: Some(bands),
                extra_fields,
            },
        );
    }

    let mut stac_extensions = vec![
        EXTENSION.to_string(),
        PROJECTION_EXTENSION.to_string(),
        RASTER_EXTENSION.to_string(),
    ];
    if has_classes {
        stac_extensions.push(CLASSIFICATION_EXTENSION.to_string());
    }

    let mut links = Vec::new();
    if let Some(collection) = collection {
        let href = collection
            .links
            .iter()
            .find(|l| l.rel == "self")
            .map(|l| l.href.clone());
        if let Some(href) = href {
            for rel in ["collection", "parent", "root"] {
                links.push(
                    Link::new(rel, href.clone())
                        .with_media_type(MEDIA_TYPE_JSON)
                        .with_title(&collection.title),
                );
            }
        }
    }

    let bbox = aoi.bbox();
    Item {
        kind: "Feature".to_string(),
        stac_version: STAC_VERSION.to_string(),
        stac_extensions,
        id: item_id(aoi, file),
        geometry: geometry(bbox),
        bbox: bbox.to_vec(),
        properties,
        links,
        assets: item_assets,
        collection: collection.map(|c| c.id.clone()),
    }
}

/// Drives parse, conversion and inspection for single source files.
pub struct MetadataAssembler<'a> {
    pipeline: ConversionPipeline<'a>,
}

impl<'a> MetadataAssembler<'a> {
    pub fn new(tools: &'a dyn GeoTools) -> Self {
        Self {
            pipeline: ConversionPipeline::new(tools),
        }
    }

    pub fn create_item(&self, source: &Path, options: &ItemOptions<'_>) -> Result<Item> {
        let file = FileInfo::parse(&source.to_string_lossy())?;
        debug!(id = %file.id, period = %file.period, pass = %file.pass_no, "parsed filename");

        let conversion = self.pipeline.convert(
            source,
            &ConversionOptions {
                gzip: file.gzip,
                reproject_to: options.epsg.map(|code| format!("EPSG:{}", code)),
                cog: options.cog,
                grib: options.grib,
                mask: options.mask,
            },
        )?;

        let mut inspected = Vec::with_capacity(conversion.assets.len());
        for asset in &conversion.assets {
            match RasterInspector::inspect(&asset.path, asset.kind) {
                Ok(raster) => inspected.push((asset.clone(), raster)),
                Err(e) => {
                    warn!("discarding outputs of {}: {}", source.display(), e);
                    conversion.discard(source);
                    return Err(e);
                }
            }
        }

        let item = build_item(&file, options.aoi, &inspected, options.collection);
        info!("created item {}", item.id);
        Ok(item)
    }
}
