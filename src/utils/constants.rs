/// Product naming
pub const GRIB2_EXTENSION: &str = ".grib2";
pub const GZIP_EXTENSION: &str = ".gz";
pub const COG_EXTENSION: &str = ".tif";
pub const MASK_INFIX: &str = "-mask";

/// STAC extension identifiers
pub const STAC_VERSION: &str = "1.0.0";
pub const REPOSITORY: &str = "https://github.com/stactools-packages/noaa-mrms-qpe";
pub const EXTENSION: &str =
    "https://raw.githubusercontent.com/stactools-packages/noaa-mrms-qpe/main/extension/schema.json";
pub const PROJECTION_EXTENSION: &str =
    "https://stac-extensions.github.io/projection/v1.0.0/schema.json";
pub const RASTER_EXTENSION: &str = "https://stac-extensions.github.io/raster/v1.1.0/schema.json";
pub const CLASSIFICATION_EXTENSION: &str =
    "https://stac-extensions.github.io/classification/v1.1.0/schema.json";
pub const ITEM_ASSETS_EXTENSION: &str =
    "https://stac-extensions.github.io/item-assets/v1.0.0/schema.json";

/// Product property names
pub const EXT_PASS: &str = "noaa_mrms_qpe:pass";
pub const EXT_PERIOD: &str = "noaa_mrms_qpe:period";
pub const EXT_REGION: &str = "noaa_mrms_qpe:region";

/// Media types
pub const MEDIA_TYPE_COG: &str = "image/tiff; application=geotiff; profile=cloud-optimized";
pub const MEDIA_TYPE_GRIB2: &str = "application/wmo-GRIB2";
pub const MEDIA_TYPE_PNG: &str = "image/png";
pub const MEDIA_TYPE_JPEG: &str = "image/jpeg";
pub const MEDIA_TYPE_JSON: &str = "application/json";
pub const MEDIA_TYPE_PDF: &str = "application/pdf";
pub const MEDIA_TYPE_HTML: &str = "text/html";

/// Raster band description shared by every asset
pub const SPATIAL_RESOLUTION: f64 = 1000.0;
pub const UNIT: &str = "mm";
pub const DEFAULT_DATA_TYPE: &str = "float64";

/// COG conversion
pub const COG_DATA_NODATA: f64 = -1.0;
pub const COG_MASK_NODATA: f64 = 0.0;
pub const COG_MASK_TYPE: &str = "Int16";
pub const DEFAULT_COMPRESS: &str = "LZW";
pub const SUPPORTED_COMPRESSION: &[&str] = &["LZW", "DEFLATE", "ZSTD", "LZMA", "NONE"];

/// External tools
pub const DEFAULT_WARP_PROGRAM: &str = "gdalwarp";
pub const DEFAULT_CALC_PROGRAM: &str = "gdal_calc.py";

/// Union of all AOI extents
pub const UNION_EXTENT: [f64; 4] = [-176.0, 9.0, 150.0, 72.0];

/// Collection metadata
pub const LICENSE: &str = "proprietary";
pub const LINK_LICENSE_HREF: &str =
    "https://www.nssl.noaa.gov/projects/mrms/nmq_data_policy_OGCrevised.pdf";
pub const LINK_MRMS_HOME_HREF: &str = "https://mrms.nssl.noaa.gov";
pub const LINK_MRMS_TECH_GUIDE_HREF: &str =
    "https://vlab.noaa.gov/web/wdtd/-/multi-sensor-qpe-1?selectedFolder=9234881";
pub const PRODUCER_URL: &str = "https://www.nssl.noaa.gov/projects/mrms";
