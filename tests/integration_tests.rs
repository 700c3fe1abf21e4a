use flate2::write::GzEncoder;
use flate2::Compression;
use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use mrms_qpe_stac::conversion::{Clamp, GdalCommandLine, GeoTools, OptimizeRequest};
use mrms_qpe_stac::error::{ProcessingError, Result};
use mrms_qpe_stac::models::{AccumulationPeriod, AreaOfInterest, ProcessingPass};
use mrms_qpe_stac::processors::{
    create_collection, BatchProcessor, CollectionOptions, ItemOptions, MetadataAssembler,
};
use mrms_qpe_stac::settings::ToolSettings;
use mrms_qpe_stac::writers::StacWriter;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WIDTH: usize = 3;
const HEIGHT: usize = 2;
const TRANSFORM: [f64; 6] = [140.0, 0.5, 0.0, 18.0, 0.0, -0.5];
const PIXELS: [f64; 6] = [-3.0, -1.0, 0.0, 2.5, 7.0, -1.0];
const STEM: &str = "MRMS_MultiSensor_QPE_01H_Pass1_00.00_20220601-120000";

fn write_grid<T: GdalType + Copy>(path: &Path, srs: &SpatialRef, values: Vec<T>) -> Result<()> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut dataset = driver.create_with_band_type::<T, _>(path, WIDTH, HEIGHT, 1)?;
    dataset.set_geo_transform(&TRANSFORM)?;
    dataset.set_spatial_ref(srs)?;
    let mut band = dataset.rasterband(1)?;
    let mut buffer = Buffer::new((WIDTH, HEIGHT), values);
    band.write((0, 0), (WIDTH, HEIGHT), &mut buffer)?;
    Ok(())
}

/// Stand-in for the GDAL command-line tools: copies on reproject, clamps in-process on optimize.
struct InProcessTools;

impl GeoTools for InProcessTools {
    fn reproject(&self, source: &Path, destination: &Path, _crs: &str) -> Result<PathBuf> {
        fs::copy(source, destination)?;
        Ok(destination.to_path_buf())
    }

    fn optimize(
        &self,
        source: &Path,
        destination: &Path,
        request: &OptimizeRequest,
    ) -> Result<PathBuf> {
        let dataset = Dataset::open(source)?;
        let srs = dataset.spatial_ref()?;
        let band = dataset.rasterband(1)?;
        let buffer = band.read_as::<f64>((0, 0), (WIDTH, HEIGHT), (WIDTH, HEIGHT), None)?;

        let clamped: Vec<f64> = buffer
            .data()
            .iter()
            .map(|&v| match request.clamp {
                Clamp::Floor(bound) => v.max(bound),
                Clamp::Ceiling(bound) => v.min(bound),
            })
            .collect();

        match request.data_type {
            Some("Int16") => write_grid(
                destination,
                &srs,
                clamped.iter().map(|&v| v as i16).collect(),
            )?,
            _ => write_grid(destination, &srs, clamped)?,
        }
        Ok(destination.to_path_buf())
    }
}

/// Writes the fixture grid as `<dir>/<stem>.grib2.gz`.
fn gzip_source(dir: &Path, stem: &str) -> Result<PathBuf> {
    let raw = dir.join(format!("{}.raw.tif", stem));
    write_grid(&raw, &SpatialRef::from_epsg(4326)?, PIXELS.to_vec())?;

    let source = dir.join(format!("{}.grib2.gz", stem));
    let mut encoder = GzEncoder::new(fs::File::create(&source)?, Compression::default());
    encoder.write_all(&fs::read(&raw)?)?;
    encoder.finish()?;
    fs::remove_file(raw)?;
    Ok(source)
}

#[test]
fn test_create_item_from_compressed_source() -> Result<()> {
    let dir = TempDir::new()?;
    let source = gzip_source(dir.path(), STEM)?;

    let tools = InProcessTools;
    let item = MetadataAssembler::new(&tools)
        .create_item(&source, &ItemOptions::new(AreaOfInterest::Guam))?;

    assert_eq!(item.id, format!("GUAM_{}", STEM));
    assert_eq!(item.bbox, vec![140.0, 9.0, 150.0, 18.0]);
    assert_eq!(item.properties["datetime"], json!("2022-06-01T12:00:00Z"));
    assert_eq!(item.properties["noaa_mrms_qpe:region"], json!("guam"));
    assert_eq!(item.properties["proj:epsg"], json!(4326));
    assert_eq!(
        item.assets.keys().cloned().collect::<Vec<_>>(),
        vec!["cog".to_string(), "grib2".to_string()]
    );

    let cog = &item.assets["cog"];
    assert_eq!(PathBuf::from(&cog.href), dir.path().join(format!("{}.tif", STEM)));
    assert_eq!(cog.extra_fields["proj:shape"], json!([HEIGHT, WIDTH]));
    assert_eq!(cog.extra_fields["proj:transform"], json!(TRANSFORM));
    assert_eq!(
        serde_json::to_value(&cog.raster_bands.as_ref().unwrap()[0])?,
        json!({
            "nodata": -1.0,
            "data_type": "float64",
            "spatial_resolution": 1000.0,
            "unit": "mm",
            "statistics": {"minimum": 0.0, "maximum": 7.0},
            "classification:classes": [
                {"value": -1.0, "name": "missing", "description": "Missing data", "nodata": true}
            ]
        })
    );

    let grib = &item.assets["grib2"];
    assert_eq!(PathBuf::from(&grib.href), dir.path().join(format!("{}.grib2", STEM)));
    let grib_band = &grib.raster_bands.as_ref().unwrap()[0];
    assert_eq!(grib_band.nodata, None);
    assert_eq!(grib_band.classes.as_ref().unwrap().len(), 2);

    // only the source and the two final assets remain
    let mut names: Vec<String> = fs::read_dir(dir.path())?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    names.sort();
    assert_eq!(
        names,
        vec![
            format!("{}.grib2", STEM),
            format!("{}.grib2.gz", STEM),
            format!("{}.tif", STEM),
        ]
    );
    Ok(())
}

#[test]
fn test_create_item_with_mask_and_no_grib() -> Result<()> {
    let dir = TempDir::new()?;
    let source = gzip_source(dir.path(), STEM)?;

    let options = ItemOptions {
        grib: false,
        mask: true,
        ..ItemOptions::new(AreaOfInterest::Hawaii)
    };
    let tools = InProcessTools;
    let item = MetadataAssembler::new(&tools).create_item(&source, &options)?;

    assert!(!item.assets.contains_key("grib2"));
    let mask = &item.assets["cog-mask"];
    assert_eq!(mask.roles, vec!["data-mask", "cloud-optimized"]);
    assert!(mask.href.ends_with(&format!("{}-mask.tif", STEM)));

    let band = &mask.raster_bands.as_ref().unwrap()[0];
    assert_eq!(band.data_type, "int16");
    assert_eq!(band.nodata, None);
    assert_eq!(band.classes.as_ref().unwrap().len(), 2);
    assert!(!dir.path().join(format!("{}.grib2", STEM)).exists());
    Ok(())
}

#[test]
fn test_item_links_to_saved_collection() -> Result<()> {
    let dir = TempDir::new()?;
    let source = gzip_source(dir.path(), STEM)?;

    let collection_path = dir.path().join("catalog").join("collection.json");
    let mut collection = create_collection(
        AccumulationPeriod::OneHour,
        ProcessingPass::One,
        &CollectionOptions::default(),
    );
    StacWriter::write_collection(&mut collection, &collection_path)?;
    let collection = StacWriter::read_collection(&collection_path)?;

    let options = ItemOptions {
        collection: Some(&collection),
        ..ItemOptions::new(AreaOfInterest::Conus)
    };
    let tools = InProcessTools;
    let mut item = MetadataAssembler::new(&tools).create_item(&source, &options)?;

    assert_eq!(item.collection.as_deref(), Some("noaa-mrms-qpe-1h-pass1"));
    let parent = item.links.iter().find(|l| l.rel == "parent").unwrap();
    assert_eq!(PathBuf::from(&parent.href), collection_path);

    let item_path = dir.path().join("catalog").join(format!("{}.json", item.id));
    StacWriter::write_item(&mut item, &item_path)?;
    assert_eq!(StacWriter::read_item(&item_path)?, item);
    Ok(())
}

#[test]
fn test_batch_continues_past_failures() -> Result<()> {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    gzip_source(input.path(), STEM)?;
    gzip_source(
        input.path(),
        "MRMS_MultiSensor_QPE_01H_Pass1_00.00_20220601-130000",
    )?;
    fs::write(
        input
            .path()
            .join("MRMS_MultiSensor_QPE_01H_Pass1_00.00_20220601-140000.grib2.gz"),
        b"not gzip",
    )?;

    let sources = BatchProcessor::discover(input.path())?;
    assert_eq!(sources.len(), 3);

    let report = BatchProcessor::new(2).process(
        &sources,
        output.path(),
        &ItemOptions::new(AreaOfInterest::Carib),
        &InProcessTools,
        None,
    )?;

    assert_eq!(report.written.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].0.ends_with(
        "MRMS_MultiSensor_QPE_01H_Pass1_00.00_20220601-140000.grib2.gz"
    ));
    assert!(output
        .path()
        .join(format!("CARIB_{}.json", STEM))
        .exists());
    Ok(())
}

/// Produces files that are not rasters.
struct CorruptingTools;

impl GeoTools for CorruptingTools {
    fn reproject(&self, _source: &Path, destination: &Path, _crs: &str) -> Result<PathBuf> {
        fs::write(destination, b"junk")?;
        Ok(destination.to_path_buf())
    }

    fn optimize(&self, _source: &Path, destination: &Path, _: &OptimizeRequest) -> Result<PathBuf> {
        fs::write(destination, b"junk")?;
        Ok(destination.to_path_buf())
    }
}

#[test]
fn test_unreadable_output_leaves_only_source() -> Result<()> {
    let dir = TempDir::new()?;
    let source = gzip_source(dir.path(), STEM)?;

    let tools = CorruptingTools;
    let err = MetadataAssembler::new(&tools)
        .create_item(&source, &ItemOptions::new(AreaOfInterest::Guam))
        .unwrap_err();

    assert!(matches!(err, ProcessingError::RasterRead { .. }));
    let remaining: Vec<PathBuf> = fs::read_dir(dir.path())?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    assert_eq!(remaining, vec![source]);
    Ok(())
}

#[test]
fn test_invalid_filename_produces_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join("MRMS_MultiSensor_QPE_01H_Pass_00.00_20220601-120000.grib2");
    fs::write(&source, b"")?;

    let tools = InProcessTools;
    let err = MetadataAssembler::new(&tools)
        .create_item(&source, &ItemOptions::new(AreaOfInterest::Conus))
        .unwrap_err();

    assert!(matches!(err, ProcessingError::InvalidFilename { .. }));
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}

#[test]
#[ignore = "requires gdalwarp and gdal_calc.py on PATH"]
fn test_reprojection_with_gdal_tools() -> Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join(format!("{}.grib2", STEM));
    write_grid(&source, &SpatialRef::from_epsg(4326)?, PIXELS.to_vec())?;

    let tools = GdalCommandLine::new(&ToolSettings::default());
    let options = ItemOptions {
        epsg: Some(3857),
        ..ItemOptions::new(AreaOfInterest::Guam)
    };
    let item = MetadataAssembler::new(&tools).create_item(&source, &options)?;

    let cog = &item.assets["cog"];
    assert_eq!(cog.extra_fields["proj:epsg"], json!(3857));
    assert_ne!(cog.extra_fields["proj:transform"], json!(TRANSFORM));
    assert_eq!(item.assets["grib2"].extra_fields["proj:epsg"], json!(4326));
    assert!(!item.properties.contains_key("proj:epsg"));
    Ok(())
}
