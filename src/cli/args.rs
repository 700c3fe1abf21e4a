use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::models::AreaOfInterest;

#[derive(Parser)]
#[command(name = "mrms-qpe-stac")]
#[command(about = "STAC metadata and COG conversion for NOAA MRMS QPE products")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Tool settings file (TOML, JSON or YAML)"
    )]
    pub config: Option<PathBuf>,
}

/// Options shared by the single-item and batch commands.
#[derive(Args, Debug, Clone)]
pub struct ItemArgs {
    #[arg(long, help = "Area of interest: CONUS, ALASKA, HAWAII, GUAM or CARIB")]
    pub aoi: AreaOfInterest,

    #[arg(long, help = "Collection JSON file the items belong to")]
    pub collection: Option<PathBuf>,

    #[arg(long, help = "Reproject the COG to this EPSG code")]
    pub epsg: Option<u32>,

    #[arg(long, help = "Do not create a COG asset")]
    pub nocog: bool,

    #[arg(long, help = "Do not include the original GRIB2 file")]
    pub nogrib: bool,

    #[arg(long, help = "Also create the legacy no-data mask COG")]
    pub mask: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a STAC collection for one accumulation period and pass
    CreateCollection {
        #[arg(help = "Output collection JSON file")]
        destination: PathBuf,

        #[arg(long, default_value = "1", help = "Accumulation period in hours")]
        period: u32,

        #[arg(long, default_value = "1", help = "Processing pass (1 or 2)")]
        pass_no: u32,

        #[arg(long, help = "Custom collection id")]
        id: Option<String>,

        #[arg(long, help = "URL of a preview image")]
        thumbnail: Option<String>,

        #[arg(long, help = "Start of the temporal extent (RFC 3339) [default: now]")]
        start_time: Option<String>,

        #[arg(long, help = "Do not advertise COG assets")]
        nocog: bool,

        #[arg(long, help = "Do not advertise GRIB2 assets")]
        nogrib: bool,
    },

    /// Create a STAC item for one MRMS QPE file
    CreateItem {
        #[arg(help = "MRMS QPE GRIB2 file, optionally gzip-compressed")]
        source: PathBuf,

        #[arg(help = "Output item JSON file")]
        destination: PathBuf,

        #[command(flatten)]
        item: ItemArgs,
    },

    /// Create STAC items for every MRMS QPE file in a directory
    CreateItems {
        #[arg(help = "Directory containing MRMS QPE files")]
        input_dir: PathBuf,

        #[arg(help = "Directory the item JSON files are written to")]
        output_dir: PathBuf,

        #[command(flatten)]
        item: ItemArgs,

        #[arg(long, help = "Worker threads [default: settings or CPU count]")]
        max_workers: Option<usize>,
    },
}
