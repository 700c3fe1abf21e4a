use chrono::{DateTime, Utc};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Commands, ItemArgs};
use crate::conversion::GdalCommandLine;
use crate::error::{ProcessingError, Result};
use crate::models::{AccumulationPeriod, Collection, ProcessingPass};
use crate::processors::{
    create_collection, BatchProcessor, CollectionOptions, ItemOptions, MetadataAssembler,
};
use crate::settings::ToolSettings;
use crate::utils::progress::ProgressReporter;
use crate::writers::StacWriter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let settings = ToolSettings::load(cli.config.as_deref())?;
    debug!(?settings, "loaded tool settings");

    match cli.command {
        Commands::CreateCollection {
            destination,
            period,
            pass_no,
            id,
            thumbnail,
            start_time,
            nocog,
            nogrib,
        } => {
            let start_time = start_time
                .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
                .transpose()?;

            let mut collection = create_collection(
                AccumulationPeriod::try_from(period)?,
                ProcessingPass::try_from(pass_no)?,
                &CollectionOptions {
                    id,
                    thumbnail,
                    start_time,
                    cog: !nocog,
                    grib: !nogrib,
                },
            );

            let path = StacWriter::write_collection(&mut collection, &destination)?;
            info!("wrote collection {} to {}", collection.id, path.display());
            println!("Collection written to {}", path.display());
        }

        Commands::CreateItem {
            source,
            destination,
            item,
        } => {
            let collection = load_collection(&item)?;
            let tools = GdalCommandLine::new(&settings);

            let mut stac_item = MetadataAssembler::new(&tools)
                .create_item(&source, &item_options(&item, collection.as_ref()))?;

            let path = StacWriter::write_item(&mut stac_item, &destination)?;
            info!("wrote item {} to {}", stac_item.id, path.display());
            println!("Item written to {}", path.display());
        }

        Commands::CreateItems {
            input_dir,
            output_dir,
            item,
            max_workers,
        } => {
            let collection = load_collection(&item)?;
            let tools = GdalCommandLine::new(&settings);
            let max_workers = max_workers
                .or(settings.max_workers)
                .unwrap_or_else(num_cpus::get);

            let sources = BatchProcessor::discover(&input_dir)?;
            println!(
                "Found {} MRMS QPE files in {}",
                sources.len(),
                input_dir.display()
            );

            let progress = ProgressReporter::new(sources.len() as u64, "Creating items...", false);
            let report = BatchProcessor::new(max_workers).process(
                &sources,
                &output_dir,
                &item_options(&item, collection.as_ref()),
                &tools,
                Some(&progress),
            )?;

            println!("\n{}", report.summary());
            if !report.is_success() {
                return Err(ProcessingError::BatchFailures {
                    failed: report.failures.len(),
                    total: sources.len(),
                });
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` when verbose.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // A subscriber may already be installed (e.g. by tests); keep it.
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }

    Ok(())
}

fn load_collection(args: &ItemArgs) -> Result<Option<Collection>> {
    args.collection
        .as_deref()
        .map(StacWriter::read_collection)
        .transpose()
}

fn item_options<'a>(args: &ItemArgs, collection: Option<&'a Collection>) -> ItemOptions<'a> {
    ItemOptions {
        aoi: args.aoi,
        cog: !args.nocog,
        grib: !args.nogrib,
        mask: args.mask,
        epsg: args.epsg,
        collection,
    }
}
