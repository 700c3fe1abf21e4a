use clap::Parser;
use mrms_qpe_stac::cli::{run, Cli};
use mrms_qpe_stac::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
