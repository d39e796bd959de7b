//! heicbatch CLI: convert a directory of HEIC/HEIF images, copying other files through.

use anyhow::Result;
use clap::Parser;
use heicbatch::engine::arg_parser::Cli;
use heicbatch::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
