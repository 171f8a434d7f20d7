//! unnest CLI: one batch pass over the working directory.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use unnest::engine::arg_parser::Cli;
use unnest::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
