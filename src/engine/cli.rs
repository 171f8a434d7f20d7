//! CLI command handler: merge defaults, `.unnest.toml`, and flags, then run one batch pass.

use anyhow::Result;
use log::{debug, info, warn};

use crate::engine::arg_parser::Cli;
use crate::utils::{Colors, apply_config, load_config, setup_logging};
use crate::{Opts, RunSummary, sort_dir};

/// Defaults, then the config file in BASE, then CLI flags. Returns the config load error (if any)
/// so it can be logged once logging is set up.
fn setup_opts(cli: &Cli) -> (Opts, Option<anyhow::Error>) {
    let mut opts = Opts {
        base_dir: cli.base.clone(),
        ..Default::default()
    };
    let load_err = match load_config(&cli.base) {
        Ok(Some(file)) => {
            apply_config(&file, &mut opts);
            None
        }
        Ok(None) => None,
        Err(e) => Some(e),
    };

    if let Some(ref w) = cli.work_dir {
        opts.work_dir = w.clone();
    }
    if cli.jobs.is_some() {
        opts.jobs = cli.jobs;
    }
    if let Some(v) = cli.continue_on_error {
        opts.continue_on_error = v;
    }
    opts.skip_patterns.extend(cli.skip.iter().cloned());
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    if let Some(v) = cli.progress {
        opts.progress = v;
    }
    if let Some(v) = cli.json {
        opts.json = v;
    }
    (opts, load_err)
}

fn print_summary(summary: &RunSummary) {
    info!(
        "{} routed ({} documents, {} spreadsheets, {} other)",
        Colors::colorize(Colors::ROUTED, &summary.routed().to_string()),
        summary.routed_documents,
        summary.routed_spreadsheets,
        summary.routed_other
    );
    info!(
        "{} archives extracted, {} failed",
        Colors::colorize(Colors::ARCHIVED, &summary.archives_extracted.to_string()),
        Colors::colorize(Colors::FAILED, &summary.archives_failed.to_string())
    );
    info!(
        "{} duplicates removed, {} left for the next run, {} empty dirs removed",
        Colors::colorize(Colors::DUPLICATE, &summary.duplicates.to_string()),
        summary.deferred,
        summary.dirs_removed
    );
}

/// Run one pass over the working directory and report what happened.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let (opts, load_err) = setup_opts(cli);
    setup_logging(opts.verbose);
    if let Some(e) = load_err {
        warn!("ignoring config file: {:#}", e);
    }
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let summary = sort_dir(&opts)?;
    print_summary(&summary);
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
