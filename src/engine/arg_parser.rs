use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const BASE: &'static str = ".";
}

/// Unpack nested archives, drop duplicates, and file everything by content hash.
#[derive(Clone, Parser)]
#[command(name = "unnest")]
#[command(about = "Unpack nested archives, drop duplicates, and file everything by content hash.")]
pub struct Cli {
    /// Base directory holding the output layout and `.unnest.toml`. Default: current directory.
    #[arg(value_name = "BASE", default_value = DefaultArgs::BASE)]
    pub base: PathBuf,

    /// Working directory with incoming files, relative to BASE unless absolute. Default: worker.
    #[arg(long = "work-dir", short = 'w', value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Skip broken archive entries instead of failing the whole archive.
    #[arg(long = "continue-on-error", short = 'e', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub continue_on_error: Option<bool>,

    /// Number of concurrent file tasks. Default: available threads, capped by the FD limit.
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Extra skip patterns (glob on file name), added to the defaults. Can specify multiple: --skip '*.part' '*.tmp'
    #[arg(long, num_args = 1..)]
    pub skip: Vec<String>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Show a counter of finished files.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Print the run summary as JSON on stdout.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,
}
