//! Engine module: CLI surface and the building blocks file tasks are made of

pub mod arg_parser;
pub mod classify;
pub mod cli;
pub mod hashing;
pub mod parallel;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use classify::{Classifier, normalize_ext};
pub use cli::handle_run;
pub use hashing::{hash_bytes, hash_file};
pub use parallel::resolve_parallelism;
pub use tools::{display_path, glob_match, matches_any_pattern, path_relative_to};
