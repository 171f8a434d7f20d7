//! unnest: recursive archive unpacker with content-addressed deduplication and sorting

pub mod engine;
pub mod error;
pub mod extraction;
pub mod pipeline;
pub mod sort;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

/// Entry points. Use [`sort_dir_with`] to supply a custom
/// [`ExtractorTable`](crate::extraction::ExtractorTable).
pub use sort::{sort_dir, sort_dir_with};

/// Result alias used by public unnest API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
