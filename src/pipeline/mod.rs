//! Pipeline components: context, concurrency controller, scanner, per-file branches, cleanup.

mod archive;
pub mod cleanup;
pub mod context;
pub mod coordinator;
pub mod router;
pub mod store;
mod task;
pub mod walk;

pub use cleanup::{remove_empty_dirs, remove_empty_dirs_except};
pub use context::{PipelineContext, RunStats, ScanFilter};
pub use coordinator::{Coordinator, SlotPermit, Slots, TaskGuard, TaskTracker};
pub use router::{Placement, destination, move_or_discard, route};
pub use store::DedupStore;
pub use walk::{WalkOutcome, scan, to_outcome_walkdir};
