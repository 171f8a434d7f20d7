//! Parallelism ceiling for file tasks.

use log::debug;

use crate::utils::fd_limit::max_workers_by_fd_limit;

/// Resolve the number of concurrent file tasks: `requested` or the available threads,
/// capped so open descriptors stay under the process limit. Never below 1.
pub fn resolve_parallelism(requested: Option<usize>) -> usize {
    let wanted = requested.unwrap_or_else(rayon::current_num_threads).max(1);
    match max_workers_by_fd_limit() {
        Some(fd_cap) if fd_cap < wanted => {
            debug!("Capping jobs {} -> {} (FD limit ~80%)", wanted, fd_cap);
            fd_cap.max(1)
        }
        _ => wanted,
    }
}
