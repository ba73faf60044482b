//! Environment configuration shared by the `elicit` binary.
//!
//! Consolidates the `ELICIT_BASE_PATH`, `RAYON_NUM_THREADS` and logging reads.
//! Diagnostics go to stderr so that stdout carries only command output.

use std::path::PathBuf;

use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Default worker count when neither thread variable is set.
pub const DEFAULT_THREADS: usize = 8;

/// Filter used when `RUST_LOG` is unset or unparsable.
fn fallback_filter() -> &'static str {
    if std::env::var_os("ELICIT_VERBOSE").is_some() {
        "info,elicit=debug"
    } else {
        "warn"
    }
}

/// Install the global `tracing` subscriber. Honors `RUST_LOG`, then `ELICIT_VERBOSE`.
/// Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read `ELICIT_BASE_PATH` (default `"."`) and chdir into it.
pub fn init_base_path() -> std::io::Result<PathBuf> {
    let base_path = std::env::var("ELICIT_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    let path = PathBuf::from(&base_path);
    std::env::set_current_dir(&path)?;
    debug!(base_path = %path.display(), "working directory set");
    Ok(path)
}

/// `RAYON_NUM_THREADS`, falling back to `OMP_NUM_THREADS`, then [`DEFAULT_THREADS`].
pub fn thread_count() -> usize {
    std::env::var("RAYON_NUM_THREADS")
        .or_else(|_| std::env::var("OMP_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&n: &usize| n > 0)
        .unwrap_or(DEFAULT_THREADS)
}

/// Build the rayon global pool, tolerating one that is already initialized.
/// Returns thread count.
pub fn init_rayon_threads_lenient() -> usize {
    let num_threads = thread_count();
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok(); // May fail if already initialized
    info!(threads = num_threads, "rayon pool");
    num_threads
}
