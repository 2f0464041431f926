//! Logging and tracing configuration
//!
//! Scenario progress goes to stdout as colored ✓/✗ lines; tracing output
//! goes to stderr and, when a log directory is available, to a per-run file
//! that keeps the full step-by-step trace for CI artifacts.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::paths;

/// Name of the per-run log file inside the log directory
const LOG_FILE: &str = "run.log";

/// Build the stderr filter
///
/// `RUST_LOG` wins when set. Otherwise INFO for this crate (DEBUG with
/// `verbose`) and WARN for dependencies.
fn cli_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("integrations_e2e=debug,warn")
        } else {
            EnvFilter::new("integrations_e2e=info,warn")
        }
    })
}

/// Initialize tracing for the CLI
///
/// Returns the appender guard when file logging is active; keep it alive
/// for the whole run or buffered lines are lost on exit.
pub fn init_cli(verbose: bool) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact();

    let file_writer = paths::log_dir()
        .and_then(|dir| paths::ensure_dir(dir).ok())
        .map(|dir| tracing_appender::rolling::never(dir, LOG_FILE))
        .map(tracing_appender::non_blocking);

    match file_writer {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(cli_filter(verbose))
                .with(stderr_layer)
                .with(file_layer)
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(cli_filter(verbose))
                .with(stderr_layer)
                .init();
            None
        }
    }
}

/// Get the path to the run log file
pub fn run_log_path() -> Option<PathBuf> {
    paths::log_dir().map(|d| d.join(LOG_FILE))
}
