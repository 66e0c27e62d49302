use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log file prefix inside the log directory; the daily roller appends the date.
const LOG_FILE_NAME: &str = "beat-names.log";

/// Route `tracing` output to a daily rolling JSON file under `log_dir`. The
/// terminal belongs to the UI, so nothing is written to stdout. `RUST_LOG`
/// wins over `default_filter`. Keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init(log_dir: &Path, default_filter: &str) -> WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .try_init();
    if let Err(err) = installed {
        eprintln!("failed to install log subscriber: {err}");
    }

    guard
}
