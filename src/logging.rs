//! Subscriber initialization for binaries (SPEC_FULL §10.2).
//!
//! Library code never installs a global subscriber; only `bin/ruleconv` and `bin/repl` call
//! into this module, consistent with the engine's single-threaded, embeddable-library design.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install a `tracing_subscriber::fmt` subscriber. `level` seeds the `RUST_LOG`-style filter
/// when that environment variable is unset; `json` switches the formatter; `log_file`, if
/// given, additionally tees output to a rolling file appender via `tracing-appender`.
///
/// Returns the appender's `WorkerGuard` when file logging is enabled — the caller must keep it
/// alive for the binary's lifetime or buffered lines are dropped on exit.
pub fn init(level: &str, json: bool, log_file: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (guard, writer) = match log_file {
        Some(path) => {
            let directory = std::path::Path::new(path).parent().unwrap_or_else(|| std::path::Path::new("."));
            let file_name = std::path::Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "rules.log".to_string());
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (Some(guard), non_blocking)
        }
        None => {
            let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
            (Some(guard), non_blocking)
        }
    };

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer);
    if json {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }

    guard
}
