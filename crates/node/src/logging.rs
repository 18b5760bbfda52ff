use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::fmt;

/// Initialize logging.
///
/// Returns a drop guard responsible for flushing any remaining logs when
/// the program terminates. The guard must be assigned to a binding that is
/// not `_`, as `_` would drop it immediately.
pub fn init(log_level: &str) -> WorkerGuard {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());

    let fmt_layer = fmt::Layer::default()
        .with_target(false)
        .with_writer(non_blocking)
        .with_ansi(enable_ansi())
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(build_tracing_filter(&log_level))
        .with(fmt_layer)
        .init();

    guard
}

/// Checks if both stdout and stderr are proper terminals, so colors are
/// disabled when output is redirected to a file.
fn enable_ansi() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Common prefixes of the crates targeted by the default log level.
const TARGET_CRATES: &[&str] = &["banyan"];

/// Build a tracing directive setting the log level for the banyan crates.
fn default_directive(log_level: &str) -> String {
    use itertools::Itertools;

    TARGET_CRATES
        .iter()
        .map(|&c| format!("{c}={log_level}"))
        .join(",")
}

/// Builds a tracing filter based on the input `log_levels`.
fn build_tracing_filter(log_levels: &str) -> EnvFilter {
    let mut directive = EnvFilter::from_default_env();

    for log_level in log_levels.split(',').filter(|s| !s.is_empty()) {
        // A bare level targets the banyan crates only.
        let app_log_level = if !log_level.contains('=') {
            default_directive(log_level)
        } else {
            log_level.to_string()
        }
        .parse()
        .unwrap_or_else(|e| panic!("Invalid log level '{log_level}': {e}"));

        directive = directive.add_directive(app_log_level);
    }

    directive
}
