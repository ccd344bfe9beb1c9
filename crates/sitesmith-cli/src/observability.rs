//! Log output for the command-line tool.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Builds the filter for a run. A set `RUST_LOG` overrides `logging.level`.
pub fn log_filter(logging: &LoggingConfig) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(&logging.level))
        }
        _ => EnvFilter::new(&logging.level),
    }
}

/// Installs a stderr subscriber, leaving stdout to command output.
///
/// Calling it twice keeps the first subscriber.
pub fn init_tracing(logging: &LoggingConfig) {
    let _ = tracing_subscriber::registry()
        .with(log_filter(logging))
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
