//! Log output for the command-line solver

use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log` nor `RUST_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global subscriber, writing to stderr
///
/// `filter` takes precedence over `RUST_LOG`.
pub fn init_logging(filter: Option<&str>) {
    let env_filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
