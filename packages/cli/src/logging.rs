use tracing_subscriber::EnvFilter;

use defects_config::DEFAULT_LOG_FILTER;

/// Install the fmt subscriber. `RUST_LOG` overrides the default `warn` filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
