use tracing_subscriber::{
    filter::{self, LevelFilter},
    prelude::*,
};

/// Installs a stderr fmt layer, keeping HTTP client internals out of the log.
pub fn setup_logger(log_level: LevelFilter) {
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(
            stderr_log.with_filter(log_level).with_filter(filter::filter_fn(|metadata| {
                !metadata.target().starts_with("hyper")
                    && !metadata.target().starts_with("reqwest")
                    && !metadata.target().starts_with("rustls")
            })),
        )
        .try_init();
}
