use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the stderr subscriber. `RUST_LOG` wins over the configured level.
///
/// Calling this twice is harmless; the second subscriber is discarded.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}
