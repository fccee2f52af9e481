use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize structured logging with tracing.
///
/// `RUST_LOG` wins over `default_level` when set. Only the first call
/// installs a subscriber; later calls are no-ops.
pub fn init_logging(default_level: &str, json: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if json {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_writer(std::io::stderr)
                        .json(),
                )
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .try_init()
        };

        match result {
            Ok(()) => tracing::debug!(json = json, "Structured logging initialized"),
            Err(e) => eprintln!("[logging] subscriber already installed: {}", e),
        }
    });
}
