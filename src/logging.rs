//! Logging setup

use crate::error::{Error, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber at `level`. `RUST_LOG` takes precedence.
///
/// `level` is validated even when `RUST_LOG` is set. Calling this more than
/// once keeps the first subscriber.
pub fn setup_logging(level: &str) -> Result<()> {
    let configured = EnvFilter::try_new(level)
        .map_err(|e| Error::ConfigError(format!("invalid log level '{}': {}", level, e)))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or(configured);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .with(filter)
        .try_init()
        .ok();

    Ok(())
}
