//! Logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins when set;
//! otherwise the level follows the `debug_mode` setting.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::utils::error::{AppError, AppResult};

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(debug_mode: bool) -> &'static str {
    if debug_mode {
        "study_buddy=debug,study_buddy_core=debug,info"
    } else {
        "info"
    }
}

/// Install a formatted subscriber writing to stderr.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(debug_mode: bool) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug_mode)));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .map_err(|e| AppError::internal(format!("failed to initialize logging: {}", e)))
}
