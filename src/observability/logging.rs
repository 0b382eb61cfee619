//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level
//! - Initialization is fallible so embedding hosts that already installed a
//!   subscriber keep theirs

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

pub use tracing_subscriber::util::TryInitError;

/// Filter directive for a configured level, e.g. "info" → "access_filter=info".
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!("access_filter={}", config.log_level.trim().to_lowercase())
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
