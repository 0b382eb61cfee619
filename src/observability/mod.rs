//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine decisions, policy reloads
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//! ```

pub mod logging;
pub mod metrics;
