//! Metrics collection.
//!
//! # Metrics
//! - `access_filter_decisions_total` (counter): decisions by `decision` and `reason`
//! - `access_filter_reloads_total` (counter): policy reloads by `result`
//!
//! Counters go through the `metrics` facade; the embedding host installs the
//! recorder and exporter of its choice. Without one they are no-ops.

use crate::access::{Decision, DecisionReason};

/// Count one access decision.
pub fn record_decision(decision: Decision, reason: DecisionReason) {
    metrics::counter!(
        "access_filter_decisions_total",
        "decision" => decision.as_str(),
        "reason" => reason.as_str()
    )
    .increment(1);
}

/// Count a policy reload attempt.
pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("access_filter_reloads_total", "result" => result).increment(1);
}
