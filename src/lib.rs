//! HTTP access-control filter.
//!
//! Decides, per request, whether to forward to the next handler or reject with
//! `403 Forbidden`, based on a client-address blocklist, an optional subnet rule
//! and a required header/value pair.

pub mod access;
pub mod config;
pub mod http;
pub mod observability;

pub use crate::access::{evaluate, explain, AccessPolicy, Decision, EvaluationRequest, SharedPolicy};
pub use crate::config::{AccessFilterConfig, FilterConfig};
pub use crate::http::{access_filter_middleware, AccessFilterState};
