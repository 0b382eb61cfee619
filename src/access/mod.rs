//! Access control subsystem.
//!
//! # Data Flow
//! ```text
//! FilterConfig
//!     → policy.rs (validate, compile, freeze)
//!     → AccessPolicy shared via SharedPolicy (Arc + atomic swap on reload)
//!
//! Per request:
//!     → address.rs (strip port)
//!     → engine.rs (blocklist, subnet policy, required header)
//!     → Decision
//! ```
//!
//! # Design Decisions
//! - Fail closed: anything absent or malformed ends in Deny
//! - Configuration errors surface at construction, never during evaluation
//! - The blocklist is absolute and checked first

pub mod address;
pub mod engine;
pub mod error;
pub mod policy;

pub use engine::{evaluate, explain, Decision, DecisionReason, EvaluationRequest, Verdict};
pub use error::PolicyError;
pub use policy::{AccessPolicy, SharedPolicy};
