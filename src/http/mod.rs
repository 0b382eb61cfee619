//! HTTP host integration.
//!
//! # Data Flow
//! ```text
//! host server (axum)
//!     → middleware.rs (client address from ConnectInfo, headers)
//!     → access::engine
//!     → Allow: next handler, request untouched
//!     → Deny:  403 "Forbidden", downstream never called
//! ```

pub mod middleware;

pub use middleware::{access_filter_middleware, AccessFilterState};
