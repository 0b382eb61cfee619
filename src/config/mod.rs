//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, or JSON for plugin-style configs)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AccessFilterConfig (validated)
//!     → access::AccessPolicy (compiled, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → AccessPolicy::from_config
//!     → SharedPolicy swaps the Arc atomically
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A rejected reload leaves the running policy in place

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AccessFilterConfig, FilterConfig, ObservabilityConfig, SubnetPolicy};
pub use validation::ValidationError;
