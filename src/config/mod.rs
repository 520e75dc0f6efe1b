//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → compile.rs (rules → RouteRegistry)
//! ```
//!
//! # Design Decisions
//! - Config is an explicit value handed to the server, never global state
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - No hot reload: the policy is frozen for the life of the process

pub mod compile;
pub mod loader;
pub mod schema;
pub mod validation;

pub use compile::compile_registry;
pub use loader::{load_config, parse_config};
pub use schema::{
    AuthzConfig, GuardConfig, ListenerConfig, ObservabilityConfig, PrincipalConfig, RequireConfig,
    RouteConfig, RuleConfig,
};
pub use validation::{validate_config, ValidationError};
