//! Request-time authorization for HTTP services.
//!
//! A [`RouteRegistry`] holds ordered mappings of include/exclude route
//! patterns to predicates; a [`PolicyEvaluator`] walks it per request in
//! affirmative or unanimous mode and yields allow or deny. The
//! [`authz::authz_middleware`] function plugs the evaluator into an axum
//! middleware stack.

pub mod authz;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pattern;
pub mod principal;
pub mod routing;

pub use authz::{Decision, Mode, PolicyEvaluator};
pub use config::GuardConfig;
pub use error::ConfigError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use principal::{Authority, Principal, Role};
pub use routing::{RouteMatcher, RouteRegistry};
