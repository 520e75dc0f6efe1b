//! Request authorization.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → middleware.rs (split into head + body)
//!     → evaluator.rs (walk RouteRegistry mappings, apply Mode)
//!     → Decision::Allow → next handler
//!     → Decision::Deny  → buffer body (bounded) → ForbiddenHandler
//!                         (default: log request, 403 + JSON body)
//! ```
//!
//! # Design Decisions
//! - Evaluation is synchronous and reads only the frozen registry
//! - No mappings = allow; no applicable mapping = allow
//! - An exclude hit on any mapping allows the request outright, skipping
//!   every later mapping as well. Policy authors who want an exclusion to
//!   apply to one rule only must express it inside that rule's predicate
//! - Capability lookup failures count as "not granted" (fail closed)
//! - Paths are matched percent-decoded; malformed escapes are denied

pub mod evaluator;
pub mod middleware;

pub use evaluator::{Decision, Mode, PolicyEvaluator};
pub use middleware::{
    authz_middleware, default_forbidden_handler, forbidden_response, AuthzState, ErrorBody,
    ForbiddenHandler,
};
