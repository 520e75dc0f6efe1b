//! Authorization route table.
//!
//! # Data Flow
//! ```text
//! Policy Compilation (at startup):
//!     include/exclude patterns + predicate
//!     → registry.rs (RegistryBuilder, one UrlMapping per finalize)
//!     → build() freezes into an immutable RouteRegistry
//!
//! Per request:
//!     RouteRegistry.mappings() in registration order
//!     → matcher.rs (method + path pattern)
//!     → pattern::match_path
//! ```
//!
//! # Design Decisions
//! - Mappings, includes and excludes keep insertion order; order decides
//!   which predicate runs first and where evaluation short-circuits
//! - Immutable after construction (shared across requests without locks)
//! - Misconfiguration is a typed error from the builder, never a panic

pub mod matcher;
pub mod registry;

pub use matcher::RouteMatcher;
pub use registry::{Predicate, RegistryBuilder, RouteRegistry, UrlMapping};
