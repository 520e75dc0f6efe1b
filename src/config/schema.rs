//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//!
//! ```toml
//! [authz]
//! mode = "unanimous"
//!
//! [[rules]]
//! include = [{ pattern = "/admin/**" }]
//! exclude = [{ method = "GET", pattern = "/admin/login" }]
//! require = { kind = "has_role", role = "admin" }
//! ```

use serde::{Deserialize, Serialize};

use crate::authz::middleware::DEFAULT_FORBIDDEN_MESSAGE;
use crate::authz::Mode;
use crate::principal::{Authority, Role};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Decision mode and rejection settings.
    pub authz: AuthzConfig,

    /// Authorization rules, evaluated in order.
    pub rules: Vec<RuleConfig>,

    /// Static bearer-token principals.
    pub principals: Vec<PrincipalConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Authorization settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// How matching rules combine.
    pub mode: Mode,

    /// `message` field of the 403 body.
    pub forbidden_message: String,

    /// Log the request head of every denied request.
    pub log_denied: bool,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Affirmative,
            forbidden_message: DEFAULT_FORBIDDEN_MESSAGE.to_string(),
            log_denied: true,
        }
    }
}

/// One authorization rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Routes the rule applies to. Must not be empty.
    #[serde(default)]
    pub include: Vec<RouteConfig>,

    /// Routes that bypass the whole policy.
    #[serde(default)]
    pub exclude: Vec<RouteConfig>,

    /// What the principal must satisfy.
    pub require: RequireConfig,
}

/// Method + pattern pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Exact, case-sensitive HTTP method; any method when absent.
    #[serde(default)]
    pub method: Option<String>,

    /// Path pattern (`?`, `*`, `**`).
    pub pattern: String,
}

/// Built-in predicates available from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequireConfig {
    PermitAll,
    DenyAll,
    Authenticated,
    HasRole { role: Role },
    HasAnyRole { roles: Vec<Role> },
    HasAllRole { roles: Vec<Role> },
    HasAuthority { authority: Authority },
    HasAnyAuthority { authorities: Vec<Authority> },
    HasAllAuthority { authorities: Vec<Authority> },
}

/// Bearer token entry for the static principal table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrincipalConfig {
    /// Name used in logs.
    pub name: String,

    pub token: String,

    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default)]
    pub authorities: Vec<Authority>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
