//! Route registry and its builder.
//!
//! # Responsibilities
//! - Collect include/exclude matchers for the mapping being declared
//! - Finalize a mapping by attaching a predicate
//! - Provide the built-in predicates (permit/deny all, authenticated,
//!   role and authority checks)
//! - Freeze the result into an immutable [`RouteRegistry`]
//!
//! # Example
//! ```
//! use axum::http::Method;
//! use route_guard::routing::RouteRegistry;
//!
//! let registry = RouteRegistry::builder()
//!     .exclude(["/health"])
//!     .include(["/admin/**"])
//!     .has_role("admin")?
//!     .include_route(Method::POST, ["/orders", "/orders/**"])
//!     .has_any_authority(["orders:write", "orders:admin"])?
//!     .match_any()
//!     .authenticated()?
//!     .build()?;
//!
//! assert_eq!(registry.len(), 3);
//! # Ok::<(), route_guard::ConfigError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use axum::http::{request::Parts, Method};

use crate::error::ConfigError;
use crate::pattern::validate_pattern;
use crate::principal::{Authority, Principal, PrincipalError, Role};
use crate::routing::matcher::RouteMatcher;

/// Decision function of a mapping.
///
/// Must not mutate shared state; it may consult the principal.
pub type Predicate = Arc<dyn Fn(&Parts, &dyn Principal) -> bool + Send + Sync>;

/// One authorization rule.
#[derive(Clone)]
pub struct UrlMapping {
    predicate: Predicate,
    includes: Vec<RouteMatcher>,
    excludes: Vec<RouteMatcher>,
}

impl UrlMapping {
    /// Matchers that put a request under this rule.
    pub fn includes(&self) -> &[RouteMatcher] {
        &self.includes
    }

    /// Matchers that take a request out of the whole policy.
    pub fn excludes(&self) -> &[RouteMatcher] {
        &self.excludes
    }

    /// Returns true if any exclude matcher hits the request.
    pub fn is_excluded(&self, req: &Parts) -> bool {
        self.excludes.iter().any(|m| m.matches(req))
    }

    /// Include matchers that hit the request, in declaration order.
    pub fn matching_includes<'a>(
        &'a self,
        req: &'a Parts,
    ) -> impl Iterator<Item = &'a RouteMatcher> + 'a {
        self.includes.iter().filter(move |m| m.matches(req))
    }

    /// Runs the predicate.
    pub fn test(&self, req: &Parts, principal: &dyn Principal) -> bool {
        (self.predicate)(req, principal)
    }
}

impl fmt::Debug for UrlMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlMapping")
            .field("includes", &self.includes)
            .field("excludes", &self.excludes)
            .finish_non_exhaustive()
    }
}

/// Ordered, frozen set of mappings.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    mappings: Vec<UrlMapping>,
}

impl RouteRegistry {
    /// Starts an empty builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Mappings in registration order.
    pub fn mappings(&self) -> &[UrlMapping] {
        &self.mappings
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// True when no mapping is configured; every request is then allowed.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Fluent builder for [`RouteRegistry`].
///
/// `include*`/`exclude*` calls accumulate matchers for the next mapping; a
/// predicate method (`that`, `permit_all`, `has_role`, ...) finalizes it.
/// Pattern errors are remembered and surface from the next finalize call or
/// from [`build`](Self::build).
#[derive(Default)]
pub struct RegistryBuilder {
    mappings: Vec<UrlMapping>,
    pending_includes: Vec<RouteMatcher>,
    pending_excludes: Vec<RouteMatcher>,
    error: Option<ConfigError>,
}

impl RegistryBuilder {
    /// Adds include patterns, for any method, to the pending mapping.
    pub fn include<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_includes(None, patterns)
    }

    /// Adds include patterns that only apply to `method`.
    pub fn include_route<I, S>(self, method: Method, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_includes(Some(method), patterns)
    }

    /// Adds exclude patterns, for any method, to the pending mapping.
    ///
    /// A request hitting any exclude is allowed without consulting any
    /// mapping, not only this one.
    pub fn exclude<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_excludes(None, patterns)
    }

    /// Adds exclude patterns that only apply to `method`.
    pub fn exclude_route<I, S>(self, method: Method, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_excludes(Some(method), patterns)
    }

    /// Includes every request.
    pub fn match_any(mut self) -> Self {
        self.pending_includes.push(RouteMatcher::any());
        self
    }

    /// Finalizes the pending mapping with a custom predicate.
    pub fn that<F>(mut self, predicate: F) -> Result<Self, ConfigError>
    where
        F: Fn(&Parts, &dyn Principal) -> bool + Send + Sync + 'static,
    {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if self.pending_includes.is_empty() {
            return Err(ConfigError::EmptyIncludes);
        }

        self.mappings.push(UrlMapping {
            predicate: Arc::new(predicate),
            includes: std::mem::take(&mut self.pending_includes),
            excludes: std::mem::take(&mut self.pending_excludes),
        });
        Ok(self)
    }

    /// Finalizes the pending mapping with a predicate that always passes.
    pub fn permit_all(self) -> Result<Self, ConfigError> {
        self.that(|_, _| true)
    }

    /// Finalizes the pending mapping with a predicate that never passes.
    pub fn deny_all(self) -> Result<Self, ConfigError> {
        self.that(|_, _| false)
    }

    /// Passes when the principal is authenticated.
    pub fn authenticated(self) -> Result<Self, ConfigError> {
        self.that(|req, principal| principal.authenticated(req))
    }

    /// Passes when the principal holds `role`.
    pub fn has_role(self, role: impl Into<Role>) -> Result<Self, ConfigError> {
        let role = role.into();
        self.that(move |req, principal| granted("has_role", principal.has_role(req, &role)))
    }

    /// Passes when the principal holds at least one of `roles`. An empty
    /// list never passes.
    pub fn has_any_role<I, R>(self, roles: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        let roles: Vec<Role> = roles.into_iter().map(Into::into).collect();
        self.that(move |req, principal| {
            granted("has_any_role", principal.has_any_role(req, &roles))
        })
    }

    /// Passes when the principal holds every one of `roles`. An empty list
    /// always passes.
    pub fn has_all_role<I, R>(self, roles: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        let roles: Vec<Role> = roles.into_iter().map(Into::into).collect();
        self.that(move |req, principal| {
            granted("has_all_role", principal.has_all_role(req, &roles))
        })
    }

    /// Passes when the principal holds `authority`.
    pub fn has_authority(self, authority: impl Into<Authority>) -> Result<Self, ConfigError> {
        let authority = authority.into();
        self.that(move |req, principal| {
            granted("has_authority", principal.has_authority(req, &authority))
        })
    }

    /// Passes when the principal holds at least one of `authorities`.
    pub fn has_any_authority<I, A>(self, authorities: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Authority>,
    {
        let authorities: Vec<Authority> = authorities.into_iter().map(Into::into).collect();
        self.that(move |req, principal| {
            granted("has_any_authority", principal.has_any_authority(req, &authorities))
        })
    }

    /// Passes when the principal holds every one of `authorities`.
    pub fn has_all_authority<I, A>(self, authorities: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Authority>,
    {
        let authorities: Vec<Authority> = authorities.into_iter().map(Into::into).collect();
        self.that(move |req, principal| {
            granted("has_all_authority", principal.has_all_authority(req, &authorities))
        })
    }

    /// Like [`has_role`](Self::has_role), with the role derived from the request.
    pub fn has_role_fn<F>(self, role: F) -> Result<Self, ConfigError>
    where
        F: Fn(&Parts, &dyn Principal) -> Role + Send + Sync + 'static,
    {
        self.that(move |req, principal| {
            granted("has_role", principal.has_role(req, &role(req, principal)))
        })
    }

    /// Like [`has_any_role`](Self::has_any_role), with the roles derived from
    /// the request.
    pub fn has_any_role_fn<F>(self, roles: F) -> Result<Self, ConfigError>
    where
        F: Fn(&Parts, &dyn Principal) -> Vec<Role> + Send + Sync + 'static,
    {
        self.that(move |req, principal| {
            granted("has_any_role", principal.has_any_role(req, &roles(req, principal)))
        })
    }

    /// Like [`has_all_role`](Self::has_all_role), with the roles derived from
    /// the request.
    pub fn has_all_role_fn<F>(self, roles: F) -> Result<Self, ConfigError>
    where
        F: Fn(&Parts, &dyn Principal) -> Vec<Role> + Send + Sync + 'static,
    {
        self.that(move |req, principal| {
            granted("has_all_role", principal.has_all_role(req, &roles(req, principal)))
        })
    }

    /// Like [`has_authority`](Self::has_authority), with the authority derived
    /// from the request.
    pub fn has_authority_fn<F>(self, authority: F) -> Result<Self, ConfigError>
    where
        F: Fn(&Parts, &dyn Principal) -> Authority + Send + Sync + 'static,
    {
        self.that(move |req, principal| {
            granted(
                "has_authority",
                principal.has_authority(req, &authority(req, principal)),
            )
        })
    }

    /// Like [`has_any_authority`](Self::has_any_authority), with the
    /// authorities derived from the request.
    pub fn has_any_authority_fn<F>(self, authorities: F) -> Result<Self, ConfigError>
    where
        F: Fn(&Parts, &dyn Principal) -> Vec<Authority> + Send + Sync + 'static,
    {
        self.that(move |req, principal| {
            granted(
                "has_any_authority",
                principal.has_any_authority(req, &authorities(req, principal)),
            )
        })
    }

    /// Like [`has_all_authority`](Self::has_all_authority), with the
    /// authorities derived from the request.
    pub fn has_all_authority_fn<F>(self, authorities: F) -> Result<Self, ConfigError>
    where
        F: Fn(&Parts, &dyn Principal) -> Vec<Authority> + Send + Sync + 'static,
    {
        self.that(move |req, principal| {
            granted(
                "has_all_authority",
                principal.has_all_authority(req, &authorities(req, principal)),
            )
        })
    }

    /// Freezes the builder.
    ///
    /// Fails if matchers were declared but never finalized.
    pub fn build(mut self) -> Result<RouteRegistry, ConfigError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if !self.pending_includes.is_empty() || !self.pending_excludes.is_empty() {
            return Err(ConfigError::DanglingMatchers {
                includes: self.pending_includes.len(),
                excludes: self.pending_excludes.len(),
            });
        }

        tracing::debug!(mappings = self.mappings.len(), "Route registry built");
        Ok(RouteRegistry {
            mappings: self.mappings,
        })
    }

    fn push_includes<I, S>(mut self, method: Option<Method>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            if let Some(matcher) = self.checked_matcher(method.clone(), pattern.into()) {
                self.pending_includes.push(matcher);
            }
        }
        self
    }

    fn push_excludes<I, S>(mut self, method: Option<Method>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            if let Some(matcher) = self.checked_matcher(method.clone(), pattern.into()) {
                self.pending_excludes.push(matcher);
            }
        }
        self
    }

    fn checked_matcher(&mut self, method: Option<Method>, pattern: String) -> Option<RouteMatcher> {
        if let Err(source) = validate_pattern(&pattern) {
            // First error wins.
            self.error.get_or_insert(ConfigError::InvalidPattern { pattern, source });
            return None;
        }

        Some(match method {
            Some(method) => RouteMatcher::with_method(method, pattern),
            None => RouteMatcher::new(pattern),
        })
    }
}

/// Fail-closed: a capability lookup error counts as "not granted".
fn granted(check: &'static str, result: Result<bool, PrincipalError>) -> bool {
    result.unwrap_or_else(|err| {
        tracing::warn!(check, error = %err, "Capability lookup failed, treating as not granted");
        false
    })
}
