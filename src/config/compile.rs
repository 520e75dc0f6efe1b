//! Compiles configured rules into a [`RouteRegistry`].
//!
//! Goes through [`RegistryBuilder`] so configured and programmatic policies
//! share the same checks.

use axum::http::Method;

use crate::config::schema::{GuardConfig, RequireConfig, RouteConfig, RuleConfig};
use crate::error::ConfigError;
use crate::routing::{RegistryBuilder, RouteRegistry};

impl GuardConfig {
    /// Builds the policy described by `rules`.
    pub fn registry(&self) -> Result<RouteRegistry, ConfigError> {
        compile_registry(&self.rules)
    }
}

/// Compiles `rules` in order, one mapping per rule.
pub fn compile_registry(rules: &[RuleConfig]) -> Result<RouteRegistry, ConfigError> {
    rules
        .iter()
        .try_fold(RouteRegistry::builder(), compile_rule)?
        .build()
}

fn compile_rule(builder: RegistryBuilder, rule: &RuleConfig) -> Result<RegistryBuilder, ConfigError> {
    let builder = rule.include.iter().try_fold(builder, |builder, route| {
        Ok::<_, ConfigError>(match parse_method(route)? {
            Some(method) => builder.include_route(method, [route.pattern.as_str()]),
            None => builder.include([route.pattern.as_str()]),
        })
    })?;

    let builder = rule.exclude.iter().try_fold(builder, |builder, route| {
        Ok::<_, ConfigError>(match parse_method(route)? {
            Some(method) => builder.exclude_route(method, [route.pattern.as_str()]),
            None => builder.exclude([route.pattern.as_str()]),
        })
    })?;

    match rule.require.clone() {
        RequireConfig::PermitAll => builder.permit_all(),
        RequireConfig::DenyAll => builder.deny_all(),
        RequireConfig::Authenticated => builder.authenticated(),
        RequireConfig::HasRole { role } => builder.has_role(role),
        RequireConfig::HasAnyRole { roles } => builder.has_any_role(roles),
        RequireConfig::HasAllRole { roles } => builder.has_all_role(roles),
        RequireConfig::HasAuthority { authority } => builder.has_authority(authority),
        RequireConfig::HasAnyAuthority { authorities } => builder.has_any_authority(authorities),
        RequireConfig::HasAllAuthority { authorities } => builder.has_all_authority(authorities),
    }
}

fn parse_method(route: &RouteConfig) -> Result<Option<Method>, ConfigError> {
    route
        .method
        .as_deref()
        .map(|m| Method::from_bytes(m.as_bytes()).map_err(|_| ConfigError::InvalidMethod(m.to_string())))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_compiles_rules_in_order() {
        let config = parse_config(
            r#"
            [[rules]]
            include = [{ pattern = "/admin/**" }, { method = "POST", pattern = "/ops/*" }]
            exclude = [{ pattern = "/admin/login" }]
            require = { kind = "has_all_role", roles = ["admin", "ops"] }

            [[rules]]
            include = [{ pattern = "**" }]
            require = { kind = "authenticated" }
            "#,
        )
        .unwrap();

        let registry = config.registry().unwrap();
        let mappings = registry.mappings();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].includes()[1].method(), Some(&Method::POST));
        assert_eq!(mappings[0].excludes()[0].pattern(), "/admin/login");
        assert_eq!(mappings[1].includes()[0].pattern(), "/**");
    }

    #[test]
    fn test_empty_include_is_config_error() {
        // Skips validation on purpose; the builder still refuses.
        let rules = vec![RuleConfig {
            include: vec![],
            exclude: vec![],
            require: RequireConfig::PermitAll,
        }];
        assert!(matches!(
            compile_registry(&rules),
            Err(ConfigError::EmptyIncludes)
        ));
    }

    #[test]
    fn test_invalid_method_is_config_error() {
        let rules = vec![RuleConfig {
            include: vec![RouteConfig {
                method: Some("BAD METHOD".into()),
                pattern: "/x".into(),
            }],
            exclude: vec![],
            require: RequireConfig::PermitAll,
        }];
        assert!(matches!(
            compile_registry(&rules),
            Err(ConfigError::InvalidMethod(m)) if m == "BAD METHOD"
        ));
    }
}
