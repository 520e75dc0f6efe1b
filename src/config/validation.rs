//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Rules: at least one include, valid patterns, valid methods
//! - Principals: unique, non-empty tokens
//! - Addresses parse as socket addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::{GuardConfig, RouteConfig};
use crate::pattern::{validate_pattern, PatternError};

/// A semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rule {rule} has no include routes")]
    EmptyIncludes { rule: usize },

    #[error("rule {rule}: invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        rule: usize,
        pattern: String,
        reason: PatternError,
    },

    #[error("rule {rule}: invalid HTTP method `{method}`")]
    InvalidMethod { rule: usize, method: String },

    #[error("principal `{name}` has an empty token")]
    EmptyToken { name: String },

    #[error("principal `{name}` reuses another principal's token")]
    DuplicateToken { name: String },

    #[error("invalid {field} `{value}`")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate configuration, returning every problem found.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (rule, rule_config) in config.rules.iter().enumerate() {
        if rule_config.include.is_empty() {
            errors.push(ValidationError::EmptyIncludes { rule });
        }
        for route in rule_config.include.iter().chain(&rule_config.exclude) {
            validate_route(rule, route, &mut errors);
        }
    }

    let mut tokens = HashSet::new();
    for principal in &config.principals {
        if principal.token.is_empty() {
            errors.push(ValidationError::EmptyToken {
                name: principal.name.clone(),
            });
        } else if !tokens.insert(principal.token.as_str()) {
            errors.push(ValidationError::DuplicateToken {
                name: principal.name.clone(),
            });
        }
    }

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(rule: usize, route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    if let Err(reason) = validate_pattern(&route.pattern) {
        errors.push(ValidationError::InvalidPattern {
            rule,
            pattern: route.pattern.clone(),
            reason,
        });
    }
    if let Some(method) = &route.method {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod {
                rule,
                method: method.clone(),
            });
        }
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
