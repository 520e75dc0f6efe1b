//! Configuration errors.
//!
//! Everything here is raised during startup while the policy is being
//! assembled. None of it can occur while a request is being evaluated.

use thiserror::Error;

use crate::config::validation::ValidationError;
use crate::pattern::PatternError;

/// Error while loading configuration or assembling the policy.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("mapping finalized without an include matcher")]
    EmptyIncludes,

    #[error("{includes} include and {excludes} exclude matcher(s) were never finalized with a predicate")]
    DanglingMatchers { includes: usize, excludes: usize },

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
