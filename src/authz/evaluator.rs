//! Policy evaluation.

use std::fmt;
use std::sync::Arc;

use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::pattern::decode_path;
use crate::principal::Principal;
use crate::routing::RouteRegistry;

/// How the results of several matching mappings combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// One passing mapping is enough.
    #[default]
    Affirmative,
    /// Every matching mapping must pass.
    Unanimous,
}

impl Mode {
    /// Label used in config, logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Affirmative => "affirmative",
            Mode::Unanimous => "unanimous",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    /// True for [`Decision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        }
    }
}

/// Applies a [`Mode`] to a frozen [`RouteRegistry`].
///
/// Cheap to clone and safe to share: evaluation only reads the registry.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    mode: Mode,
    registry: Arc<RouteRegistry>,
}

impl PolicyEvaluator {
    /// Evaluator for `registry`, combined according to `mode`.
    pub fn new(mode: Mode, registry: impl Into<Arc<RouteRegistry>>) -> Self {
        Self {
            mode,
            registry: registry.into(),
        }
    }

    /// Configured combination mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The frozen registry being evaluated.
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Decides whether `req` may proceed for `principal`.
    ///
    /// A path with malformed percent escapes is denied whenever a policy is
    /// configured, since no pattern can be checked against it.
    pub fn decide(&self, req: &Parts, principal: &dyn Principal) -> Decision {
        if self.registry.is_empty() {
            return Decision::Allow;
        }

        if decode_path(req.uri.path()).is_none() {
            tracing::debug!(path = %req.uri.path(), "Undecodable path");
            return Decision::Deny;
        }

        match self.mode {
            Mode::Affirmative => self.affirmative(req, principal),
            Mode::Unanimous => self.unanimous(req, principal),
        }
    }

    fn affirmative(&self, req: &Parts, principal: &dyn Principal) -> Decision {
        let mut denials = 0usize;

        for (index, mapping) in self.registry.mappings().iter().enumerate() {
            if mapping.is_excluded(req) {
                tracing::debug!(mapping = index, path = %req.uri.path(), "Excluded, skipping policy");
                return Decision::Allow;
            }

            for matcher in mapping.matching_includes(req) {
                if mapping.test(req, principal) {
                    tracing::debug!(mapping = index, pattern = matcher.pattern(), "Granted");
                    return Decision::Allow;
                }
                denials += 1;
            }
        }

        if denials > 0 {
            tracing::debug!(denials, path = %req.uri.path(), "No matching mapping granted access");
            Decision::Deny
        } else {
            Decision::Allow
        }
    }

    fn unanimous(&self, req: &Parts, principal: &dyn Principal) -> Decision {
        for (index, mapping) in self.registry.mappings().iter().enumerate() {
            if mapping.is_excluded(req) {
                tracing::debug!(mapping = index, path = %req.uri.path(), "Excluded, skipping policy");
                return Decision::Allow;
            }

            for matcher in mapping.matching_includes(req) {
                if !mapping.test(req, principal) {
                    tracing::debug!(mapping = index, pattern = matcher.pattern(), "Refused");
                    return Decision::Deny;
                }
            }
        }

        Decision::Allow
    }
}
