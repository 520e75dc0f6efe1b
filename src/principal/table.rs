//! Static bearer-token principal table.
//!
//! Resolves the caller from the `Authorization: Bearer <token>` header
//! against a fixed table loaded from configuration. Intended for demos,
//! tests and small internal services; real deployments plug their own
//! [`Principal`] in front of the policy engine.

use std::collections::{HashMap, HashSet};

use axum::http::{header::AUTHORIZATION, request::Parts};

use super::{Authority, Principal, PrincipalError, Role};
use crate::config::PrincipalConfig;

const BEARER: &str = "Bearer ";

/// A resolved caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub roles: HashSet<Role>,
    pub authorities: HashSet<Authority>,
}

/// Token → identity lookup.
#[derive(Debug, Clone, Default)]
pub struct StaticPrincipalTable {
    identities: HashMap<String, Identity>,
}

impl StaticPrincipalTable {
    /// Empty table; every request is anonymous.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table built from the `[[principals]]` config entries.
    pub fn from_config(principals: &[PrincipalConfig]) -> Self {
        principals.iter().fold(Self::new(), |table, p| {
            table.with_identity(
                p.token.clone(),
                Identity {
                    name: p.name.clone(),
                    roles: p.roles.iter().cloned().collect(),
                    authorities: p.authorities.iter().cloned().collect(),
                },
            )
        })
    }

    /// Registers `identity` under `token`, replacing any earlier entry.
    pub fn with_identity(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// True when no token is registered.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Looks up the caller of `req`.
    ///
    /// A missing header is `Ok(None)`. A header that is present but cannot be
    /// read as a bearer token is an error, so capability checks fail closed.
    pub fn resolve(&self, req: &Parts) -> Result<Option<&Identity>, PrincipalError> {
        let Some(value) = req.headers.get(AUTHORIZATION) else {
            return Ok(None);
        };

        let value = value
            .to_str()
            .map_err(|_| PrincipalError::Lookup("authorization header is not valid text".into()))?;

        let token = value
            .strip_prefix(BEARER)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| PrincipalError::Lookup("malformed bearer token".into()))?;

        Ok(self.identities.get(token))
    }
}

impl Principal for StaticPrincipalTable {
    fn authenticated(&self, req: &Parts) -> bool {
        matches!(self.resolve(req), Ok(Some(_)))
    }

    fn has_role(&self, req: &Parts, role: &Role) -> Result<bool, PrincipalError> {
        Ok(self
            .resolve(req)?
            .is_some_and(|identity| identity.roles.contains(role)))
    }

    fn has_authority(&self, req: &Parts, authority: &Authority) -> Result<bool, PrincipalError> {
        Ok(self
            .resolve(req)?
            .is_some_and(|identity| identity.authorities.contains(authority)))
    }
}
