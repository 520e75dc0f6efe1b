//! In-memory principal for unit tests.

use std::collections::HashSet;

use axum::http::request::Parts;

use super::{Authority, Principal, PrincipalError, Role};

#[derive(Debug, Clone, Default)]
pub(crate) struct FixedPrincipal {
    authenticated: bool,
    failing: bool,
    roles: HashSet<Role>,
    authorities: HashSet<Authority>,
}

impl FixedPrincipal {
    pub(crate) fn anonymous() -> Self {
        Self::default()
    }

    pub(crate) fn authenticated() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    /// Authenticated, but every capability lookup errors.
    pub(crate) fn failing() -> Self {
        Self {
            authenticated: true,
            failing: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_roles<const N: usize>(mut self, roles: [&str; N]) -> Self {
        self.roles.extend(roles.into_iter().map(Role::from));
        self
    }

    pub(crate) fn with_authorities<const N: usize>(mut self, authorities: [&str; N]) -> Self {
        self.authorities
            .extend(authorities.into_iter().map(Authority::from));
        self
    }
}

impl Principal for FixedPrincipal {
    fn authenticated(&self, _req: &Parts) -> bool {
        self.authenticated
    }

    fn has_role(&self, _req: &Parts, role: &Role) -> Result<bool, PrincipalError> {
        if self.failing {
            return Err(PrincipalError::Unavailable("role store offline".into()));
        }
        Ok(self.roles.contains(role))
    }

    fn has_authority(&self, _req: &Parts, authority: &Authority) -> Result<bool, PrincipalError> {
        if self.failing {
            return Err(PrincipalError::Unavailable("authority store offline".into()));
        }
        Ok(self.authorities.contains(authority))
    }
}
