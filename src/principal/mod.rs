//! Principal capability interface.
//!
//! # Responsibilities
//! - Answer "is this request authenticated" for the current request
//! - Answer role and authority queries for the current request
//!
//! # Design Decisions
//! - A principal is consulted per request through the request parts, so an
//!   upstream authentication layer can stash its identity in the extensions
//!   or headers and a single shared principal can serve every request
//! - Queries may fail; callers inside the policy engine treat failure as
//!   "not granted"
//! - The `any`/`all` variants have default implementations over the
//!   single-value queries

pub mod table;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fmt;

use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use table::{Identity, StaticPrincipalTable};

/// Failure while resolving a capability for the current request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    #[error("principal store unavailable: {0}")]
    Unavailable(String),

    #[error("principal lookup failed: {0}")]
    Lookup(String),
}

/// A role name, e.g. `admin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

/// An authority (permission) name, e.g. `orders:write`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

macro_rules! string_newtype {
    ($name:ident) => {
        impl $name {
            /// Wraps `value`.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// The wrapped name.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype!(Role);
string_newtype!(Authority);

/// The authenticated actor a policy predicate is evaluated against.
pub trait Principal: Send + Sync {
    /// Returns true if the request carries an authenticated identity.
    fn authenticated(&self, req: &Parts) -> bool;

    /// Returns true if the caller of `req` holds `role`.
    fn has_role(&self, req: &Parts, role: &Role) -> Result<bool, PrincipalError>;

    /// Returns true if the caller of `req` holds `authority`.
    fn has_authority(&self, req: &Parts, authority: &Authority) -> Result<bool, PrincipalError>;

    /// True on the first granted role. An empty list is never granted.
    fn has_any_role(&self, req: &Parts, roles: &[Role]) -> Result<bool, PrincipalError> {
        for role in roles {
            if self.has_role(req, role)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// False on the first missing role. An empty list is always granted.
    fn has_all_role(&self, req: &Parts, roles: &[Role]) -> Result<bool, PrincipalError> {
        for role in roles {
            if !self.has_role(req, role)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn has_any_authority(
        &self,
        req: &Parts,
        authorities: &[Authority],
    ) -> Result<bool, PrincipalError> {
        for authority in authorities {
            if self.has_authority(req, authority)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn has_all_authority(
        &self,
        req: &Parts,
        authorities: &[Authority],
    ) -> Result<bool, PrincipalError> {
        for authority in authorities {
            if !self.has_authority(req, authority)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Principal for deployments without authentication: never authenticated,
/// holds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Principal for Anonymous {
    fn authenticated(&self, _req: &Parts) -> bool {
        false
    }

    fn has_role(&self, _req: &Parts, _role: &Role) -> Result<bool, PrincipalError> {
        Ok(false)
    }

    fn has_authority(&self, _req: &Parts, _authority: &Authority) -> Result<bool, PrincipalError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    /// Grants "a" and "b", errors on "broken", refuses everything else.
    struct Fixed;

    impl Principal for Fixed {
        fn authenticated(&self, _req: &Parts) -> bool {
            true
        }

        fn has_role(&self, _req: &Parts, role: &Role) -> Result<bool, PrincipalError> {
            match role.as_str() {
                "a" | "b" => Ok(true),
                "broken" => Err(PrincipalError::Unavailable("down".into())),
                _ => Ok(false),
            }
        }

        fn has_authority(&self, _req: &Parts, authority: &Authority) -> Result<bool, PrincipalError> {
            Ok(authority.as_str() == "read")
        }
    }

    fn parts() -> Parts {
        Request::builder().uri("/").body(()).unwrap().into_parts().0
    }

    fn roles(names: &[&str]) -> Vec<Role> {
        names.iter().map(|n| Role::from(*n)).collect()
    }

    #[test]
    fn test_any_role_defaults() {
        let req = parts();
        assert_eq!(Fixed.has_any_role(&req, &roles(&["x", "b"])), Ok(true));
        assert_eq!(Fixed.has_any_role(&req, &roles(&["x", "y"])), Ok(false));
        assert_eq!(Fixed.has_any_role(&req, &[]), Ok(false));
        // Stops at the first grant, before the failing lookup.
        assert_eq!(Fixed.has_any_role(&req, &roles(&["a", "broken"])), Ok(true));
        assert!(Fixed.has_any_role(&req, &roles(&["x", "broken"])).is_err());
    }

    #[test]
    fn test_all_role_defaults() {
        let req = parts();
        assert_eq!(Fixed.has_all_role(&req, &roles(&["a", "b"])), Ok(true));
        assert_eq!(Fixed.has_all_role(&req, &roles(&["a", "x"])), Ok(false));
        assert_eq!(Fixed.has_all_role(&req, &[]), Ok(true));
        assert!(Fixed.has_all_role(&req, &roles(&["a", "broken"])).is_err());
    }

    #[test]
    fn test_authority_defaults() {
        let req = parts();
        let read = Authority::from("read");
        let write = Authority::from("write");
        assert_eq!(Fixed.has_any_authority(&req, &[write.clone(), read.clone()]), Ok(true));
        assert_eq!(Fixed.has_all_authority(&req, &[write, read]), Ok(false));
    }

    #[test]
    fn test_anonymous_holds_nothing() {
        let req = parts();
        assert!(!Anonymous.authenticated(&req));
        assert_eq!(Anonymous.has_role(&req, &Role::from("admin")), Ok(false));
        assert_eq!(Anonymous.has_all_role(&req, &[]), Ok(true));
    }
}
