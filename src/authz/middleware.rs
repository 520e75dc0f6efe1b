//! Authorization middleware.
//!
//! Plugs the [`PolicyEvaluator`] into an axum middleware stack:
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::{middleware, routing::get, Router};
//! use route_guard::authz::{authz_middleware, AuthzState, Mode, PolicyEvaluator};
//! use route_guard::principal::Anonymous;
//! use route_guard::routing::RouteRegistry;
//!
//! # fn main() -> Result<(), route_guard::ConfigError> {
//! let registry = RouteRegistry::builder()
//!     .include(["/admin/**"])
//!     .deny_all()?
//!     .build()?;
//! let state = AuthzState::new(
//!     PolicyEvaluator::new(Mode::Affirmative, registry),
//!     Arc::new(Anonymous),
//! );
//!
//! let app: Router = Router::new()
//!     .route("/{*path}", get(|| async { "ok" }))
//!     .layer(middleware::from_fn_with_state(state, authz_middleware));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{
        header::{AUTHORIZATION, COOKIE},
        Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::authz::evaluator::PolicyEvaluator;
use crate::observability::metrics;
use crate::principal::Principal;

/// Message used by the default rejection when none is configured.
pub const DEFAULT_FORBIDDEN_MESSAGE: &str = "Forbidden";

/// Largest denied request body handed to the rejection callback. Longer
/// bodies are replaced by an empty one.
pub const DENIED_BODY_LIMIT: usize = 64 * 1024;

/// Builds the response for a denied request.
///
/// Receives the full request; the body is buffered up to
/// [`DENIED_BODY_LIMIT`].
pub type ForbiddenHandler = Arc<dyn Fn(&Request<Bytes>) -> Response + Send + Sync>;

/// JSON body of the default rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code, always 403.
    pub code: u16,
    pub message: String,
}

/// State required for authorization.
#[derive(Clone)]
pub struct AuthzState {
    pub evaluator: PolicyEvaluator,
    /// Consulted by every predicate, once per request.
    pub principal: Arc<dyn Principal>,
    pub on_forbidden: ForbiddenHandler,
}

impl AuthzState {
    /// State with the default rejection: logged 403 with "Forbidden".
    pub fn new(evaluator: PolicyEvaluator, principal: Arc<dyn Principal>) -> Self {
        Self {
            evaluator,
            principal,
            on_forbidden: default_forbidden_handler(DEFAULT_FORBIDDEN_MESSAGE, true),
        }
    }

    /// Replaces the rejection callback.
    pub fn with_forbidden_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Request<Bytes>) -> Response + Send + Sync + 'static,
    {
        self.on_forbidden = Arc::new(handler);
        self
    }
}

/// Runs the policy for `req`: allowed requests continue down the stack,
/// denied ones go to the rejection callback.
pub async fn authz_middleware(
    State(state): State<AuthzState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();

    let decision = state.evaluator.decide(&parts, state.principal.as_ref());
    metrics::record_decision(state.evaluator.mode(), decision);

    if decision.is_allowed() {
        return next.run(Request::from_parts(parts, body)).await;
    }

    let body = match axum::body::to_bytes(body, DENIED_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Denied request body not buffered");
            Bytes::new()
        }
    };
    (state.on_forbidden)(&Request::from_parts(parts, body))
}

/// Default rejection: optionally log the request, then answer 403 with an
/// [`ErrorBody`]. Credential headers are redacted in the log.
pub fn default_forbidden_handler(message: impl Into<String>, log_request: bool) -> ForbiddenHandler {
    let message = message.into();

    Arc::new(move |req: &Request<Bytes>| {
        if log_request {
            let mut headers = req.headers().clone();
            for name in [AUTHORIZATION, COOKIE] {
                if let Some(value) = headers.get_mut(name) {
                    value.set_sensitive(true);
                }
            }
            tracing::warn!(
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
                headers = ?headers,
                body = %String::from_utf8_lossy(req.body()),
                "Forbidden"
            );
        }
        forbidden_response(&message)
    })
}

/// 403 response with an [`ErrorBody`] carrying `message`.
pub fn forbidden_response(message: &str) -> Response {
    let body = ErrorBody {
        code: StatusCode::FORBIDDEN.as_u16(),
        message: message.to_string(),
    };
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}
