//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the configured policy and principal table
//! - Create the Axum Router with the echo handler
//! - Wire up middleware (request ID, tracing, authorization)
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    middleware,
    response::IntoResponse,
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::authz::{authz_middleware, default_forbidden_handler, AuthzState, PolicyEvaluator};
use crate::config::GuardConfig;
use crate::error::ConfigError;
use crate::http::request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::principal::{Principal, StaticPrincipalTable};

/// Body returned by the echo handler for authorized requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoResponse {
    pub method: String,
    pub path: String,
    pub request_id: String,
}

/// Demo HTTP server guarded by the configured policy.
pub struct HttpServer {
    router: Router,
    config: GuardConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the configured rules do not form a valid policy.
    pub fn new(config: GuardConfig) -> Result<Self, ConfigError> {
        let table = StaticPrincipalTable::from_config(&config.principals);
        if table.is_empty() {
            tracing::info!("No principals configured, every request is anonymous");
        } else {
            tracing::info!(principals = table.len(), "Principal table loaded");
        }
        Self::with_principal(config, Arc::new(table))
    }

    /// Like [`new`](Self::new), with a caller-supplied principal.
    pub fn with_principal(
        config: GuardConfig,
        principal: Arc<dyn Principal>,
    ) -> Result<Self, ConfigError> {
        let registry = config.registry()?;
        tracing::info!(
            mode = %config.authz.mode,
            mappings = registry.len(),
            "Authorization policy compiled"
        );

        let evaluator = PolicyEvaluator::new(config.authz.mode, registry);
        let authz = AuthzState {
            on_forbidden: default_forbidden_handler(
                config.authz.forbidden_message.clone(),
                config.authz.log_denied,
            ),
            ..AuthzState::new(evaluator, principal)
        };

        let router = Self::build_router(authz);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(authz: AuthzState) -> Router {
        Router::new()
            .route("/", any(echo_handler))
            .route("/{*path}", any(echo_handler))
            .layer(middleware::from_fn_with_state(authz, authz_middleware))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn echo_handler(request: Request<Body>) -> impl IntoResponse {
    Json(EchoResponse {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        request_id: request_id(&request).to_string(),
    })
}
