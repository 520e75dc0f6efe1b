//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use route_guard::config::parse_config;
use route_guard::{HttpServer, Shutdown};

/// Principals shared by every test config.
pub const PRINCIPALS: &str = r#"
    [[principals]]
    name = "alice"
    token = "alice-token"
    roles = ["admin", "user"]
    authorities = ["reports:read"]

    [[principals]]
    name = "bob"
    token = "bob-token"
    roles = ["user"]
"#;

/// Builds a server from a TOML policy with [`PRINCIPALS`] appended.
pub fn server(policy: &str) -> HttpServer {
    let config = parse_config(&format!("{policy}\n{PRINCIPALS}")).unwrap();
    HttpServer::new(config).unwrap()
}

/// Sends one request through the router and returns the status.
pub async fn status(router: &Router, method: &str, uri: &str, token: Option<&str>) -> StatusCode {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

/// A server bound to an ephemeral local port.
pub struct LiveServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl LiveServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Starts `server` on 127.0.0.1 with an OS-assigned port.
pub async fn start_live(server: HttpServer) -> LiveServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, receiver));
    LiveServer {
        addr,
        shutdown,
        handle,
    }
}
