//! End-to-end policy tests: TOML config through the full middleware stack.

use axum::http::StatusCode;

use route_guard::authz::ErrorBody;
use route_guard::http::server::EchoResponse;
use route_guard::http::X_REQUEST_ID;

mod common;

const ADMIN_POLICY: &str = r#"
    [[rules]]
    include = [{ pattern = "/admin/**" }]
    exclude = [{ method = "GET", pattern = "/admin/login" }]
    require = { kind = "has_role", role = "admin" }
"#;

#[tokio::test]
async fn test_role_gate_allows_only_matching_role() {
    let router = common::server(ADMIN_POLICY).router();

    assert_eq!(
        common::status(&router, "GET", "/admin/users", Some("alice-token")).await,
        StatusCode::OK
    );
    assert_eq!(
        common::status(&router, "GET", "/admin/users", Some("bob-token")).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        common::status(&router, "GET", "/admin/users", None).await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_exclude_bypasses_policy() {
    let router = common::server(ADMIN_POLICY).router();

    assert_eq!(
        common::status(&router, "GET", "/admin/login", None).await,
        StatusCode::OK
    );
    // Excludes are method-qualified.
    assert_eq!(
        common::status(&router, "POST", "/admin/login", None).await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_percent_encoded_path_hits_role_rule() {
    let router = common::server(ADMIN_POLICY).router();

    for uri in ["/admin/users", "/%61dmin/users", "/admin%2Fusers"] {
        assert_eq!(
            common::status(&router, "GET", uri, Some("bob-token")).await,
            StatusCode::FORBIDDEN,
            "{uri}"
        );
    }
    // Decoded once, this is the literal segment "%61dmin".
    assert_eq!(
        common::status(&router, "GET", "/%2561dmin/users", Some("bob-token")).await,
        StatusCode::OK
    );

    assert_eq!(
        common::status(&router, "GET", "/%61dmin/users", Some("alice-token")).await,
        StatusCode::OK
    );
    // The excluded login page stays reachable when encoded.
    assert_eq!(
        common::status(&router, "GET", "/admin/log%69n", None).await,
        StatusCode::OK
    );
    // Outside every rule, but malformed.
    assert_eq!(
        common::status(&router, "GET", "/public/%zz", None).await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_unmatched_request_is_allowed() {
    let router = common::server(ADMIN_POLICY).router();
    assert_eq!(
        common::status(&router, "GET", "/public/index.html", None).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_empty_registry_allows_everything() {
    let router = common::server("").router();
    assert_eq!(
        common::status(&router, "DELETE", "/anything/at/all", None).await,
        StatusCode::OK
    );
}

const LAYERED: &str = r#"
    [[rules]]
    include = [{ pattern = "/reports/**" }]
    require = { kind = "authenticated" }

    [[rules]]
    include = [{ pattern = "/reports/**" }]
    require = { kind = "has_authority", authority = "reports:read" }
"#;

#[tokio::test]
async fn test_affirmative_needs_one_matching_grant() {
    let router = common::server(LAYERED).router();

    // bob is authenticated but lacks the authority; one grant is enough.
    assert_eq!(
        common::status(&router, "GET", "/reports/q3", Some("bob-token")).await,
        StatusCode::OK
    );
    assert_eq!(
        common::status(&router, "GET", "/reports/q3", None).await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_unanimous_needs_every_matching_grant() {
    let router = common::server(&format!("[authz]\nmode = \"unanimous\"\n{LAYERED}")).router();

    assert_eq!(
        common::status(&router, "GET", "/reports/q3", Some("bob-token")).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        common::status(&router, "GET", "/reports/q3", Some("alice-token")).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_exclude_on_unrelated_rule_bypasses_unanimous_policy() {
    let policy = r#"
        [authz]
        mode = "unanimous"

        [[rules]]
        include = [{ pattern = "/other/**" }]
        exclude = [{ pattern = "/api/health" }]
        require = { kind = "deny_all" }

        [[rules]]
        include = [{ pattern = "/api/**" }]
        require = { kind = "deny_all" }
    "#;
    let router = common::server(policy).router();

    assert_eq!(
        common::status(&router, "GET", "/api/health", None).await,
        StatusCode::OK
    );
    assert_eq!(
        common::status(&router, "GET", "/api/users", None).await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_wildcard_patterns_through_stack() {
    let policy = r#"
        [[rules]]
        include = [
            { method = "POST", pattern = "/files/*.txt" },
            { pattern = "/v?/private/**" },
        ]
        require = { kind = "deny_all" }
    "#;
    let router = common::server(policy).router();

    assert_eq!(
        common::status(&router, "POST", "/files/notes.txt", None).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        common::status(&router, "GET", "/files/notes.txt", None).await,
        StatusCode::OK
    );
    assert_eq!(
        common::status(&router, "POST", "/files/a/notes.txt", None).await,
        StatusCode::OK
    );
    assert_eq!(
        common::status(&router, "GET", "/v1/private/a/b", None).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        common::status(&router, "GET", "/v10/private/a", None).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_live_server_round_trip() {
    let live = common::start_live(common::server(ADMIN_POLICY)).await;
    let client = reqwest::Client::new();

    let allowed = client
        .get(live.url("/admin/users"))
        .bearer_auth("alice-token")
        .header(X_REQUEST_ID.as_str(), "live-1")
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), reqwest::StatusCode::OK);
    let echo: EchoResponse = allowed.json().await.unwrap();
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.path, "/admin/users");
    assert_eq!(echo.request_id, "live-1");

    let denied = client
        .delete(live.url("/admin/users"))
        .bearer_auth("bob-token")
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), reqwest::StatusCode::FORBIDDEN);
    assert!(denied.headers().contains_key(X_REQUEST_ID.as_str()));
    let body: ErrorBody = denied.json().await.unwrap();
    assert_eq!(body.code, 403);
    assert_eq!(body.message, "Forbidden");

    live.shutdown.trigger();
    live.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_demo_config_loads_and_enforces() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/guard.toml");
    let config = route_guard::config::load_config(&path).unwrap();
    assert_eq!(config.rules.len(), 3);

    let router = route_guard::HttpServer::new(config).unwrap().router();
    assert_eq!(
        common::status(&router, "POST", "/orders/1", Some("bob-token")).await,
        StatusCode::OK
    );
    assert_eq!(
        common::status(&router, "GET", "/admin/users", Some("bob-token")).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        common::status(&router, "GET", "/me/profile", None).await,
        StatusCode::FORBIDDEN
    );
}
