//! Integration tests for app-wide routes and middleware.

use axum::http::{StatusCode, header};
use goldtrust_integration_tests::TestApp;

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new();
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_root_redirects_to_buy_code() {
    let mut app = TestApp::new();
    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION.as_str()), Some("/buy-code"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let mut app = TestApp::new();
    let response = app.get("/products").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "Not found: /products");
}

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let mut app = TestApp::new();
    let response = app.get("/buy-code").await;

    assert_eq!(response.header("x-frame-options"), Some("DENY"));
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(response.header("referrer-policy"), Some("no-referrer"));
    assert!(
        response
            .header("content-security-policy")
            .is_some_and(|csp| csp.contains("https://unpkg.com"))
    );
    assert!(response.header("x-request-id").is_some());
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let mut app = TestApp::new();
    let response = app.get("/static/css/main.css").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(".countdown--warning"));

    let response = app.get("/static/js/modal.js").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Escape"));
}

// =============================================================================
// Rate Limiting
// =============================================================================

fn rate_limited_app() -> TestApp {
    TestApp::with_env(&[("STOREFRONT_RATE_LIMIT", "true")])
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_forms_work_without_proxy_headers() {
    let mut app = rate_limited_app();

    let response = app
        .htmx_post(
            "/buy-code/confirm",
            &[("name", "Ada Obi"), ("phone", "0803 123 4567")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("hx-redirect").is_some());

    app.get("/checkout").await;
    let response = app
        .htmx_post(
            "/checkout/proceed",
            &[("name", "Ada Obi"), ("phone", "08031234567")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Account number"));

    let response = app.htmx_post("/checkout/confirm", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.htmx_post("/checkout/edit", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_form_posts_beyond_burst_are_rejected() {
    let mut app = rate_limited_app();

    for _ in 0..10 {
        let response = app.htmx_post("/checkout/edit", &[]).await;
        assert_eq!(response.header("hx-redirect"), Some("/checkout"));
    }

    let response = app.htmx_post("/checkout/edit", &[]).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    // Page views are not limited
    let response = app.get("/checkout").await;
    assert_eq!(response.status, StatusCode::OK);
}
