//! Integration tests for the purchase selector.

use axum::http::{StatusCode, header};
use goldtrust_integration_tests::TestApp;

// =============================================================================
// Page
// =============================================================================

#[tokio::test]
async fn test_page_shows_price_and_contact_links() {
    let mut app = TestApp::new();
    let response = app.get("/buy-code").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.is_full_page());
    assert!(response.body.contains("Pay Vendor"));
    assert!(response.body.contains("Manual vendor payment"));
    assert!(response.body.contains("₦5,500"));
    assert!(response.body.contains("https://wa.me/2348136347797"));
    assert!(response.body.contains("Contact support"));
}

#[tokio::test]
async fn test_configured_price_is_shown() {
    let mut app = TestApp::with_env(&[("STOREFRONT_CODE_PRICE", "12000")]);
    let response = app.get("/buy-code").await;
    assert!(response.body.contains("₦12,000"));
}

// =============================================================================
// Confirmation Modal
// =============================================================================

#[tokio::test]
async fn test_modal_is_a_fragment_for_htmx() {
    let mut app = TestApp::new();
    let response = app.htmx_get("/buy-code/confirm").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.is_full_page());
    assert!(response.body.contains("aria-modal=\"true\""));
    assert!(response.body.contains("name=\"phone\""));
}

#[tokio::test]
async fn test_modal_is_a_full_page_without_htmx() {
    let mut app = TestApp::new();
    let response = app.get("/buy-code/confirm").await;

    assert!(response.is_full_page());
    assert!(response.body.contains("aria-modal=\"true\""));
    assert!(response.body.contains("Pay Vendor"));
}

#[tokio::test]
async fn test_missing_name_re_renders_modal_with_prompt() {
    let mut app = TestApp::new();
    let response = app
        .htmx_post("/buy-code/confirm", &[("name", "  "), ("phone", "08031234567")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("hx-redirect").is_none());
    assert!(response.body.contains("Please enter your name to proceed"));
    assert!(response.body.contains("value=\"08031234567\""));
}

#[tokio::test]
async fn test_missing_phone_re_renders_modal_with_prompt() {
    let mut app = TestApp::new();
    let response = app
        .post_form("/buy-code/confirm", &[("name", "Ada"), ("phone", "")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header(header::LOCATION.as_str()).is_none());
    assert!(response.body.contains("Please enter your phone number"));
    assert!(response.body.contains("value=\"Ada\""));
}

// =============================================================================
// Navigation to Checkout
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_valid_submit_redirects_htmx_with_normalized_phone() {
    let mut app = TestApp::new();
    let response = app
        .htmx_post(
            "/buy-code/confirm",
            &[("name", "Ada Obi"), ("phone", "+234 803 123 4567")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("hx-redirect"),
        Some("/checkout?name=Ada%20Obi&phone=08031234567")
    );
}

#[tokio::test(start_paused = true)]
async fn test_valid_submit_redirects_browser_with_see_other() {
    let mut app = TestApp::new();
    let response = app
        .post_form(
            "/buy-code/confirm",
            &[("name", "Ada"), ("phone", "0803-123-4567-99")],
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.header(header::LOCATION.as_str()),
        Some("/checkout?name=Ada&phone=08031234567")
    );
}

#[tokio::test(start_paused = true)]
async fn test_submit_waits_for_processing_delay() {
    let mut app = TestApp::new();
    let started = tokio::time::Instant::now();
    app.htmx_post("/buy-code/confirm", &[("name", "Ada"), ("phone", "08031234567")])
        .await;
    assert!(started.elapsed() >= goldtrust_core::wizard::PROCESSING_DELAY);
}
