//! Integration tests for the GoldTrust storefront.
//!
//! The tests drive the real router in-process with `tower::ServiceExt::oneshot`;
//! no server, port, or browser is involved.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p goldtrust-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `buy_code` - Purchase selector page, modal, and redirect to checkout
//! - `checkout` - Wizard steps, countdown, confirm, and the transaction log
//! - `app` - Health, redirects, fallbacks, and security headers
//!
//! Timer-dependent tests run on a paused tokio clock
//! (`#[tokio::test(start_paused = true)]`) and move it with `tokio::time::sleep`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request, StatusCode, header},
};
use goldtrust_storefront::config::StorefrontConfig;
use goldtrust_storefront::services::MemoryTransactionLog;
use goldtrust_storefront::state::AppState;
use tower::ServiceExt;

/// Address the visitor connects from, as the server sees it.
pub const TEST_PEER: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
    50_000,
);

/// A storefront router plus the cookie jar of one visitor.
pub struct TestApp {
    router: Router,
    log: MemoryTransactionLog,
    cookie: Option<String>,
}

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Value of a response header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the body is a full page rather than a fragment.
    #[must_use]
    pub fn is_full_page(&self) -> bool {
        self.body.contains("<!DOCTYPE html>")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Storefront with default configuration, an in-memory transaction log,
    /// and rate limiting off.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration fails to load.
    #[must_use]
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Storefront with extra configuration variables.
    ///
    /// # Panics
    ///
    /// Panics if the configuration fails to load.
    #[must_use]
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = HashMap::from([
            ("STOREFRONT_TRANSACTION_LOG".to_string(), "memory".to_string()),
            ("STOREFRONT_RATE_LIMIT".to_string(), "false".to_string()),
        ]);
        env.extend(vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));

        #[allow(clippy::expect_used)]
        let config = StorefrontConfig::from_lookup(|key| env.get(key).cloned())
            .expect("test configuration is valid");

        let log = MemoryTransactionLog::new();
        let state = AppState::with_log(config, Arc::new(log.clone()));

        Self {
            router: goldtrust_storefront::build_router(state),
            log,
            cookie: None,
        }
    }

    /// Every pending transaction appended so far.
    #[must_use]
    pub const fn log(&self) -> &MemoryTransactionLog {
        &self.log
    }

    /// Forget the session cookie, as a fresh browser would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// Plain browser GET.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send("GET", uri, None, false).await
    }

    /// GET issued by HTMX.
    pub async fn htmx_get(&mut self, uri: &str) -> TestResponse {
        self.send("GET", uri, None, true).await
    }

    /// Plain browser form post.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send("POST", uri, Some(encode_form(fields)), false).await
    }

    /// Form post issued by HTMX.
    pub async fn htmx_post(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send("POST", uri, Some(encode_form(fields)), true).await
    }

    #[allow(clippy::unwrap_used)]
    async fn send(
        &mut self,
        method: &str,
        uri: &str,
        form: Option<String>,
        htmx: bool,
    ) -> TestResponse {
        // Same extension the server adds when serving with connect info
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .extension(ConnectInfo(TEST_PEER));
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if htmx {
            builder = builder.header("hx-request", "true");
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                );
                Body::from(form)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
