//! HTMX request detection and redirects.
//!
//! HTMX sends `HX-Request: true` on every request it issues. Such requests get
//! fragments back, and redirects are delivered through the `HX-Redirect`
//! response header so the browser performs a full navigation.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};

/// Request header set by HTMX.
pub const HX_REQUEST: &str = "hx-request";

/// Response header telling HTMX to navigate.
pub const HX_REDIRECT: &str = "hx-redirect";

/// Whether the request was issued by HTMX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get(HX_REQUEST)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        Ok(Self(is_htmx))
    }
}

impl HxRequest {
    /// Redirect to `to`, via `HX-Redirect` for HTMX and `303 See Other` otherwise.
    #[must_use]
    pub fn redirect(self, to: &str) -> Response {
        if self.0 {
            (StatusCode::OK, AppendHeaders([(HX_REDIRECT, to.to_string())])).into_response()
        } else {
            Redirect::to(to).into_response()
        }
    }
}
