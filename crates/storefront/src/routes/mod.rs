//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /buy-code
//! GET  /health                 - Health check
//!
//! # Purchase selector
//! GET  /buy-code               - Price card and call to action
//! GET  /buy-code/confirm       - Confirmation modal (fragment for HTMX, page otherwise)
//! POST /buy-code/confirm       - Validate name/phone, redirect to /checkout
//!
//! # Checkout (HTMX fragments)
//! GET  /checkout               - Checkout page; opens a fresh checkout session
//! GET  /checkout/panel         - Current wizard panel
//! GET  /checkout/countdown     - Countdown (polled every second)
//! POST /checkout/proceed       - Submit Step 1
//! POST /checkout/confirm       - Confirm payment
//! POST /checkout/edit          - Back to Step 1
//! ```

pub mod buy_code;
pub mod checkout;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::form_rate_limiter;
use crate::state::AppState;

/// Create the purchase selector routes router.
pub fn buy_code_routes(rate_limit: bool) -> Router<AppState> {
    let mut confirm = post(buy_code::confirm);
    if rate_limit {
        confirm = confirm.layer(form_rate_limiter());
    }

    Router::new()
        .route("/", get(buy_code::show))
        .route("/confirm", get(buy_code::confirm_modal).merge(confirm))
}

/// Create the checkout routes router.
pub fn checkout_routes(rate_limit: bool) -> Router<AppState> {
    let actions = Router::new()
        .route("/proceed", post(checkout::proceed))
        .route("/confirm", post(checkout::confirm))
        .route("/edit", post(checkout::edit));
    let actions = if rate_limit {
        actions.layer(form_rate_limiter())
    } else {
        actions
    };

    Router::new()
        .route("/", get(checkout::show))
        .route("/panel", get(checkout::panel))
        .route("/countdown", get(checkout::countdown))
        .merge(actions)
}

/// Create all routes for the storefront.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/buy-code") }))
        .nest("/buy-code", buy_code_routes(rate_limit))
        .nest("/checkout", checkout_routes(rate_limit))
}
